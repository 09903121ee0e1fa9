#![forbid(unsafe_code)]

//! Zoomable, drag-selectable chart viewport.
//!
//! The controller owns a dataset, the visible data-space [`Domain`], and a
//! history of earlier domains. Pointer input arrives in the same pixel space
//! as the chart container; the plot area is the container minus fixed
//! [`Margins`], and pixel positions map linearly onto the current domain.
//!
//! ```text
//! Idle --pointer_down--> Selecting --pointer_move--> Selecting
//!  ^                         |
//!  +------ pointer_up -------+   commit when both axes exceed the threshold
//!  +------ pointer_leave ----+   always discard
//! ```
//!
//! Zoom buttons act from `Idle`:
//!
//! - zoom in pushes the current domain and halves both spans, stopping
//!   once a span would drop below [`Interval::min_span`];
//! - zoom out pops the history when possible, otherwise doubles both spans
//!   and marks the view as zoomed out past the data;
//! - reset drops the history and restores the padded data bounds.
//!
//! The dataset is never filtered in place: every domain change recomputes
//! the visible subset from the full data.

use serde::{Deserialize, Serialize};

use crate::geometry::{Domain, Interval, Margins, PixelRect, Point};

/// Deepest zoom history kept; older entries are dropped first.
pub const MAX_HISTORY: usize = 256;

/// Environment variable overriding [`ViewportConfig::padding_ratio`].
pub const ENV_VIEWPORT_PADDING: &str = "NUMER_VIEWPORT_PADDING";

/// Tunables of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub margins: Margins,
    /// Padding added around the data bounds, as a fraction of each span.
    pub padding_ratio: f64,
    /// A selection commits only if it exceeds this fraction of both spans.
    pub commit_ratio: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    /// Domain used when there is no finite data.
    pub empty_domain: Domain,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            padding_ratio: 0.05,
            commit_ratio: 0.05,
            zoom_in_factor: 0.5,
            zoom_out_factor: 2.0,
            empty_domain: Domain::new(Interval::new(0.0, 100.0), Interval::new(0.0, 100.0)),
        }
    }
}

impl ViewportConfig {
    /// Defaults adjusted from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults adjusted using a custom environment lookup (for tests).
    ///
    /// Unparsable or out-of-range values are ignored.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(ratio) = get_env(ENV_VIEWPORT_PADDING)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|ratio| ratio.is_finite() && (0.0..1.0).contains(ratio))
        {
            config.padding_ratio = ratio;
        }
        config
    }
}

/// Lifecycle state of the selection gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewportState {
    #[default]
    Idle,
    /// Dragging a selection; both corners are in data space.
    Selecting { anchor: Point, current: Point },
}

/// Input accepted by [`ViewportController::apply_event`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewportEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerLeave,
    ZoomIn,
    ZoomOut,
    Reset,
}

/// Why an event changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportNoopReason {
    IdleWithoutSelection,
    SelectionInProgress,
    DegeneratePlotArea,
    /// The next domain would be too narrow to resolve or no longer finite.
    ZoomLimit,
}

/// Why a selection ended without zooming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    BelowThreshold,
    PointerLeft,
    /// The selected domain is too narrow to resolve.
    ZoomLimit,
}

/// What one event did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ViewportEffect {
    SelectionStarted { anchor: Point },
    SelectionUpdated { anchor: Point, current: Point },
    Committed { previous: Domain, domain: Domain },
    Discarded { reason: DiscardReason },
    ZoomedIn { previous: Domain, domain: Domain },
    /// Zoom out popped the history.
    Restored { domain: Domain },
    /// Zoom out widened past the current view.
    ZoomedOut { previous: Domain, domain: Domain },
    Reset { domain: Domain },
    Noop { reason: ViewportNoopReason },
}

/// One state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransition {
    pub transition_id: u64,
    pub from: ViewportState,
    pub to: ViewportState,
    pub effect: ViewportEffect,
}

/// Whether a selection from `anchor` to `current` is large enough to zoom.
///
/// Both axes must strictly exceed `ratio` of the domain span.
#[must_use]
pub fn selection_commits(anchor: Point, current: Point, domain: &Domain, ratio: f64) -> bool {
    (current.x - anchor.x).abs() > domain.x.span() * ratio
        && (current.y - anchor.y).abs() > domain.y.span() * ratio
}

/// Viewport state machine for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    config: ViewportConfig,
    data: Vec<Point>,
    home: Domain,
    domain: Domain,
    history: Vec<Domain>,
    outer_zoom: bool,
    state: ViewportState,
    container: PixelRect,
    visible: Vec<Point>,
    transition_counter: u64,
}

impl ViewportController {
    /// A viewport showing all of `data` inside `container`.
    #[must_use]
    pub fn new(data: Vec<Point>, container: PixelRect, config: ViewportConfig) -> Self {
        let home = home_domain(&data, &config);
        let mut controller = Self {
            config,
            data,
            home,
            domain: home,
            history: Vec::new(),
            outer_zoom: false,
            state: ViewportState::Idle,
            container,
            visible: Vec::new(),
            transition_counter: 0,
        };
        controller.refresh_visible();
        controller
    }

    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    #[must_use]
    pub fn data(&self) -> &[Point] {
        &self.data
    }

    /// Points inside the current domain, in dataset order.
    #[must_use]
    pub fn visible(&self) -> &[Point] {
        &self.visible
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Padded bounds of the data; the domain `reset` returns to.
    #[must_use]
    pub fn home(&self) -> Domain {
        self.home
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_outer_zoom(&self) -> bool {
        self.outer_zoom
    }

    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    #[must_use]
    pub fn container(&self) -> PixelRect {
        self.container
    }

    /// Follow a container resize. The domain is unaffected.
    pub fn set_container(&mut self, container: PixelRect) {
        self.container = container;
    }

    /// Replace the dataset, dropping history and any selection.
    pub fn set_data(&mut self, data: Vec<Point>) {
        self.home = home_domain(&data, &self.config);
        self.data = data;
        self.history.clear();
        self.outer_zoom = false;
        self.state = ViewportState::Idle;
        self.domain = self.home;
        self.refresh_visible();
    }

    /// The plot area inside the container.
    #[must_use]
    pub fn plot_area(&self) -> PixelRect {
        self.container.inset(&self.config.margins)
    }

    /// Data-space position under a pixel, or `None` for a degenerate plot area.
    #[must_use]
    pub fn pixel_to_domain(&self, px: f64, py: f64) -> Option<Point> {
        let plot = self.plot_area();
        if plot.is_degenerate() {
            return None;
        }
        let d = &self.domain;
        Some(Point::new(
            d.x.min + d.x.span() * (px - plot.left) / plot.width,
            d.y.min + d.y.span() * (plot.bottom() - py) / plot.height,
        ))
    }

    /// Pixel position of a data-space point.
    #[must_use]
    pub fn domain_to_pixel(&self, p: Point) -> Option<(f64, f64)> {
        let plot = self.plot_area();
        let d = &self.domain;
        if plot.is_degenerate() || d.x.span() <= 0.0 || d.y.span() <= 0.0 {
            return None;
        }
        Some((
            plot.left + (p.x - d.x.min) / d.x.span() * plot.width,
            plot.bottom() - (p.y - d.y.min) / d.y.span() * plot.height,
        ))
    }

    /// The live selection as a pixel rectangle, for drawing the overlay.
    #[must_use]
    pub fn selection_rect(&self) -> Option<PixelRect> {
        let ViewportState::Selecting { anchor, current } = self.state else {
            return None;
        };
        let (x1, y1) = self.domain_to_pixel(anchor)?;
        let (x2, y2) = self.domain_to_pixel(current)?;
        Some(PixelRect::new(
            x1.min(x2),
            y1.min(y2),
            (x2 - x1).abs(),
            (y2 - y1).abs(),
        ))
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> ViewportTransition {
        self.apply_event(ViewportEvent::PointerDown { x, y })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> ViewportTransition {
        self.apply_event(ViewportEvent::PointerMove { x, y })
    }

    pub fn pointer_up(&mut self) -> ViewportTransition {
        self.apply_event(ViewportEvent::PointerUp)
    }

    pub fn pointer_leave(&mut self) -> ViewportTransition {
        self.apply_event(ViewportEvent::PointerLeave)
    }

    pub fn zoom_in(&mut self) -> ViewportTransition {
        self.apply_event(ViewportEvent::ZoomIn)
    }

    pub fn zoom_out(&mut self) -> ViewportTransition {
        self.apply_event(ViewportEvent::ZoomOut)
    }

    pub fn reset(&mut self) -> ViewportTransition {
        self.apply_event(ViewportEvent::Reset)
    }

    /// Apply one event and report the transition.
    pub fn apply_event(&mut self, event: ViewportEvent) -> ViewportTransition {
        let from = self.state;
        let noop = |reason| ViewportEffect::Noop { reason };
        let effect = match (self.state, event) {
            (ViewportState::Idle, ViewportEvent::PointerDown { x, y }) => {
                match self.pixel_to_domain(x, y) {
                    Some(anchor) => {
                        self.state = ViewportState::Selecting {
                            anchor,
                            current: anchor,
                        };
                        ViewportEffect::SelectionStarted { anchor }
                    }
                    None => noop(ViewportNoopReason::DegeneratePlotArea),
                }
            }
            (ViewportState::Selecting { anchor, .. }, ViewportEvent::PointerMove { x, y }) => {
                match self.pixel_to_domain(x, y) {
                    Some(current) => {
                        self.state = ViewportState::Selecting { anchor, current };
                        ViewportEffect::SelectionUpdated { anchor, current }
                    }
                    None => noop(ViewportNoopReason::DegeneratePlotArea),
                }
            }
            (ViewportState::Selecting { anchor, current }, ViewportEvent::PointerUp) => {
                self.state = ViewportState::Idle;
                let domain = Domain::from_corners(anchor, current);
                if !selection_commits(anchor, current, &self.domain, self.config.commit_ratio) {
                    ViewportEffect::Discarded {
                        reason: DiscardReason::BelowThreshold,
                    }
                } else if !domain.is_resolvable() {
                    ViewportEffect::Discarded {
                        reason: DiscardReason::ZoomLimit,
                    }
                } else {
                    let previous = self.domain;
                    self.push_domain(domain);
                    self.outer_zoom = false;
                    numer_core::trace!(
                        x_min = domain.x.min,
                        x_max = domain.x.max,
                        "viewport selection committed"
                    );
                    ViewportEffect::Committed { previous, domain }
                }
            }
            (ViewportState::Selecting { .. }, ViewportEvent::PointerLeave) => {
                self.state = ViewportState::Idle;
                ViewportEffect::Discarded {
                    reason: DiscardReason::PointerLeft,
                }
            }
            (ViewportState::Idle, ViewportEvent::ZoomIn) => {
                let previous = self.domain;
                let domain = previous.scaled(self.config.zoom_in_factor);
                if domain.is_resolvable() {
                    self.push_domain(domain);
                    ViewportEffect::ZoomedIn { previous, domain }
                } else {
                    noop(ViewportNoopReason::ZoomLimit)
                }
            }
            (ViewportState::Idle, ViewportEvent::ZoomOut) => {
                match self.history.last().copied() {
                    Some(domain) if !self.outer_zoom => {
                        self.history.pop();
                        self.set_domain(domain);
                        ViewportEffect::Restored { domain }
                    }
                    _ => {
                        let previous = self.domain;
                        let domain = previous.scaled(self.config.zoom_out_factor);
                        if domain.is_resolvable() {
                            self.set_domain(domain);
                            self.outer_zoom = true;
                            ViewportEffect::ZoomedOut { previous, domain }
                        } else {
                            noop(ViewportNoopReason::ZoomLimit)
                        }
                    }
                }
            }
            (_, ViewportEvent::Reset) => {
                self.state = ViewportState::Idle;
                self.history.clear();
                self.outer_zoom = false;
                let domain = self.home;
                self.set_domain(domain);
                ViewportEffect::Reset { domain }
            }
            (ViewportState::Idle, _) => noop(ViewportNoopReason::IdleWithoutSelection),
            (ViewportState::Selecting { .. }, _) => noop(ViewportNoopReason::SelectionInProgress),
        };

        self.transition_counter = self.transition_counter.saturating_add(1);
        ViewportTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state,
            effect,
        }
    }

    fn push_domain(&mut self, domain: Domain) {
        if self.history.len() >= MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(self.domain);
        self.set_domain(domain);
    }

    fn set_domain(&mut self, domain: Domain) {
        self.domain = domain;
        self.refresh_visible();
    }

    fn refresh_visible(&mut self) {
        let domain = self.domain;
        self.visible = self
            .data
            .iter()
            .copied()
            .filter(|p| domain.contains(*p))
            .collect();
    }
}

fn home_domain(data: &[Point], config: &ViewportConfig) -> Domain {
    Domain::bounding(data)
        .map(|bounds| bounds.padded(config.padding_ratio).non_degenerate())
        .unwrap_or(config.empty_domain)
}
