#![forbid(unsafe_code)]

//! Renderer output: a data series plus its overlays.

use serde::{Deserialize, Serialize};

use crate::geometry::{Domain, PixelRect, Point};
use crate::overlay::{OverlayConfig, ReferenceLine, StepTrack};
use crate::renderers::RendererKind;
use crate::viewport::{ViewportConfig, ViewportController};

/// How the series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Scatter,
    Area,
}

/// A 2D chart ready for a host to draw.
///
/// Build with [`Chart::new`], add lines and steps, then call
/// [`Chart::attach_overlays`] last so the viewport sees every point and the
/// step track sees every step.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    renderer: RendererKind,
    kind: ChartKind,
    series: Vec<Point>,
    highlight: Option<Point>,
    lines: Vec<ReferenceLine>,
    step_lines: Vec<Vec<ReferenceLine>>,
    overlays: OverlayConfig,
    viewport: Option<ViewportController>,
    track: Option<StepTrack>,
}

impl Chart {
    #[must_use]
    pub fn new(renderer: RendererKind, kind: ChartKind, series: Vec<Point>) -> Self {
        Self {
            renderer,
            kind,
            series,
            highlight: None,
            lines: Vec::new(),
            step_lines: Vec::new(),
            overlays: OverlayConfig::NONE,
            viewport: None,
            track: None,
        }
    }

    /// Mark one point for emphasis (e.g. an interpolation target).
    #[must_use]
    pub fn with_highlight(mut self, point: Point) -> Self {
        self.highlight = Some(point);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: ReferenceLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Reference lines for each iteration step, shown one step at a time.
    #[must_use]
    pub fn with_step_lines(mut self, steps: Vec<Vec<ReferenceLine>>) -> Self {
        self.step_lines = steps;
        self
    }

    /// Attach the overlays named in `overlays`.
    ///
    /// `bounds_hint` points only widen the initial zoom domain; they are not
    /// part of the series.
    #[must_use]
    pub fn attach_overlays(
        mut self,
        overlays: OverlayConfig,
        container: PixelRect,
        config: ViewportConfig,
        bounds_hint: &[Point],
    ) -> Self {
        self.overlays = overlays;
        if overlays.origin_axes {
            let mut lines = ReferenceLine::origin_axes().to_vec();
            lines.append(&mut self.lines);
            self.lines = lines;
        }
        if overlays.zoom {
            let data: Vec<Point> = self
                .series
                .iter()
                .chain(self.highlight.iter())
                .chain(bounds_hint)
                .copied()
                .collect();
            self.viewport = Some(ViewportController::new(data, container, config));
        }
        if overlays.track && !self.step_lines.is_empty() {
            self.track = Some(StepTrack::new(self.step_lines.len()));
        }
        self
    }

    #[must_use]
    pub fn renderer(&self) -> RendererKind {
        self.renderer
    }

    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    #[must_use]
    pub fn series(&self) -> &[Point] {
        &self.series
    }

    #[must_use]
    pub fn highlight(&self) -> Option<Point> {
        self.highlight
    }

    #[must_use]
    pub fn overlays(&self) -> OverlayConfig {
        self.overlays
    }

    #[must_use]
    pub fn viewport(&self) -> Option<&ViewportController> {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> Option<&mut ViewportController> {
        self.viewport.as_mut()
    }

    #[must_use]
    pub fn track(&self) -> Option<&StepTrack> {
        self.track.as_ref()
    }

    pub fn track_mut(&mut self) -> Option<&mut StepTrack> {
        self.track.as_mut()
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_lines.len()
    }

    /// The zoom domain, when the chart has a viewport.
    #[must_use]
    pub fn domain(&self) -> Option<Domain> {
        self.viewport.as_ref().map(ViewportController::domain)
    }

    /// Series points inside the current zoom domain.
    #[must_use]
    pub fn visible_series(&self) -> Vec<Point> {
        match self.domain() {
            Some(domain) => self
                .series
                .iter()
                .copied()
                .filter(|p| domain.contains(*p))
                .collect(),
            None => self.series.clone(),
        }
    }

    /// Static lines followed by the lines of the tracked step.
    #[must_use]
    pub fn reference_lines(&self) -> Vec<&ReferenceLine> {
        let step = self
            .track
            .as_ref()
            .and_then(|track| self.step_lines.get(track.index()));
        self.lines.iter().chain(step.into_iter().flatten()).collect()
    }
}
