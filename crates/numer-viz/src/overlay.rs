#![forbid(unsafe_code)]

//! Chart overlays: origin axes, the zoom viewport, and step scrubbing.
//!
//! Every renderer receives one [`OverlayConfig`] and decides which overlays
//! its chart carries. Reference lines are plain data; drawing them is the
//! host's business.

use serde::{Deserialize, Serialize};

/// Which overlays a chart carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Draw `x = 0` and `y = 0` reference lines.
    pub origin_axes: bool,
    /// Attach a [`ViewportController`](crate::ViewportController).
    pub zoom: bool,
    /// Attach a [`StepTrack`] scrubbing through per-iteration records.
    pub track: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::ORIGIN_ZOOM
    }
}

impl OverlayConfig {
    pub const NONE: Self = Self {
        origin_axes: false,
        zoom: false,
        track: false,
    };

    pub const ORIGIN_ZOOM: Self = Self {
        origin_axes: true,
        zoom: true,
        track: false,
    };

    pub const ALL: Self = Self {
        origin_axes: true,
        zoom: true,
        track: true,
    };
}

/// Axis a reference line is perpendicular to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineAxis {
    /// A vertical line at some `x`.
    X,
    /// A horizontal line at some `y`.
    Y,
}

/// A labelled straight line across the plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub axis: LineAxis,
    pub value: f64,
    pub label: String,
}

impl ReferenceLine {
    #[must_use]
    pub fn vertical(value: f64, label: impl Into<String>) -> Self {
        Self {
            axis: LineAxis::X,
            value,
            label: label.into(),
        }
    }

    #[must_use]
    pub fn horizontal(value: f64, label: impl Into<String>) -> Self {
        Self {
            axis: LineAxis::Y,
            value,
            label: label.into(),
        }
    }

    /// The `x = 0` and `y = 0` pair.
    #[must_use]
    pub fn origin_axes() -> [Self; 2] {
        [Self::vertical(0.0, "origin-x"), Self::horizontal(0.0, "origin-y")]
    }
}

/// Cursor over a sequence of iteration steps.
///
/// The index always stays inside `0..len`; with no steps it stays at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepTrack {
    index: usize,
    len: usize,
}

impl StepTrack {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Jump to `index`, clamped to the last step.
    pub fn set(&mut self, index: usize) -> usize {
        self.index = index.min(self.len.saturating_sub(1));
        self.index
    }

    pub fn next(&mut self) -> usize {
        self.set(self.index.saturating_add(1))
    }

    pub fn prev(&mut self) -> usize {
        self.set(self.index.saturating_sub(1))
    }

    /// One-based "step k / n" label.
    #[must_use]
    pub fn label(&self) -> String {
        if self.len == 0 {
            "0 / 0".to_owned()
        } else {
            format!("{} / {}", self.index + 1, self.len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_clamps_both_ends() {
        let mut track = StepTrack::new(3);
        assert_eq!(track.prev(), 0);
        assert_eq!(track.next(), 1);
        assert_eq!(track.set(99), 2);
        assert_eq!(track.next(), 2);
        assert_eq!(track.label(), "3 / 3");
    }

    #[test]
    fn empty_track_stays_at_zero() {
        let mut track = StepTrack::new(0);
        assert!(track.is_empty());
        assert_eq!(track.next(), 0);
        assert_eq!(track.set(4), 0);
        assert_eq!(track.label(), "0 / 0");
    }

    #[test]
    fn origin_axes_pair() {
        let [x, y] = ReferenceLine::origin_axes();
        assert_eq!(x.axis, LineAxis::X);
        assert_eq!(y.axis, LineAxis::Y);
        assert_eq!((x.value, y.value), (0.0, 0.0));
    }

    #[test]
    fn presets() {
        assert_eq!(OverlayConfig::default(), OverlayConfig::ORIGIN_ZOOM);
        assert!(OverlayConfig::ALL.track);
        assert!(!OverlayConfig::NONE.zoom);
    }
}
