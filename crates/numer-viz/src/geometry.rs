#![forbid(unsafe_code)]

//! Data-space and pixel-space primitives for charts.

use serde::{Deserialize, Serialize};

/// Zoom floor, in units of `f64::EPSILON` relative to the center magnitude.
const MIN_SPAN_EPSILONS: f64 = 1024.0;

/// A point in data space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Build an interval from two endpoints in either order.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    #[must_use]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Smallest span that still resolves distinct positions around the
    /// center. Narrower intervals lose their endpoints to rounding.
    #[must_use]
    pub fn min_span(&self) -> f64 {
        MIN_SPAN_EPSILONS * f64::EPSILON * self.center().abs().max(1.0)
    }

    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.span() >= self.min_span()
    }

    /// Same center, span multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let center = self.center();
        let half = self.span() * factor / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Grown on both sides by `ratio` of the span.
    #[must_use]
    pub fn padded(&self, ratio: f64) -> Self {
        let pad = self.span() * ratio;
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Widen an interval too narrow to resolve by one unit on each side.
    #[must_use]
    pub fn non_degenerate(self) -> Self {
        if self.span() < self.min_span() {
            Self {
                min: self.min - 1.0,
                max: self.max + 1.0,
            }
        } else {
            self
        }
    }
}

/// Visible window of a chart in data space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub x: Interval,
    pub y: Interval,
}

impl Domain {
    #[must_use]
    pub const fn new(x: Interval, y: Interval) -> Self {
        Self { x, y }
    }

    /// Tight bounding box of the finite points, or `None` without any.
    pub fn bounding<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for p in points.into_iter().filter(|p| p.is_finite()) {
            bounds = Some(match bounds {
                None => Self::new(Interval::new(p.x, p.x), Interval::new(p.y, p.y)),
                Some(b) => Self::new(
                    Interval::new(b.x.min.min(p.x), b.x.max.max(p.x)),
                    Interval::new(b.y.min.min(p.y), b.y.max.max(p.y)),
                ),
            });
        }
        bounds
    }

    /// Both axes finite and wider than [`Interval::min_span`].
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.x.is_resolvable() && self.y.is_resolvable()
    }

    /// Rectangle spanned by two corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(Interval::new(a.x, b.x), Interval::new(a.y, b.y))
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x.center(), self.y.center())
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x.scaled(factor), self.y.scaled(factor))
    }

    #[must_use]
    pub fn padded(&self, ratio: f64) -> Self {
        Self::new(self.x.padded(ratio), self.y.padded(ratio))
    }

    #[must_use]
    pub fn non_degenerate(self) -> Self {
        Self::new(self.x.non_degenerate(), self.y.non_degenerate())
    }
}

/// Space reserved around the plot area inside a chart container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 60.0,
            right: 20.0,
            top: 20.0,
            bottom: 60.0,
        }
    }
}

/// An axis-aligned rectangle in pixel space. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// The rectangle left after removing `margins`. Size may be negative.
    #[must_use]
    pub fn inset(&self, margins: &Margins) -> Self {
        Self {
            left: self.left + margins.left,
            top: self.top + margins.top,
            width: self.width - margins.left - margins.right,
            height: self.height - margins.top - margins.bottom,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}
