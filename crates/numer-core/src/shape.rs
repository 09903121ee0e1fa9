#![forbid(unsafe_code)]

//! Size-dependent field shapes.
//!
//! Every input field declares a [`ShapeRule`]: a pure function from the
//! method's current size `n` to either a `[rows, cols]` grid or nothing
//! (a scalar). The rule also names which axis the size governs, which is
//! what example loading needs to recover `n` from a concrete value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Concrete grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

/// Which axis of a grid the method size governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeAxis {
    /// `[1, n]`: size is the length of the single row.
    Row,
    /// `[n, 1]`: size is the number of rows.
    Column,
    /// `[n, n]`: size is the number of rows (and columns).
    Square,
}

/// Declarative form of `shape(size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeRule {
    #[default]
    Scalar,
    Row,
    Column,
    Square,
    Fixed { rows: usize, cols: usize },
}

impl ShapeRule {
    /// Resolve the rule for a size. `None` means scalar.
    #[must_use]
    pub const fn resolve(self, size: usize) -> Option<Shape> {
        match self {
            ShapeRule::Scalar => None,
            ShapeRule::Row => Some(Shape::new(1, size)),
            ShapeRule::Column => Some(Shape::new(size, 1)),
            ShapeRule::Square => Some(Shape::new(size, size)),
            ShapeRule::Fixed { rows, cols } => Some(Shape::new(rows, cols)),
        }
    }

    /// The axis this rule ties to the size, if any.
    #[must_use]
    pub const fn size_axis(self) -> Option<SizeAxis> {
        match self {
            ShapeRule::Row => Some(SizeAxis::Row),
            ShapeRule::Column => Some(SizeAxis::Column),
            ShapeRule::Square => Some(SizeAxis::Square),
            ShapeRule::Scalar | ShapeRule::Fixed { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_scalar(self) -> bool {
        matches!(self, ShapeRule::Scalar)
    }
}

/// The size control of a method: a labelled, inclusive integer range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub label: String,
    pub min: usize,
    pub max: usize,
}

impl SizeSpec {
    /// Clamp a requested size into `[min, max]`.
    #[must_use]
    pub fn clamp(&self, size: usize) -> usize {
        size.clamp(self.min, self.max.max(self.min))
    }

    #[must_use]
    pub fn contains(&self, size: usize) -> bool {
        (self.min..=self.max).contains(&size)
    }
}
