#![forbid(unsafe_code)]

//! Result visualization: tables, labelled-value boxes, and 2D charts with a
//! zoomable viewport.
//!
//! [`OutputDispatcher`] is the entry point. It turns a method's raw result
//! and display spec into one [`RenderedOutput`] per requested mode, falling
//! back to placeholders instead of failing.

pub mod boxes;
pub mod chart;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod registry;
pub mod renderers;
pub mod table;
pub mod viewport;

pub use boxes::{BoxEntry, BoxView, PrimaryItem, ValueClass, looks_like_expression};
pub use chart::{Chart, ChartKind};
pub use dispatch::{OutputDispatcher, RenderContext, RenderedOutput};
pub use error::RenderUnavailable;
pub use geometry::{Domain, Interval, Margins, PixelRect, Point};
pub use overlay::{LineAxis, OverlayConfig, ReferenceLine, StepTrack};
pub use registry::{RENDERER_RULES, TopicRule, lookup};
pub use renderers::{FunctionSampler, RenderData, RendererKind};
pub use table::{Cell, NO_TABLE_DATA, TableFormat, TableRow, TableView};
pub use viewport::{
    DiscardReason, MAX_HISTORY, ViewportConfig, ViewportController, ViewportEffect,
    ViewportEvent, ViewportNoopReason, ViewportState, ViewportTransition, selection_commits,
};
