#![forbid(unsafe_code)]

//! Routes a method result to its display formatters.
//!
//! Every requested mode yields exactly one [`RenderedOutput`]. Anything that
//! cannot be shown becomes a [`RenderedOutput::Placeholder`]; no error
//! leaves this module.

use numer_core::{DisplayMode, DisplaySpec, Fields, Value};

use crate::boxes::BoxView;
use crate::chart::Chart;
use crate::error::RenderUnavailable;
use crate::geometry::PixelRect;
use crate::registry;
use crate::renderers::{FunctionSampler, RenderData};
use crate::table::{NO_TABLE_DATA, TableFormat, TableView};
use crate::viewport::ViewportConfig;

/// Placeholder text for modes this build cannot draw.
pub const UNSUPPORTED_MODE: &str = "Display mode not supported";

/// One formatted view of a result.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedOutput {
    Table(TableView),
    Box(BoxView),
    Graph(Box<Chart>),
    Placeholder { mode: DisplayMode, message: String },
}

impl RenderedOutput {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    #[must_use]
    pub fn as_chart(&self) -> Option<&Chart> {
        match self {
            Self::Graph(chart) => Some(&**chart),
            _ => None,
        }
    }

    pub fn as_chart_mut(&mut self) -> Option<&mut Chart> {
        match self {
            Self::Graph(chart) => Some(&mut **chart),
            _ => None,
        }
    }

    fn placeholder(mode: DisplayMode, message: impl Into<String>) -> Self {
        Self::Placeholder {
            mode,
            message: message.into(),
        }
    }
}

/// Which method produced the result, and how to evaluate its expressions.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub topic: &'a str,
    pub method: &'a str,
    pub sampler: Option<&'a dyn FunctionSampler>,
}

impl<'a> RenderContext<'a> {
    #[must_use]
    pub fn new(topic: &'a str, method: &'a str) -> Self {
        Self {
            topic,
            method,
            sampler: None,
        }
    }

    #[must_use]
    pub fn with_sampler(mut self, sampler: &'a dyn FunctionSampler) -> Self {
        self.sampler = Some(sampler);
        self
    }
}

/// Formatter settings shared by every result.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDispatcher {
    pub container: PixelRect,
    pub viewport: ViewportConfig,
    pub table: TableFormat,
}

impl Default for OutputDispatcher {
    fn default() -> Self {
        Self {
            container: PixelRect::new(0.0, 0.0, 480.0, 320.0),
            viewport: ViewportConfig::default(),
            table: TableFormat::default(),
        }
    }
}

impl OutputDispatcher {
    /// Defaults with the viewport read from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            viewport: ViewportConfig::from_env(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_container(mut self, container: PixelRect) -> Self {
        self.container = container;
        self
    }

    /// One output per mode of `display`, in order.
    #[must_use]
    pub fn render(
        &self,
        ctx: &RenderContext<'_>,
        display: &DisplaySpec,
        raw: &Value,
        ui_values: &Fields,
    ) -> Vec<RenderedOutput> {
        display
            .mode
            .iter()
            .map(|&mode| self.render_mode(ctx, mode, display, raw, ui_values))
            .collect()
    }

    fn render_mode(
        &self,
        ctx: &RenderContext<'_>,
        mode: DisplayMode,
        display: &DisplaySpec,
        raw: &Value,
        ui_values: &Fields,
    ) -> RenderedOutput {
        match mode {
            DisplayMode::Table => match TableView::from_value(raw, &self.table) {
                Some(table) => RenderedOutput::Table(table),
                None => {
                    numer_core::debug!(
                        topic = ctx.topic,
                        method = ctx.method,
                        "result has no table rows"
                    );
                    RenderedOutput::placeholder(mode, NO_TABLE_DATA)
                }
            },
            DisplayMode::Box => RenderedOutput::Box(BoxView::build(Some(display), raw, ui_values)),
            DisplayMode::Graph2D => match self.render_graph(ctx, raw, ui_values) {
                Ok(chart) => RenderedOutput::Graph(Box::new(chart)),
                Err(err) => {
                    numer_core::warn!(
                        topic = ctx.topic,
                        method = ctx.method,
                        error = %err,
                        "graph unavailable"
                    );
                    RenderedOutput::placeholder(mode, err.to_string())
                }
            },
            DisplayMode::Graph3D | DisplayMode::Unsupported => {
                numer_core::warn!(
                    topic = ctx.topic,
                    method = ctx.method,
                    mode = mode.as_str(),
                    "display mode not supported"
                );
                RenderedOutput::placeholder(mode, UNSUPPORTED_MODE)
            }
        }
    }

    /// The 2D chart for a result, via the renderer registry.
    pub fn render_graph(
        &self,
        ctx: &RenderContext<'_>,
        raw: &Value,
        ui_values: &Fields,
    ) -> Result<Chart, RenderUnavailable> {
        let kind = registry::lookup(ctx.topic, ctx.method).ok_or_else(|| {
            RenderUnavailable::NoRenderer {
                topic: ctx.topic.to_owned(),
                method: ctx.method.to_owned(),
            }
        })?;
        kind.render(&RenderData {
            topic: ctx.topic,
            method: ctx.method,
            raw,
            values: ui_values,
            sampler: ctx.sampler,
            container: self.container,
            viewport: self.viewport,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderers::RendererKind;

    fn display(modes: &[DisplayMode]) -> DisplaySpec {
        DisplaySpec {
            mode: modes.to_vec(),
            ..DisplaySpec::default()
        }
    }

    fn iteration_rows() -> Value {
        let row: Fields = [
            ("iteration", Value::from(1.0)),
            ("xl", Value::from(1.0)),
            ("xr", Value::from(2.0)),
            ("xm", Value::from(1.5)),
        ]
        .into_iter()
        .collect();
        Value::Array(vec![Value::Record(row)])
    }

    #[test]
    fn one_output_per_mode() {
        let dispatcher = OutputDispatcher::default();
        let ctx = RenderContext::new("root_equation", "bisection");
        let outputs = dispatcher.render(
            &ctx,
            &display(&[DisplayMode::Table, DisplayMode::Graph2D]),
            &iteration_rows(),
            &Fields::new(),
        );
        assert_eq!(outputs.len(), 2);
        assert!(matches!(outputs[0], RenderedOutput::Table(_)));
        let chart = outputs[1].as_chart().expect("graph");
        assert_eq!(chart.renderer(), RendererKind::RootEquation);
    }

    #[test]
    fn empty_table_degrades() {
        let outputs = OutputDispatcher::default().render(
            &RenderContext::new("root_equation", "bisection"),
            &display(&[DisplayMode::Table]),
            &Value::Array(Vec::new()),
            &Fields::new(),
        );
        assert_eq!(
            outputs,
            vec![RenderedOutput::Placeholder {
                mode: DisplayMode::Table,
                message: NO_TABLE_DATA.to_owned(),
            }]
        );
    }

    #[test]
    fn missing_renderer_and_3d_degrade() {
        let outputs = OutputDispatcher::default().render(
            &RenderContext::new("linear_equation", "cramer"),
            &display(&[DisplayMode::Graph2D, DisplayMode::Graph3D, DisplayMode::Unsupported]),
            &Value::Null,
            &Fields::new(),
        );
        assert!(outputs.iter().all(RenderedOutput::is_placeholder));
        assert_eq!(
            outputs[0],
            RenderedOutput::Placeholder {
                mode: DisplayMode::Graph2D,
                message: "no renderer for linear_equation/cramer".to_owned(),
            }
        );
    }

    #[test]
    fn box_mode_always_renders() {
        let outputs = OutputDispatcher::default().render(
            &RenderContext::new("differential", "derivative"),
            &display(&[DisplayMode::Box]),
            &Value::from(2.0),
            &Fields::new(),
        );
        assert!(matches!(outputs[0], RenderedOutput::Box(_)));
    }
}
