#![forbid(unsafe_code)]

//! Graph renderers.
//!
//! A closed set of renderers turns a method's result and input values into a
//! [`Chart`]. Expression evaluation is delegated to a [`FunctionSampler`]
//! supplied by the host.

use numer_core::{Fields, Value};
use serde::{Deserialize, Serialize};

use crate::chart::{Chart, ChartKind};
use crate::error::RenderUnavailable;
use crate::geometry::{PixelRect, Point};
use crate::overlay::{OverlayConfig, ReferenceLine};
use crate::viewport::ViewportConfig;

/// Sample count used when the inputs carry no usable `trapezoid_count`.
pub const DEFAULT_SAMPLE_COUNT: usize = 64;

/// Upper bound on integral samples.
pub const MAX_SAMPLE_COUNT: usize = 10_000;

/// Keys of an iteration record whose values are positions on the x axis.
const ROOT_POINT_KEYS: [&str; 6] = ["xl", "xr", "xm", "x", "x0", "x1"];

/// Keys drawn as per-step reference lines.
const ROOT_TRACKED_KEYS: [&str; 3] = ["xl", "xr", "xm"];

/// Evaluates an expression of `x` at a point.
pub trait FunctionSampler {
    /// `None` when the expression cannot be evaluated at `x`.
    fn sample(&self, expression: &str, x: f64) -> Option<f64>;
}

impl<F> FunctionSampler for F
where
    F: Fn(&str, f64) -> Option<f64>,
{
    fn sample(&self, expression: &str, x: f64) -> Option<f64> {
        self(expression, x)
    }
}

/// Everything a renderer may read.
#[derive(Clone, Copy)]
pub struct RenderData<'a> {
    pub topic: &'a str,
    pub method: &'a str,
    pub raw: &'a Value,
    pub values: &'a Fields,
    pub sampler: Option<&'a dyn FunctionSampler>,
    pub container: PixelRect,
    pub viewport: ViewportConfig,
}

impl std::fmt::Debug for RenderData<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderData")
            .field("topic", &self.topic)
            .field("method", &self.method)
            .field("raw", &self.raw)
            .field("values", &self.values)
            .field("sampler", &self.sampler.is_some())
            .finish_non_exhaustive()
    }
}

/// The available graph renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Iteration points of a root finder, scrubbable step by step.
    RootEquation,
    /// Area under the integrand across the integration bounds.
    Integral,
    /// Sample points with the interpolated target.
    Interpolation,
}

impl RendererKind {
    pub const ALL: [Self; 3] = [Self::RootEquation, Self::Integral, Self::Interpolation];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RootEquation => "root_equation",
            Self::Integral => "integral",
            Self::Interpolation => "interpolation",
        }
    }

    /// Overlays this renderer composes.
    #[must_use]
    pub const fn overlays(self) -> OverlayConfig {
        match self {
            Self::RootEquation => OverlayConfig::ALL,
            Self::Integral | Self::Interpolation => OverlayConfig::ORIGIN_ZOOM,
        }
    }

    #[must_use]
    pub fn supports(self, topic: &str, method: &str) -> bool {
        match self {
            Self::RootEquation => topic == "root_equation",
            Self::Integral => topic == "integration",
            Self::Interpolation => {
                topic == "interpolation"
                    || (topic == "regression"
                        && matches!(method, "least_square" | "multi_least_square"))
            }
        }
    }

    /// Build the chart for `data`.
    pub fn render(self, data: &RenderData<'_>) -> Result<Chart, RenderUnavailable> {
        if !self.supports(data.topic, data.method) {
            return Err(RenderUnavailable::Unsupported {
                renderer: self,
                topic: data.topic.to_owned(),
                method: data.method.to_owned(),
            });
        }
        match self {
            Self::RootEquation => render_root_equation(data),
            Self::Integral => render_integral(data),
            Self::Interpolation => render_interpolation(data),
        }
    }

    fn missing(self, what: &str) -> RenderUnavailable {
        RenderUnavailable::MissingData {
            renderer: self,
            what: what.to_owned(),
        }
    }
}

/// Records of an iteration result, from either an array or a keyed record.
fn iteration_steps(raw: &Value) -> Vec<&Fields> {
    match raw {
        Value::Array(items) => items.iter().filter_map(Value::as_record).collect(),
        Value::Record(fields) => fields.values().filter_map(Value::as_record).collect(),
        _ => Vec::new(),
    }
}

fn number(fields: &Fields, key: &str) -> Option<f64> {
    fields.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn render_root_equation(data: &RenderData<'_>) -> Result<Chart, RenderUnavailable> {
    let kind = RendererKind::RootEquation;
    let steps = iteration_steps(data.raw);
    if steps.is_empty() {
        return Err(kind.missing("iteration records"));
    }

    let equation = data.values.get("equation").and_then(Value::as_str);
    let height = |x: f64| {
        equation
            .zip(data.sampler)
            .and_then(|(expr, sampler)| sampler.sample(expr, x))
            .filter(|y| y.is_finite())
            .unwrap_or(0.0)
    };

    let series: Vec<Point> = steps
        .iter()
        .flat_map(|step| ROOT_POINT_KEYS.iter().filter_map(move |key| number(step, key)))
        .map(|x| Point::new(x, height(x)))
        .collect();
    if series.is_empty() {
        return Err(kind.missing("iteration positions"));
    }

    let step_lines = steps
        .iter()
        .map(|step| {
            ROOT_TRACKED_KEYS
                .iter()
                .filter_map(|key| number(step, key).map(|x| ReferenceLine::vertical(x, *key)))
                .collect()
        })
        .collect();

    Ok(Chart::new(kind, ChartKind::Scatter, series)
        .with_step_lines(step_lines)
        .attach_overlays(kind.overlays(), data.container, data.viewport, &[]))
}

fn render_integral(data: &RenderData<'_>) -> Result<Chart, RenderUnavailable> {
    let kind = RendererKind::Integral;
    let sampler = data
        .sampler
        .ok_or(RenderUnavailable::NoSampler { renderer: kind })?;
    let equation = data
        .values
        .get("equation")
        .and_then(Value::as_str)
        .filter(|expr| !expr.trim().is_empty())
        .ok_or_else(|| kind.missing("equation"))?;
    let xl = number(data.values, "xl").ok_or_else(|| kind.missing("xl"))?;
    let xr = number(data.values, "xr").ok_or_else(|| kind.missing("xr"))?;
    let count = number(data.values, "trapezoid_count")
        .filter(|n| *n >= 1.0)
        .map_or(DEFAULT_SAMPLE_COUNT, |n| (n.round() as usize).min(MAX_SAMPLE_COUNT));

    let step = (xr - xl) / count as f64;
    let series: Vec<Point> = (0..=count)
        .map(|i| xl + i as f64 * step)
        .filter_map(|x| {
            sampler
                .sample(equation, x)
                .filter(|y| y.is_finite())
                .map(|y| Point::new(x, y))
        })
        .collect();
    if series.is_empty() {
        return Err(kind.missing("evaluable samples"));
    }

    // Keep the x axis inside the zoom window.
    let floor = [Point::new(xl, 0.0)];
    Ok(Chart::new(kind, ChartKind::Area, series).attach_overlays(
        kind.overlays(),
        data.container,
        data.viewport,
        &floor,
    ))
}

/// Finite numbers of a scalar or nested array, row-major.
fn numbers(value: Option<&Value>) -> Vec<f64> {
    fn walk(value: &Value, out: &mut Vec<f64>) {
        match value {
            Value::Number(n) if n.is_finite() => out.push(*n),
            Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
            _ => {}
        }
    }
    let mut out = Vec::new();
    if let Some(value) = value {
        walk(value, &mut out);
    }
    out
}

fn render_interpolation(data: &RenderData<'_>) -> Result<Chart, RenderUnavailable> {
    let kind = RendererKind::Interpolation;
    let xs = numbers(data.values.get("x"));
    let ys = numbers(data.values.get("y"));
    let series: Vec<Point> = xs
        .iter()
        .zip(&ys)
        .map(|(&x, &y)| Point::new(x, y))
        .collect();
    if series.is_empty() {
        return Err(kind.missing("x/y sample points"));
    }

    let mut chart = Chart::new(kind, ChartKind::Scatter, series);
    let target_x = number(data.values, "target_x");
    let target_y = data.raw.as_record().and_then(|raw| number(raw, "target_y"));
    if let Some(x) = target_x
        && let Some(y) = target_y
    {
        chart = chart
            .with_highlight(Point::new(x, y))
            .with_line(ReferenceLine::vertical(x, "target_x"));
    }
    Ok(chart.attach_overlays(kind.overlays(), data.container, data.viewport, &[]))
}
