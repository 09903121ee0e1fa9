#![forbid(unsafe_code)]

use std::fmt;

use crate::renderers::RendererKind;

/// A graph could not be produced; the dispatcher shows a placeholder instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderUnavailable {
    /// No renderer rule covers this method.
    NoRenderer { topic: String, method: String },
    /// The chosen renderer does not handle this method.
    Unsupported {
        renderer: RendererKind,
        topic: String,
        method: String,
    },
    /// Input values or the result lack something the renderer needs.
    MissingData {
        renderer: RendererKind,
        what: String,
    },
    /// The renderer evaluates an expression but no sampler was provided.
    NoSampler { renderer: RendererKind },
}

impl fmt::Display for RenderUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRenderer { topic, method } => {
                write!(f, "no renderer for {topic}/{method}")
            }
            Self::Unsupported {
                renderer,
                topic,
                method,
            } => write!(f, "{} renderer does not support {topic}/{method}", renderer.name()),
            Self::MissingData { renderer, what } => {
                write!(f, "{} renderer is missing {what}", renderer.name())
            }
            Self::NoSampler { renderer } => {
                write!(f, "{} renderer needs a function sampler", renderer.name())
            }
        }
    }
}

impl std::error::Error for RenderUnavailable {}
