#![forbid(unsafe_code)]

//! Compile-time table choosing a graph renderer per method.

use crate::renderers::RendererKind;

/// How one topic picks its renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicRule {
    /// The same renderer for every method of the topic.
    All(RendererKind),
    /// Per-method overrides with a fallback.
    PerMethod {
        methods: &'static [(&'static str, RendererKind)],
        default: Option<RendererKind>,
    },
}

impl TopicRule {
    #[must_use]
    pub fn resolve(&self, method: &str) -> Option<RendererKind> {
        match self {
            Self::All(kind) => Some(*kind),
            Self::PerMethod { methods, default } => methods
                .iter()
                .find(|(name, _)| *name == method)
                .map(|(_, kind)| *kind)
                .or(*default),
        }
    }
}

/// Renderer rules by topic.
pub const RENDERER_RULES: &[(&str, TopicRule)] = &[
    ("root_equation", TopicRule::All(RendererKind::RootEquation)),
    ("integration", TopicRule::All(RendererKind::Integral)),
    ("interpolation", TopicRule::All(RendererKind::Interpolation)),
    (
        "regression",
        TopicRule::PerMethod {
            methods: &[
                ("least_square", RendererKind::Interpolation),
                ("multi_least_square", RendererKind::Interpolation),
            ],
            default: None,
        },
    ),
];

/// The renderer for `topic/method`, if a rule names one that supports it.
#[must_use]
pub fn lookup(topic: &str, method: &str) -> Option<RendererKind> {
    RENDERER_RULES
        .iter()
        .find(|(name, _)| *name == topic)
        .and_then(|(_, rule)| rule.resolve(method))
        .filter(|kind| kind.supports(topic, method))
}
