#![forbid(unsafe_code)]

//! numer public facade crate.
//!
//! Re-exports the schema model, the invocation runtime and (with the `viz`
//! feature) the result formatters, and offers a [`Workbench`] tying them
//! together: one schema registry, one shared compute gateway, and sessions
//! mounted per method.

use std::fmt;
use std::sync::Arc;

// --- Core re-exports -------------------------------------------------------

pub use numer_core::{
    ArgCast, DisplayMode, DisplaySpec, Example, ExampleSchema, FieldSpec, FieldType, Fields,
    InputSchema, IoSchema, Layout, MethodId, MethodSchema, OrderedMap, OutputDescriptor,
    RegistryConfig, SchemaError, SchemaRegistry, Shape, ShapeRule, SizeAxis, SizeSpec, Value,
};

// --- Runtime re-exports ----------------------------------------------------

pub use numer_runtime::{
    Arg, ComputeModule, ForeignComputationError, FunctionTable, Gateway, GatewayStatus,
    MarshalError, MethodSession, NumerError, ParamHook, ParameterStore, ShapeInferenceError,
};

// --- Viz re-exports --------------------------------------------------------

#[cfg(feature = "viz")]
pub use numer_viz::{
    BoxView, Chart, Domain, FunctionSampler, OutputDispatcher, PixelRect, Point, RenderContext,
    RenderedOutput, RendererKind, TableView, ViewportConfig, ViewportController,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for numer hosts.
#[derive(Debug)]
pub enum Error {
    /// The schema table could not be loaded.
    Schema(SchemaError),
    /// A session operation failed.
    Runtime(NumerError),
    /// No method with this topic and name is registered.
    UnknownMethod { topic: String, method: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "{err}"),
            Self::Runtime(err) => write!(f, "{err}"),
            Self::UnknownMethod { topic, method } => write!(f, "unknown method {topic}/{method}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Runtime(err) => Some(err),
            Self::UnknownMethod { .. } => None,
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<NumerError> for Error {
    fn from(err: NumerError) -> Self {
        Self::Runtime(err)
    }
}

/// Standard result type for numer APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Workbench -------------------------------------------------------------

/// A loaded schema table plus the compute gateway shared by every session.
pub struct Workbench {
    registry: SchemaRegistry,
    gateway: Arc<Gateway>,
    #[cfg(feature = "viz")]
    dispatcher: OutputDispatcher,
}

impl fmt::Debug for Workbench {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbench")
            .field("methods", &self.registry.len())
            .field("gateway", &self.gateway.status())
            .finish_non_exhaustive()
    }
}

impl Workbench {
    pub fn new(registry: SchemaRegistry, module: impl ComputeModule + 'static) -> Self {
        Self::with_gateway(registry, Arc::new(Gateway::new(module)))
    }

    pub fn with_gateway(registry: SchemaRegistry, gateway: Arc<Gateway>) -> Self {
        Self {
            registry,
            gateway,
            #[cfg(feature = "viz")]
            dispatcher: OutputDispatcher::from_env(),
        }
    }

    /// Load schemas as configured by the environment (`NUMER_SCHEMA_PATH`).
    pub fn from_env(module: impl ComputeModule + 'static) -> Result<Self> {
        let registry = RegistryConfig::from_env().load()?;
        Ok(Self::new(registry, module))
    }

    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    #[must_use]
    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Mount a session for `topic/method`, seeded from its first example.
    pub fn session(&self, topic: &str, method: &str) -> Result<MethodSession<'_>> {
        let schema = self
            .registry
            .get(topic, method)
            .ok_or_else(|| Error::UnknownMethod {
                topic: topic.to_owned(),
                method: method.to_owned(),
            })?;
        Ok(MethodSession::mount(
            MethodId::new(topic, method),
            schema,
            Arc::clone(&self.gateway),
        ))
    }

    #[cfg(feature = "viz")]
    #[must_use]
    pub fn dispatcher(&self) -> &OutputDispatcher {
        &self.dispatcher
    }

    #[cfg(feature = "viz")]
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: OutputDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Format the session's last result per its display spec.
    ///
    /// Empty when the session has no result or the method declares no
    /// display.
    #[cfg(feature = "viz")]
    #[must_use]
    pub fn render(
        &self,
        session: &MethodSession<'_>,
        sampler: Option<&dyn FunctionSampler>,
    ) -> Vec<RenderedOutput> {
        let (Some(raw), Some(display)) = (session.store().result(), &session.schema().io.display)
        else {
            return Vec::new();
        };
        let id = session.id();
        let mut ctx = RenderContext::new(&id.topic, &id.method);
        if let Some(sampler) = sampler {
            ctx = ctx.with_sampler(sampler);
        }
        self.dispatcher
            .render(&ctx, display, raw, session.store().values())
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Example, Fields, FunctionTable, Gateway, MethodId, MethodSession, Result,
        SchemaRegistry, Value, Workbench,
    };

    #[cfg(feature = "viz")]
    pub use crate::{OutputDispatcher, RenderedOutput, ViewportController};

    #[cfg(feature = "viz")]
    pub use crate::viz;
    pub use crate::{core, runtime};
}

pub use numer_core as core;
pub use numer_runtime as runtime;
#[cfg(feature = "viz")]
pub use numer_viz as viz;
