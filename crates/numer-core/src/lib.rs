#![forbid(unsafe_code)]

//! Core: method schemas, shape rules, and the value model.

pub mod config;
pub mod logging;
pub mod schema;
pub mod shape;
pub mod value;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, info_span, trace, warn};

pub use config::RegistryConfig;
pub use schema::{
    ArgCast, DisplayMode, DisplaySpec, Example, ExampleSchema, FieldSpec, FieldType, InputSchema,
    IoSchema, Layout, MethodId, MethodSchema, OutputDescriptor, OutputType, SchemaError,
    SchemaRegistry, SchemaResult, SelectOption,
};
pub use shape::{Shape, ShapeRule, SizeAxis, SizeSpec};
pub use value::{Fields, OrderedMap, Value};
