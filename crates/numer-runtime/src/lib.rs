#![forbid(unsafe_code)]

//! Runtime: parameter state, example loading, argument marshalling, and
//! the gateway to the compute module.

pub mod error;
pub mod example;
pub mod gateway;
pub mod marshal;
pub mod session;
pub mod store;

pub use error::{
    ForeignComputationError, ForeignFailure, MarshalError, NumerError, NumerResult,
    ShapeInferenceError,
};
pub use example::{LoadedExample, load_example};
pub use gateway::{ComputeModule, FunctionTable, Gateway, GatewayStatus};
pub use marshal::{Arg, align, flatten};
pub use session::{MethodSession, ParamHook};
pub use store::{ParameterStore, default_values};
