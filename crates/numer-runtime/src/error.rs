#![forbid(unsafe_code)]

//! Error types of the invocation pipeline.

use std::fmt;

/// Why an argument list could not be assembled.
#[derive(Debug, Clone, PartialEq)]
pub enum MarshalError {
    /// No merged parameter carries the key an argument resolves to.
    MissingParameter { key: String },
    /// The value cannot be passed across the call boundary.
    UnsupportedValue { key: String, reason: String },
    /// A declared cast does not fit the flattened value.
    InvalidCast { key: String, value: f64 },
}

impl fmt::Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalError::MissingParameter { key } => write!(f, "Missing param : \"{key}\""),
            MarshalError::UnsupportedValue { key, reason } => {
                write!(f, "unsupported value for \"{key}\": {reason}")
            }
            MarshalError::InvalidCast { key, value } => {
                write!(f, "\"{key}\" entry {value} is not an unsigned 32-bit integer")
            }
        }
    }
}

impl std::error::Error for MarshalError {}

/// The size of an example could not be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeInferenceError {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for ShapeInferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot infer size from field \"{}\": {}",
            self.field, self.reason
        )
    }
}

impl std::error::Error for ShapeInferenceError {}

/// How a foreign call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignFailure {
    /// The module could not be initialized (memoized).
    Unavailable(String),
    /// The function returned a string instead of data.
    Returned(String),
    /// The function faulted.
    Fault(String),
}

/// A failed foreign computation, normalized into one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignComputationError {
    pub function: String,
    pub failure: ForeignFailure,
}

impl ForeignComputationError {
    /// The user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match &self.failure {
            ForeignFailure::Unavailable(msg)
            | ForeignFailure::Returned(msg)
            | ForeignFailure::Fault(msg) => msg,
        }
    }
}

impl fmt::Display for ForeignComputationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            ForeignFailure::Unavailable(msg) => {
                write!(f, "compute module unavailable: {msg}")
            }
            ForeignFailure::Returned(msg) | ForeignFailure::Fault(msg) => {
                write!(f, "{} failed: {msg}", self.function)
            }
        }
    }
}

impl std::error::Error for ForeignComputationError {}

/// Any failure of a method session.
#[derive(Debug, Clone, PartialEq)]
pub enum NumerError {
    Marshal(MarshalError),
    ShapeInference(ShapeInferenceError),
    ForeignComputation(ForeignComputationError),
    /// An edit named a field the input schema does not declare.
    UnknownField { name: String },
    /// A cell edit addressed a position outside the field's current shape.
    CellOutOfBounds {
        name: String,
        row: usize,
        col: usize,
    },
    /// No example with this name exists.
    UnknownExample { name: String },
    /// The external parameter hook rejected the current values.
    ExternalParams { reason: String },
}

impl fmt::Display for NumerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumerError::Marshal(e) => write!(f, "{e}"),
            NumerError::ShapeInference(e) => write!(f, "{e}"),
            NumerError::ForeignComputation(e) => write!(f, "{e}"),
            NumerError::UnknownField { name } => write!(f, "unknown input field \"{name}\""),
            NumerError::CellOutOfBounds { name, row, col } => {
                write!(f, "cell ({row}, {col}) is outside field \"{name}\"")
            }
            NumerError::UnknownExample { name } => write!(f, "no example named \"{name}\""),
            NumerError::ExternalParams { reason } => {
                write!(f, "external parameters unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for NumerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NumerError::Marshal(e) => Some(e),
            NumerError::ShapeInference(e) => Some(e),
            NumerError::ForeignComputation(e) => Some(e),
            NumerError::UnknownField { .. }
            | NumerError::CellOutOfBounds { .. }
            | NumerError::UnknownExample { .. }
            | NumerError::ExternalParams { .. } => None,
        }
    }
}

impl From<MarshalError> for NumerError {
    fn from(e: MarshalError) -> Self {
        NumerError::Marshal(e)
    }
}

impl From<ShapeInferenceError> for NumerError {
    fn from(e: ShapeInferenceError) -> Self {
        NumerError::ShapeInference(e)
    }
}

impl From<ForeignComputationError> for NumerError {
    fn from(e: ForeignComputationError) -> Self {
        NumerError::ForeignComputation(e)
    }
}

/// Result alias for session operations.
pub type NumerResult<T> = Result<T, NumerError>;
