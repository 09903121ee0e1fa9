#![forbid(unsafe_code)]

//! Declarative method schemas.
//!
//! A method is described by three documents:
//!
//! - [`InputSchema`]: the optional size control plus every user-editable
//!   field with its [`ShapeRule`], type, and bounds.
//! - [`IoSchema`]: the foreign function name, the positional argument order,
//!   renames from canonical argument names to parameter keys, and how the
//!   result should be displayed.
//! - [`ExampleSchema`]: named sets of ready-made input values.
//!
//! [`SchemaRegistry`] holds the full `topic -> method -> MethodSchema` table.
//! It is built once and then only read.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shape::{ShapeRule, SizeSpec};
use crate::value::{OrderedMap, Value};

/// Schema table compiled into the crate.
const BUNDLED_SCHEMAS: &str = include_str!("../schemas/methods.json");

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while loading or validating a schema table.
#[derive(Debug)]
pub enum SchemaError {
    /// Reading a schema file failed.
    Io { path: PathBuf, source: std::io::Error },
    /// The document is not valid schema JSON.
    Parse(serde_json::Error),
    /// A method schema is internally inconsistent.
    Invalid { method: MethodId, reason: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Io { path, source } => {
                write!(f, "cannot read schema file {}: {source}", path.display())
            }
            SchemaError::Parse(e) => write!(f, "malformed schema document: {e}"),
            SchemaError::Invalid { method, reason } => {
                write!(f, "invalid schema for {method}: {reason}")
            }
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Io { source, .. } => Some(source),
            SchemaError::Parse(e) => Some(e),
            SchemaError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Parse(e)
    }
}

/// Result alias for schema loading.
pub type SchemaResult<T> = Result<T, SchemaError>;

// ============================================================================
// Input schema
// ============================================================================

/// Editor type of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Number,
    String,
    Select,
}

/// One choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Declaration of one input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub shape: ShapeRule,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl FieldSpec {
    /// A scalar number field without bounds.
    #[must_use]
    pub fn number() -> Self {
        Self {
            shape: ShapeRule::Scalar,
            kind: FieldType::Number,
            min: None,
            max: None,
            options: Vec::new(),
        }
    }

    /// A scalar string field.
    #[must_use]
    pub fn string() -> Self {
        Self {
            kind: FieldType::String,
            ..Self::number()
        }
    }

    /// A select field over the given options.
    #[must_use]
    pub fn select(options: Vec<SelectOption>) -> Self {
        Self {
            kind: FieldType::Select,
            options,
            ..Self::number()
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: ShapeRule) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Clamp a numeric entry into the declared bounds.
    ///
    /// Bounds only apply to number fields.
    #[must_use]
    pub fn clamp_number(&self, value: f64) -> f64 {
        if self.kind != FieldType::Number {
            return value;
        }
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        v
    }
}

/// User-editable inputs of a method.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeSpec>,
    pub inputs: OrderedMap<FieldSpec>,
}

impl InputSchema {
    /// The initial size: the size control's minimum, or 0 without one.
    #[must_use]
    pub fn initial_size(&self) -> usize {
        self.size.as_ref().map_or(0, |s| s.min)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.inputs.get(name)
    }

    /// The first field whose shape depends on the size.
    ///
    /// A field governs the size when it resolves to a grid at size 1.
    #[must_use]
    pub fn size_governing_field(&self) -> Option<(&str, &FieldSpec)> {
        self.inputs
            .iter()
            .find(|(_, spec)| spec.shape.resolve(1).is_some())
    }
}

// ============================================================================
// IO schema
// ============================================================================

/// Conversion applied to an argument after flattening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgCast {
    /// Unsigned 32-bit integer sequence.
    U32Seq,
}

/// JSON-Schema-like type tag of an output descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Number,
    String,
    Array,
    Object,
}

/// Documentation of the foreign function's return value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OutputType>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<OutputDescriptor>>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub properties: OrderedMap<OutputDescriptor>,
}

impl OutputDescriptor {
    /// Whether `value` conforms to this descriptor.
    ///
    /// An untyped descriptor accepts anything. Object properties listed here
    /// must be present unless they are nullable; extra properties are fine.
    #[must_use]
    pub fn describes(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.nullable || self.kind.is_none();
        }
        let Some(kind) = self.kind else {
            return true;
        };
        match (kind, value) {
            (OutputType::Number, Value::Number(_)) => true,
            (OutputType::String, Value::Text(_)) => true,
            (OutputType::Array, Value::Array(items)) => match &self.items {
                Some(item) => items.iter().all(|v| item.describes(v)),
                None => true,
            },
            (OutputType::Object, Value::Record(fields)) => {
                self.properties.iter().all(|(name, prop)| match fields.get(name) {
                    Some(v) => prop.describes(v),
                    None => prop.nullable,
                })
            }
            _ => false,
        }
    }
}

/// A visualization mode requested by a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "box")]
    Box,
    #[serde(rename = "graph2D")]
    Graph2D,
    #[serde(rename = "graph3D")]
    Graph3D,
    /// Any mode this build does not know; rendered as a placeholder.
    #[serde(other)]
    Unsupported,
}

impl DisplayMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Table => "table",
            DisplayMode::Box => "box",
            DisplayMode::Graph2D => "graph2D",
            DisplayMode::Graph3D => "graph3D",
            DisplayMode::Unsupported => "unsupported",
        }
    }
}

/// Orientation of the primary box section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Horizontal,
    Vertical,
}

/// How a method's result is shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySpec {
    pub mode: Vec<DisplayMode>,
    #[serde(default)]
    pub layout: Layout,
    /// Keys of the primary box section. `"="` and `"\n"` are separators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub main: Vec<String>,
}

/// Foreign call description of a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoSchema {
    #[serde(rename = "fn")]
    pub function: String,
    /// Canonical argument names in positional order.
    pub inputs: Vec<String>,
    /// Canonical name to parameter key renames.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub map: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub casts: BTreeMap<String, ArgCast>,
    #[serde(default)]
    pub outputs: OutputDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplaySpec>,
}

impl IoSchema {
    /// The parameter key that supplies a canonical argument.
    #[must_use]
    pub fn resolve_key<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.map.get(canonical).map_or(canonical, String::as_str)
    }

    #[must_use]
    pub fn cast_for(&self, canonical: &str) -> Option<ArgCast> {
        self.casts.get(canonical).copied()
    }
}

// ============================================================================
// Examples
// ============================================================================

/// A named set of input values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub name: String,
    pub inputs: OrderedMap<Value>,
}

/// All examples of a method, in declared order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleSchema {
    pub examples: Vec<Example>,
}

impl ExampleSchema {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Example> {
        self.examples.iter().find(|e| e.name == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

// ============================================================================
// Registry
// ============================================================================

/// `topic/method` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    pub topic: String,
    pub method: String,
}

impl MethodId {
    #[must_use]
    pub fn new(topic: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.topic, self.method)
    }
}

/// The three schema documents of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSchema {
    #[serde(default)]
    pub title: String,
    pub input: InputSchema,
    pub io: IoSchema,
    #[serde(default, skip_serializing_if = "ExampleSchema::is_empty")]
    pub examples: ExampleSchema,
}

impl MethodSchema {
    fn validate(&self, id: &MethodId) -> SchemaResult<()> {
        let invalid = |reason: String| SchemaError::Invalid {
            method: id.clone(),
            reason,
        };
        if let Some(size) = &self.input.size
            && size.min > size.max
        {
            return Err(invalid(format!(
                "size range {}..={} is empty",
                size.min, size.max
            )));
        }
        for (name, field) in self.input.inputs.iter() {
            if let (Some(min), Some(max)) = (field.min, field.max)
                && min > max
            {
                return Err(invalid(format!("field {name:?} has min {min} > max {max}")));
            }
        }
        if self.io.function.is_empty() {
            return Err(invalid("empty foreign function name".into()));
        }
        for canonical in self.io.casts.keys() {
            if !self.io.inputs.contains(canonical) {
                return Err(invalid(format!("cast for unknown argument {canonical:?}")));
            }
        }
        Ok(())
    }
}

/// Immutable `topic -> method -> schema` table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    topics: OrderedMap<OrderedMap<MethodSchema>>,
}

impl SchemaRegistry {
    /// Parse and validate a schema document.
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let registry: SchemaRegistry = serde_json::from_str(text)?;
        for (id, schema) in registry.iter() {
            schema.validate(&id)?;
        }
        crate::info!(methods = registry.len(), "schema table loaded");
        Ok(registry)
    }

    /// Read and parse a schema document from disk.
    pub fn load(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// The table compiled into this crate.
    pub fn bundled() -> SchemaResult<Self> {
        Self::from_json_str(BUNDLED_SCHEMAS)
    }

    #[must_use]
    pub fn get(&self, topic: &str, method: &str) -> Option<&MethodSchema> {
        self.topics.get(topic)?.get(method)
    }

    /// Find a method by name in any topic.
    #[must_use]
    pub fn find_method(&self, method: &str) -> Option<(MethodId, &MethodSchema)> {
        self.topics.iter().find_map(|(topic, methods)| {
            methods
                .get(method)
                .map(|schema| (MethodId::new(topic, method), schema))
        })
    }

    /// Topic names in document order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys()
    }

    /// Method names of a topic in document order.
    pub fn methods(&self, topic: &str) -> impl Iterator<Item = &str> {
        self.topics.get(topic).into_iter().flat_map(OrderedMap::keys)
    }

    /// Every method in document order.
    pub fn iter(&self) -> impl Iterator<Item = (MethodId, &MethodSchema)> {
        self.topics.iter().flat_map(|(topic, methods)| {
            methods
                .iter()
                .map(move |(method, schema)| (MethodId::new(topic, method), schema))
        })
    }

    /// Total number of methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.values().map(OrderedMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
