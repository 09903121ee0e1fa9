#![forbid(unsafe_code)]

//! Per-method parameter state.
//!
//! A [`ParameterStore`] owns what one mounted method page edits: the current
//! size, the current field values, and the slot for the last result or error.
//! Every change to the inputs clears that slot, so a shown result always
//! belongs to the inputs on screen.

use numer_core::{FieldSpec, FieldType, Fields, InputSchema, Value};
use tracing::debug;

use crate::error::{NumerError, NumerResult};

/// Default values for every field of `schema` at `size`.
///
/// Grid fields become `rows` x `cols` arrays of `0` (numbers) or `""`
/// (strings and selects). Scalars take `min` when a number field has a
/// positive lower bound, otherwise `0`; strings start empty; selects take
/// their first option (`null` without options).
#[must_use]
pub fn default_values(schema: &InputSchema, size: usize) -> Fields {
    schema
        .inputs
        .iter()
        .map(|(name, spec)| (name, default_for(spec, size)))
        .collect()
}

fn default_for(spec: &FieldSpec, size: usize) -> Value {
    match spec.shape.resolve(size) {
        Some(shape) => {
            let fill = match spec.kind {
                FieldType::Number => Value::Number(0.0),
                FieldType::String | FieldType::Select => Value::Text(String::new()),
            };
            Value::grid(shape.rows, shape.cols, fill)
        }
        None => match spec.kind {
            FieldType::Number => match spec.min {
                Some(min) if min > 0.0 => Value::Number(min),
                _ => Value::Number(0.0),
            },
            FieldType::String => Value::Text(String::new()),
            FieldType::Select => spec
                .options
                .first()
                .map(|option| option.value.clone())
                .unwrap_or_default(),
        },
    }
}

/// Mutable state of one mounted method.
#[derive(Debug, Clone)]
pub struct ParameterStore<'s> {
    schema: &'s InputSchema,
    size: usize,
    values: Fields,
    /// At most one of `result` and `error` is set.
    result: Option<Value>,
    error: Option<String>,
}

impl<'s> ParameterStore<'s> {
    /// A store at the schema's initial size holding default values.
    #[must_use]
    pub fn new(schema: &'s InputSchema) -> Self {
        let size = schema.initial_size();
        Self {
            schema,
            size,
            values: default_values(schema, size),
            result: None,
            error: None,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &'s InputSchema {
        self.schema
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn values(&self) -> &Fields {
        &self.values
    }

    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace every value with its default for the current size.
    pub fn reset_to_default(&mut self) -> &Fields {
        self.values = default_values(self.schema, self.size);
        self.clear_output();
        debug!(size = self.size, fields = self.values.len(), "reset to defaults");
        &self.values
    }

    /// Change the size from the size control.
    ///
    /// The size is clamped to the declared range and all values are reset
    /// for the new shapes. A clamped size equal to the current one leaves
    /// the values untouched. Returns the size actually applied. Without a
    /// size control the store keeps size 0.
    pub fn set_size(&mut self, size: usize) -> usize {
        let Some(spec) = &self.schema.size else {
            return self.size;
        };
        let size = spec.clamp(size);
        if size == self.size {
            return size;
        }
        self.size = size;
        self.reset_to_default();
        self.size
    }

    /// Install values coming from an example.
    ///
    /// Unlike [`set_size`](Self::set_size) this keeps the given values
    /// instead of re-defaulting them for the new size.
    pub fn apply_example(&mut self, size: Option<usize>, values: Fields) {
        if let Some(size) = size {
            self.size = size;
        }
        self.values = values;
        self.clear_output();
        debug!(size = self.size, "example applied");
    }

    /// Set a scalar field. Numbers are clamped to the field's bounds.
    pub fn set_scalar(&mut self, name: &str, value: Value) -> NumerResult<()> {
        let spec = self.field(name)?;
        let value = clamp_value(spec, value);
        self.values.insert(name, value);
        self.clear_output();
        Ok(())
    }

    /// Set one cell of a grid field. Numbers are clamped to the field's bounds.
    pub fn set_cell(&mut self, name: &str, row: usize, col: usize, value: Value) -> NumerResult<()> {
        let spec = self.field(name)?;
        let value = clamp_value(spec, value);
        let out_of_bounds = || NumerError::CellOutOfBounds {
            name: name.to_owned(),
            row,
            col,
        };
        let Some(shape) = spec.shape.resolve(self.size) else {
            return Err(out_of_bounds());
        };
        if row >= shape.rows || col >= shape.cols {
            return Err(out_of_bounds());
        }
        let fill = default_for(spec, 1);
        if !self.values.contains_key(name) {
            self.values.insert(name, default_for(spec, self.size));
        }
        let Some(grid) = self.values.get_mut(name) else {
            return Err(out_of_bounds());
        };
        if !matches!(grid, Value::Array(_)) {
            *grid = Value::grid(shape.rows, shape.cols, cell_fill(&fill));
        }
        let Value::Array(rows) = grid else {
            return Err(out_of_bounds());
        };
        while rows.len() <= row {
            rows.push(Value::Array(Vec::new()));
        }
        let target = &mut rows[row];
        if !matches!(target, Value::Array(_)) {
            *target = Value::Array(Vec::new());
        }
        if let Value::Array(cells) = target {
            while cells.len() <= col {
                cells.push(cell_fill(&fill));
            }
            cells[col] = value;
        }
        self.clear_output();
        Ok(())
    }

    /// Store a computation result, replacing any previous outcome.
    pub fn set_result(&mut self, value: Value) -> &Value {
        self.error = None;
        self.result.insert(value)
    }

    /// Store a user-visible error message, replacing any previous outcome.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.result = None;
        self.error = Some(message.into());
    }

    pub fn clear_output(&mut self) {
        self.result = None;
        self.error = None;
    }

    /// Current values plus `size` when the schema has a size control.
    #[must_use]
    pub fn params(&self) -> Fields {
        let mut params = self.values.clone();
        if self.schema.size.is_some() {
            params.insert("size", Value::Number(self.size as f64));
        }
        params
    }

    /// [`params`](Self::params) overlaid with `external`; external keys win.
    #[must_use]
    pub fn merged_params(&self, external: &Fields) -> Fields {
        let mut merged = self.params();
        merged.merge_from(external);
        merged
    }

    fn field(&self, name: &str) -> NumerResult<&'s FieldSpec> {
        self.schema
            .field(name)
            .ok_or_else(|| NumerError::UnknownField {
                name: name.to_owned(),
            })
    }
}

fn clamp_value(spec: &FieldSpec, value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(spec.clamp_number(n)),
        other => other,
    }
}

/// The fill of a single cell, taken from a size-1 default grid.
fn cell_fill(default_grid: &Value) -> Value {
    default_grid
        .as_array()
        .and_then(|rows| rows.first())
        .and_then(Value::as_array)
        .and_then(|cells| cells.first())
        .cloned()
        .unwrap_or(Value::Number(0.0))
}
