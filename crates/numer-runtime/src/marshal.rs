#![forbid(unsafe_code)]

//! Turning named parameters into the positional argument list of a call.
//!
//! Arguments follow `io.inputs` exactly. Each canonical name is resolved
//! through `io.map`, looked up in the merged parameters, and then passed as
//! a scalar or flattened row-major into a single sequence.

use numer_core::{ArgCast, Fields, IoSchema, Value};
use tracing::debug;

use crate::error::MarshalError;

/// One positional argument of a foreign call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    F64Seq(Vec<f64>),
    U32Seq(Vec<u32>),
    Number(f64),
    Text(String),
    TextSeq(Vec<String>),
}

impl Arg {
    /// Short type name used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Arg::F64Seq(_) => "f64[]",
            Arg::U32Seq(_) => "u32[]",
            Arg::Number(_) => "number",
            Arg::Text(_) => "string",
            Arg::TextSeq(_) => "string[]",
        }
    }

    #[must_use]
    pub fn as_f64_seq(&self) -> Option<&[f64]> {
        match self {
            Arg::F64Seq(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Leaves of `value` in depth-first, row-major order.
///
/// A non-array value is its own single leaf.
pub fn flatten(value: &Value) -> Vec<&Value> {
    fn walk<'v>(value: &'v Value, out: &mut Vec<&'v Value>) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
            leaf => out.push(leaf),
        }
    }
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

/// Build the argument list for `io` from the merged parameters.
pub fn align(io: &IoSchema, merged: &Fields) -> Result<Vec<Arg>, MarshalError> {
    let args = io
        .inputs
        .iter()
        .map(|canonical| {
            let key = io.resolve_key(canonical);
            let value = merged
                .get(key)
                .ok_or_else(|| MarshalError::MissingParameter {
                    key: key.to_owned(),
                })?;
            let arg = to_arg(key, value)?;
            match io.cast_for(canonical) {
                Some(cast) => apply_cast(key, cast, arg),
                None => Ok(arg),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(function = %io.function, args = args.len(), "arguments aligned");
    Ok(args)
}

fn to_arg(key: &str, value: &Value) -> Result<Arg, MarshalError> {
    let unsupported = |reason: String| MarshalError::UnsupportedValue {
        key: key.to_owned(),
        reason,
    };
    match value {
        Value::Number(n) => Ok(Arg::Number(*n)),
        Value::Text(s) => Ok(Arg::Text(s.clone())),
        Value::Null => Err(unsupported("value is null".into())),
        Value::Record(_) => Err(unsupported("records cannot be passed".into())),
        Value::Array(_) => {
            let leaves = flatten(value);
            if leaves.iter().all(|leaf| matches!(leaf, Value::Number(_))) {
                return Ok(Arg::F64Seq(leaves.iter().filter_map(|l| l.as_f64()).collect()));
            }
            if leaves.iter().all(|leaf| matches!(leaf, Value::Text(_))) {
                return Ok(Arg::TextSeq(
                    leaves
                        .iter()
                        .filter_map(|l| l.as_str().map(str::to_owned))
                        .collect(),
                ));
            }
            let odd = leaves
                .iter()
                .find(|leaf| !matches!(leaf, Value::Number(_)))
                .map_or("value", |leaf| leaf.kind_name());
            Err(unsupported(format!("array mixes numbers with {odd} entries")))
        }
    }
}

fn apply_cast(key: &str, cast: ArgCast, arg: Arg) -> Result<Arg, MarshalError> {
    match cast {
        ArgCast::U32Seq => {
            let numbers = match arg {
                Arg::F64Seq(items) => items,
                Arg::Number(n) => vec![n],
                Arg::U32Seq(items) => return Ok(Arg::U32Seq(items)),
                other => {
                    return Err(MarshalError::UnsupportedValue {
                        key: key.to_owned(),
                        reason: format!("cannot cast {} to u32[]", other.kind_name()),
                    });
                }
            };
            numbers
                .into_iter()
                .map(|n| to_u32(n).ok_or(MarshalError::InvalidCast {
                    key: key.to_owned(),
                    value: n,
                }))
                .collect::<Result<Vec<_>, _>>()
                .map(Arg::U32Seq)
        }
    }
}

fn to_u32(n: f64) -> Option<u32> {
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
        Some(n as u32)
    } else {
        None
    }
}
