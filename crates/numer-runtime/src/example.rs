#![forbid(unsafe_code)]

//! Seeding a store from a named example.
//!
//! Examples carry raw values only. The method size is recovered from the
//! size-governing field: the first field whose rule yields a grid at size 1.
//! How the size maps onto that grid is named by the rule's [`SizeAxis`].

use numer_core::{Example, Fields, InputSchema, SizeAxis, Value};
use tracing::debug;

use crate::error::ShapeInferenceError;

/// Size and values recovered from an example.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedExample {
    /// `None` when the schema has no size-governing field.
    pub size: Option<usize>,
    pub values: Fields,
}

/// Recover the size an example was written for and its values.
///
/// Values are returned exactly as written; they are not reshaped.
pub fn load_example(
    schema: &InputSchema,
    example: &Example,
) -> Result<LoadedExample, ShapeInferenceError> {
    let values = example.inputs.clone();
    let Some((name, spec)) = schema.size_governing_field() else {
        return Ok(LoadedExample { size: None, values });
    };
    let fail = |reason: &str| ShapeInferenceError {
        field: name.to_owned(),
        reason: reason.to_owned(),
    };

    let Some(axis) = spec.shape.size_axis() else {
        return Err(fail("field shape does not depend on the size"));
    };
    let value = values
        .get(name)
        .ok_or_else(|| fail("example has no value for this field"))?;
    let size = infer_size(axis, value).map_err(|reason| fail(reason))?;
    if size == 0 {
        return Err(fail("inferred size is zero"));
    }
    if let Some(range) = &schema.size
        && !range.contains(size)
    {
        return Err(fail(&format!(
            "inferred size {size} is outside {}..={}",
            range.min, range.max
        )));
    }
    debug!(example = %example.name, size, "example size inferred");
    Ok(LoadedExample {
        size: Some(size),
        values,
    })
}

/// The size implied by a grid value under a given axis.
fn infer_size(axis: SizeAxis, value: &Value) -> Result<usize, &'static str> {
    let rows = value.as_array().ok_or("value is not an array")?;
    match axis {
        SizeAxis::Row => rows
            .first()
            .and_then(Value::as_array)
            .map(<[Value]>::len)
            .ok_or("row value has no inner array"),
        SizeAxis::Column | SizeAxis::Square => Ok(rows.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numer_core::{FieldSpec, ShapeRule, SizeSpec};

    fn schema_with(rule: ShapeRule) -> InputSchema {
        InputSchema {
            size: Some(SizeSpec {
                label: "n".into(),
                min: 1,
                max: 10,
            }),
            inputs: [
                ("target", FieldSpec::number()),
                ("grid", FieldSpec::number().with_shape(rule)),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn example(grid: Value) -> Example {
        Example {
            name: "ex".into(),
            inputs: [("target", Value::Number(2.5)), ("grid", grid)]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn row_uses_inner_length() {
        let loaded = load_example(
            &schema_with(ShapeRule::Row),
            &example(Value::from(vec![vec![1.0, 2.0, 3.0]])),
        )
        .expect("row example");
        assert_eq!(loaded.size, Some(3));
        assert_eq!(loaded.values.get("target"), Some(&Value::Number(2.5)));
    }

    #[test]
    fn column_uses_outer_length() {
        let grid = Value::from(vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]]);
        let loaded =
            load_example(&schema_with(ShapeRule::Column), &example(grid)).expect("column");
        assert_eq!(loaded.size, Some(5));
    }

    #[test]
    fn square_uses_outer_length() {
        let grid = Value::from(vec![vec![2.0, 1.0], vec![1.0, 3.0]]);
        let loaded =
            load_example(&schema_with(ShapeRule::Square), &example(grid)).expect("square");
        assert_eq!(loaded.size, Some(2));
    }

    #[test]
    fn values_are_not_reshaped() {
        let grid = Value::from(vec![vec![2.0, 1.0, 7.0], vec![1.0, 3.0]]);
        let loaded = load_example(&schema_with(ShapeRule::Square), &example(grid.clone()))
            .expect("ragged square");
        assert_eq!(loaded.values.get("grid"), Some(&grid));
    }

    #[test]
    fn fixed_governing_field_fails() {
        let err = load_example(
            &schema_with(ShapeRule::Fixed { rows: 2, cols: 3 }),
            &example(Value::from(vec![vec![1.0, 2.0, 3.0]])),
        )
        .expect_err("fixed shape");
        assert_eq!(err.field, "grid");
    }

    #[test]
    fn degenerate_examples_fail() {
        let schema = schema_with(ShapeRule::Row);
        assert!(load_example(&schema, &example(Value::Number(3.0))).is_err());
        assert!(load_example(&schema, &example(Value::from(vec![1.0, 2.0]))).is_err());
        assert!(load_example(&schema, &example(Value::Array(vec![Value::Array(vec![])]))).is_err());
        let too_big = Value::from(vec![vec![0.0; 11]]);
        assert!(load_example(&schema, &example(too_big)).is_err());
        let missing = Example {
            name: "no grid".into(),
            inputs: Fields::new(),
        };
        assert!(load_example(&schema, &missing).is_err());
    }

    #[test]
    fn no_governing_field_skips_inference() {
        let schema = InputSchema {
            size: None,
            inputs: [("equation", FieldSpec::string())].into_iter().collect(),
        };
        let ex = Example {
            name: "x^2 - 4".into(),
            inputs: [("equation", Value::from("x^2 - 4"))].into_iter().collect(),
        };
        let loaded = load_example(&schema, &ex).expect("scalar example");
        assert_eq!(loaded.size, None);
        assert_eq!(loaded.values, ex.inputs);
    }
}
