#![forbid(unsafe_code)]

//! Property-based invariant tests for the invocation pipeline.
//!
//! 1. Defaults have the exact resolved shape for every size in range.
//! 2. Flattening is depth-first and row-major for any rectangular grid.
//! 3. `align` names the resolved key of the first missing argument.
//! 4. Default values at size `n`, read back as an example, infer `n`.
//! 5. Argument count always equals the declared input count.
//! 6. Scenarios: linear defaults at size 2 and the linear solve layout.
//! 7. Re-applying the current size (directly or via clamping) keeps edits.

use numer_core::{
    Example, Fields, InputSchema, IoSchema, SchemaRegistry, Value,
};
use numer_runtime::{
    Arg, MarshalError, ParameterStore, align, default_values, flatten, load_example,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn sized_schemas() -> Vec<(String, InputSchema)> {
    let registry = SchemaRegistry::bundled().expect("bundled schemas");
    registry
        .iter()
        .filter(|(_, schema)| schema.input.size.is_some())
        .map(|(id, schema)| (id.to_string(), schema.input.clone()))
        .collect()
}

fn grid_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..6, 1usize..6).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(-1e6f64..1e6, cols), rows)
    })
}

fn linear_io() -> IoSchema {
    serde_json::from_str(
        r#"{"fn": "cramer", "inputs": ["mat", "rows", "ans"],
            "map": {"mat": "A", "rows": "size", "ans": "b"}}"#,
    )
    .expect("io schema")
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Default shapes
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn defaults_match_shapes_for_every_size() {
    for (id, schema) in sized_schemas() {
        let range = schema.size.clone().expect("sized");
        for size in range.min..=range.max {
            let values = default_values(&schema, size);
            for (name, spec) in schema.inputs.iter() {
                let value = values.get(name).expect("every field defaulted");
                match spec.shape.resolve(size) {
                    Some(shape) => assert_eq!(
                        value.grid_dims(),
                        Some((shape.rows, shape.cols)),
                        "{id}.{name} at size {size}"
                    ),
                    None => assert!(
                        value.as_array().is_none(),
                        "{id}.{name} should be scalar"
                    ),
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Flatten order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn flatten_is_row_major(grid in grid_strategy()) {
        let expected: Vec<f64> = grid.iter().flatten().copied().collect();
        let value = Value::from(grid);
        let actual: Vec<f64> = flatten(&value).iter().filter_map(|v| v.as_f64()).collect();
        prop_assert_eq!(actual, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Missing parameters
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn missing_key_is_reported(drop in 0usize..3) {
        let keys = ["A", "size", "b"];
        let merged: Fields = keys
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != drop)
            .map(|(_, k)| (*k, Value::from(vec![1.0])))
            .collect();
        prop_assert_eq!(
            align(&linear_io(), &merged),
            Err(MarshalError::MissingParameter { key: keys[drop].to_owned() })
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Example inference recovers the size
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn defaults_read_back_as_examples_infer_their_size() {
    for (id, schema) in sized_schemas() {
        let range = schema.size.clone().expect("sized");
        for size in range.min.max(1)..=range.max {
            let example = Example {
                name: format!("{id} at {size}"),
                inputs: default_values(&schema, size),
            };
            let loaded = load_example(&schema, &example).expect("inferable");
            assert_eq!(loaded.size, Some(size), "{id}");
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Argument count
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arg_count_matches_inputs(n in 2usize..7) {
        let registry = SchemaRegistry::bundled().expect("bundled schemas");
        let schema = registry.get("linear_equation", "cramer").expect("cramer");
        let mut merged = default_values(&schema.input, n);
        merged.insert("size", Value::Number(n as f64));
        let args = align(&schema.io, &merged).expect("aligned");
        prop_assert_eq!(args.len(), schema.io.inputs.len());
        prop_assert_eq!(args[0].as_f64_seq().map(<[f64]>::len), Some(n * n));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Scenarios
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn linear_defaults_at_size_two() {
    let schema: InputSchema = serde_json::from_str(
        r#"{"size": {"label": "Matrix Size", "min": 2, "max": 6},
            "inputs": {"A": {"shape": "square", "type": "number"},
                       "b": {"shape": "column", "type": "number"}}}"#,
    )
    .expect("input schema");
    let values = default_values(&schema, 2);
    assert_eq!(
        values.get("A"),
        Some(&Value::from(vec![vec![0.0, 0.0], vec![0.0, 0.0]]))
    );
    assert_eq!(values.get("b"), Some(&Value::from(vec![vec![0.0], vec![0.0]])));
}

#[test]
fn linear_solve_marshalling() {
    let merged: Fields = [
        ("A", Value::from(vec![vec![2.0, 1.0], vec![1.0, 3.0]])),
        ("b", Value::from(vec![vec![5.0], vec![7.0]])),
        ("size", Value::Number(2.0)),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        align(&linear_io(), &merged),
        Ok(vec![
            Arg::F64Seq(vec![2.0, 1.0, 1.0, 3.0]),
            Arg::Number(2.0),
            Arg::F64Seq(vec![5.0, 7.0]),
        ])
    );
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Unchanged size keeps edits
// ═════════════════════════════════════════════════════════════════════════

fn linear_inputs() -> InputSchema {
    serde_json::from_str(
        r#"{"size": {"label": "Matrix Size", "min": 2, "max": 6},
            "inputs": {"A": {"shape": "square", "type": "number"},
                       "b": {"shape": "column", "type": "number"}}}"#,
    )
    .expect("input schema")
}

#[test]
fn same_size_keeps_cell_edits() {
    let schema = linear_inputs();
    let mut store = ParameterStore::new(&schema);
    store.set_cell("A", 0, 0, Value::Number(9.0)).expect("in bounds");
    assert_eq!(store.set_size(store.size()), 2);
    assert_eq!(
        store.values().get("A"),
        Some(&Value::from(vec![vec![9.0, 0.0], vec![0.0, 0.0]]))
    );
}

proptest! {
    #[test]
    fn clamped_to_current_size_keeps_edits(extra in 0usize..20, cell in -100.0f64..100.0) {
        let schema = linear_inputs();
        let mut store = ParameterStore::new(&schema);
        prop_assert_eq!(store.set_size(6), 6);
        store.set_cell("b", 5, 0, Value::Number(cell)).expect("in bounds");
        let before = store.values().clone();
        prop_assert_eq!(store.set_size(6 + extra), 6);
        prop_assert_eq!(store.values(), &before);

        prop_assert_eq!(store.set_size(5), 5);
        prop_assert_ne!(store.values(), &before);
    }
}
