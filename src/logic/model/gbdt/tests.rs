use ndarray::Array2;
use serde_json::json;

use super::*;
use crate::logic::features::layout::canonical_columns;

fn schema() -> FeatureSchema {
    FeatureSchema::new(canonical_columns()).unwrap()
}

/// Stump on `split`: left leaf when x < threshold, right leaf otherwise
fn stump(split: &str, threshold: f32, left: f32, right: f32) -> serde_json::Value {
    json!({
        "nodeid": 0, "depth": 0, "split": split, "split_condition": threshold,
        "yes": 1, "no": 2, "missing": 1,
        "children": [
            { "nodeid": 1, "leaf": left },
            { "nodeid": 2, "leaf": right }
        ]
    })
}

fn leaf(value: f32) -> serde_json::Value {
    json!({ "nodeid": 0, "leaf": value })
}

fn spec(value: serde_json::Value) -> GbdtSpec {
    serde_json::from_value(value).unwrap()
}

/// Class id per row
fn predicted(model: &TreeEnsemble, features: &Array2<f32>) -> Vec<usize> {
    model.predict(features).unwrap().class_ids
}

fn row_with(column: usize, value: f32) -> Array2<f32> {
    let mut m = Array2::<f32>::zeros((1, 10));
    m[[0, column]] = value;
    m
}

#[test]
fn test_softprob_rows_sum_to_one() {
    let s = spec(json!({
        "objective": "multi:softprob",
        "num_class": 3,
        "trees": [
            stump("Destination Port", 1000.0, 2.0, -1.0),
            stump("Destination Port", 1000.0, -1.0, 2.0),
            leaf(0.0),
        ]
    }));
    let model = TreeEnsemble::from_spec(&s, &schema()).unwrap();
    assert_eq!(model.n_classes(), 3);

    let mut m = Array2::<f32>::zeros((2, 10));
    m[[0, 0]] = 80.0;
    m[[1, 0]] = 8080.0;
    let proba = model.predict_proba(&m).unwrap();

    for row in proba.rows() {
        let sum: f32 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }
    assert_eq!(predicted(&model, &m), vec![0, 1]);
}

#[test]
fn test_trees_cycle_over_classes() {
    // Two boosting rounds, two classes: trees 0 and 2 feed class 0.
    let s = spec(json!({
        "objective": "multi:softprob",
        "num_class": 2,
        "trees": [leaf(1.0), leaf(0.0), leaf(1.0), leaf(0.0)]
    }));
    let model = TreeEnsemble::from_spec(&s, &schema()).unwrap();
    let proba = model.predict_proba(&Array2::zeros((1, 10))).unwrap();

    let expected = 1.0 / (1.0 + (-2.0f32).exp());
    assert!((proba[[0, 0]] - expected).abs() < 1e-5);
}

#[test]
fn test_positional_split_names() {
    let s = spec(json!({
        "num_class": 2,
        "trees": [stump("f3", 100.0, 1.0, -1.0), leaf(0.0)]
    }));
    let model = TreeEnsemble::from_spec(&s, &schema()).unwrap();

    assert_eq!(predicted(&model, &row_with(3, 10.0)), vec![0]);
    assert_eq!(predicted(&model, &row_with(3, 500.0)), vec![1]);
}

#[test]
fn test_missing_value_follows_missing_branch() {
    let s = spec(json!({
        "num_class": 2,
        "trees": [
            {
                "nodeid": 0, "split": "Fwd IAT Std", "split_condition": 5.0,
                "yes": 1, "no": 2, "missing": 2,
                "children": [{ "nodeid": 1, "leaf": 3.0 }, { "nodeid": 2, "leaf": -3.0 }]
            },
            leaf(0.0)
        ]
    }));
    let model = TreeEnsemble::from_spec(&s, &schema()).unwrap();

    assert_eq!(predicted(&model, &row_with(5, 1.0)), vec![0]);
    assert_eq!(predicted(&model, &row_with(5, f32::NAN)), vec![1]);
}

#[test]
fn test_binary_logistic() {
    let s = spec(json!({
        "objective": "binary:logistic",
        "base_score": 0.5,
        "trees": [stump("Flow IAT Min", 10.0, -2.0, 2.0)]
    }));
    let model = TreeEnsemble::from_spec(&s, &schema()).unwrap();
    assert_eq!(model.n_classes(), 2);

    let proba = model.predict_proba(&row_with(6, 50.0)).unwrap();
    let p1 = 1.0 / (1.0 + (-2.0f32).exp());
    assert!((proba[[0, 1]] - p1).abs() < 1e-5);
    assert!((proba[[0, 0]] - (1.0 - p1)).abs() < 1e-5);
}

#[test]
fn test_rejects_unknown_split_feature() {
    let s = spec(json!({
        "num_class": 2,
        "trees": [stump("Total Fwd Packets", 1.0, 0.0, 1.0), leaf(0.0)]
    }));
    let err = TreeEnsemble::from_spec(&s, &schema()).unwrap_err();
    assert!(err.to_string().contains("Total Fwd Packets"));

    let s = spec(json!({
        "num_class": 2,
        "trees": [stump("f10", 1.0, 0.0, 1.0), leaf(0.0)]
    }));
    assert!(TreeEnsemble::from_spec(&s, &schema()).is_err());
}

#[test]
fn test_rejects_link_outside_children() {
    let s = spec(json!({
        "num_class": 2,
        "trees": [
            {
                "nodeid": 0, "split": "f0", "split_condition": 1.0,
                "yes": 1, "no": 0, "missing": 1,
                "children": [{ "nodeid": 1, "leaf": 0.0 }, { "nodeid": 2, "leaf": 1.0 }]
            },
            leaf(0.0)
        ]
    }));
    assert!(matches!(
        TreeEnsemble::from_spec(&s, &schema()),
        Err(ModelError::Definition(_))
    ));
}

#[test]
fn test_rejects_uneven_tree_count() {
    let s = spec(json!({
        "num_class": 3,
        "trees": [leaf(0.0), leaf(0.0)]
    }));
    assert!(TreeEnsemble::from_spec(&s, &schema()).is_err());
}

#[test]
fn test_rejects_wrong_width() {
    let s = spec(json!({ "num_class": 2, "trees": [leaf(0.0), leaf(0.0)] }));
    let model = TreeEnsemble::from_spec(&s, &schema()).unwrap();
    assert!(matches!(
        model.predict_proba(&Array2::zeros((1, 4))),
        Err(ModelError::FeatureMismatch { expected: 10, actual: 4 })
    ));
}
