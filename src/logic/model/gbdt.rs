//! Gradient-boosted tree ensemble
//!
//! Evaluates trees stored in the XGBoost JSON dump layout
//! (`booster.get_dump(dump_format="json", with_stats=False)`), so a trained
//! XGBoost classifier can be shipped inline in the bundle without a runtime.
//!
//! Split rule: go `yes` when `x < split_condition`, `no` otherwise, and
//! `missing` when `x` is NaN. With `multi:softprob` tree `t` adds to the
//! margin of class `t % num_class`; margins go through softmax. With
//! `binary:logistic` all trees add to one margin that goes through a sigmoid.

use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::{check_width, Classifier, ModelError};
use crate::logic::features::FeatureSchema;

// ============================================================================
// SERIALIZED FORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    #[serde(rename = "multi:softprob", alias = "multi:softmax")]
    MultiSoftprob,
    #[serde(rename = "binary:logistic")]
    BinaryLogistic,
}

fn default_objective() -> Objective {
    Objective::MultiSoftprob
}

fn default_base_score() -> f32 {
    0.5
}

/// Tree ensemble as stored in the bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtSpec {
    #[serde(default = "default_objective")]
    pub objective: Objective,
    /// Number of classes (ignored for `binary:logistic`, which is always 2)
    #[serde(default)]
    pub num_class: usize,
    #[serde(default = "default_base_score")]
    pub base_score: f32,
    pub trees: Vec<DumpNode>,
}

/// One node of an XGBoost JSON dump. Internal nodes carry `split`,
/// `split_condition`, `yes`, `no`, `missing` and `children`; leaves carry
/// `leaf`. Extra dump fields (`depth`, `gain`, `cover`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpNode {
    pub nodeid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_condition: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DumpNode>,
}

// ============================================================================
// COMPILED FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f32),
}

/// Flattened tree; the root is `nodes[0]` and every child index is larger
/// than its parent's, so evaluation always terminates.
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(root: &DumpNode, schema: &FeatureSchema) -> Result<Self, ModelError> {
        // Pre-order positions: parents always precede their children.
        let mut order: Vec<&DumpNode> = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            order.push(node);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }

        let mut position = HashMap::with_capacity(order.len());
        for (pos, node) in order.iter().enumerate() {
            if position.insert(node.nodeid, pos).is_some() {
                return Err(ModelError::Definition(format!(
                    "duplicate nodeid {} in tree",
                    node.nodeid
                )));
            }
        }

        let mut nodes = Vec::with_capacity(order.len());
        for (pos, node) in order.iter().enumerate() {
            nodes.push(Self::compile_node(node, pos, &position, schema)?);
        }

        Ok(Self { nodes })
    }

    fn compile_node(
        node: &DumpNode,
        pos: usize,
        position: &HashMap<u32, usize>,
        schema: &FeatureSchema,
    ) -> Result<Node, ModelError> {
        if node.children.is_empty() {
            let value = node.leaf.ok_or_else(|| {
                ModelError::Definition(format!("node {} has neither children nor leaf", node.nodeid))
            })?;
            return Ok(Node::Leaf(value));
        }

        let split = node.split.as_deref().ok_or_else(|| {
            ModelError::Definition(format!("node {} has children but no split", node.nodeid))
        })?;
        let feature = resolve_feature(split, schema)?;
        let threshold = node.split_condition.ok_or_else(|| {
            ModelError::Definition(format!("node {} has no split_condition", node.nodeid))
        })?;

        let child_ids: Vec<u32> = node.children.iter().map(|c| c.nodeid).collect();
        let link = |id: Option<u32>, name: &str| -> Result<usize, ModelError> {
            let id = id.ok_or_else(|| {
                ModelError::Definition(format!("node {} has no '{}' link", node.nodeid, name))
            })?;
            if !child_ids.contains(&id) {
                return Err(ModelError::Definition(format!(
                    "node {} links '{}' to {} which is not one of its children",
                    node.nodeid, name, id
                )));
            }
            let target = position[&id];
            debug_assert!(target > pos);
            Ok(target)
        };

        let yes = link(node.yes, "yes")?;
        let no = link(node.no, "no")?;
        let missing = link(node.missing.or(node.yes), "missing")?;

        Ok(Node::Split { feature, threshold, yes, no, missing })
    }

    fn eval(&self, row: ArrayView1<f32>) -> f32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split { feature, threshold, yes, no, missing } => {
                    let x = row[*feature];
                    idx = if x.is_nan() {
                        *missing
                    } else if x < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

/// Split features are either model column names (dumps made with
/// `feature_names`) or positional `f<N>` names.
fn resolve_feature(split: &str, schema: &FeatureSchema) -> Result<usize, ModelError> {
    if let Some(idx) = schema.columns().iter().position(|c| c == split) {
        return Ok(idx);
    }

    split
        .strip_prefix('f')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|&n| n < schema.len())
        .ok_or_else(|| ModelError::Definition(format!("unknown split feature '{}'", split)))
}

// ============================================================================
// ENSEMBLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    objective: Objective,
    n_classes: usize,
    n_features: usize,
    base_margin: f32,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn from_spec(spec: &GbdtSpec, schema: &FeatureSchema) -> Result<Self, ModelError> {
        let (n_classes, base_margin) = match spec.objective {
            Objective::MultiSoftprob => {
                if spec.num_class < 2 {
                    return Err(ModelError::Definition(format!(
                        "multi:softprob needs num_class >= 2, got {}",
                        spec.num_class
                    )));
                }
                (spec.num_class, spec.base_score)
            }
            Objective::BinaryLogistic => {
                let p = spec.base_score;
                if !(p > 0.0 && p < 1.0) {
                    return Err(ModelError::Definition(format!(
                        "binary:logistic base_score must be in (0, 1), got {}",
                        p
                    )));
                }
                (2, (p / (1.0 - p)).ln())
            }
        };

        if spec.trees.is_empty() {
            return Err(ModelError::Definition("ensemble has no trees".to_string()));
        }

        let groups = output_groups(spec.objective, n_classes);
        if spec.trees.len() % groups != 0 {
            return Err(ModelError::Definition(format!(
                "{} trees cannot be split evenly across {} classes",
                spec.trees.len(),
                groups
            )));
        }

        let trees = spec
            .trees
            .iter()
            .map(|root| Tree::compile(root, schema))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            trees = trees.len(),
            classes = n_classes,
            "Tree ensemble compiled"
        );

        Ok(Self {
            objective: spec.objective,
            n_classes,
            n_features: schema.len(),
            base_margin,
            trees,
        })
    }
}

fn output_groups(objective: Objective, n_classes: usize) -> usize {
    match objective {
        Objective::MultiSoftprob => n_classes,
        Objective::BinaryLogistic => 1,
    }
}

fn softmax_in_place(margins: &mut [f32]) {
    let max = margins.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for m in margins.iter_mut() {
        *m = (*m - max).exp();
        sum += *m;
    }
    for m in margins.iter_mut() {
        *m /= sum;
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for TreeEnsemble {
    fn kind(&self) -> &'static str {
        "gbdt"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &Array2<f32>) -> Result<Array2<f32>, ModelError> {
        check_width(features, self.n_features)?;

        let groups = output_groups(self.objective, self.n_classes);
        let mut out = Array2::<f32>::zeros((features.nrows(), self.n_classes));
        let mut margins = vec![0.0f32; groups];

        for (row, mut probs) in features.rows().into_iter().zip(out.rows_mut()) {
            margins.iter_mut().for_each(|m| *m = self.base_margin);
            for (t, tree) in self.trees.iter().enumerate() {
                margins[t % groups] += tree.eval(row);
            }

            match self.objective {
                Objective::MultiSoftprob => {
                    softmax_in_place(&mut margins);
                    for (p, m) in probs.iter_mut().zip(&margins) {
                        *p = *m;
                    }
                }
                Objective::BinaryLogistic => {
                    let positive = sigmoid(margins[0]);
                    probs[0] = 1.0 - positive;
                    probs[1] = positive;
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests;
