//! Regressors operating on the encoded feature vector
//!
//! Two families are supported:
//!
//! ```text
//! linear:  y = intercept + Σ(x[i] × coefficients[i])
//! forest:  y = mean(tree.evaluate(x) for tree in trees)
//! ```
//!
//! Tree nodes are stored as a flat array with node 0 as the root. A split
//! routes to `left` when `x[feature] <= threshold`, otherwise to `right`.

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Trained regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Regressor {
    Linear(LinearRegressor),
    Forest(ForestRegressor),
}

impl Regressor {
    /// Short family name for logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Regressor::Linear(_) => "linear",
            Regressor::Forest(_) => "forest",
        }
    }

    /// Structural checks against the encoded input width
    pub fn validate(&self, input_width: usize) -> Result<(), String> {
        match self {
            Regressor::Linear(linear) => linear.validate(input_width),
            Regressor::Forest(forest) => forest.validate(input_width),
        }
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
        match self {
            Regressor::Linear(linear) => linear.predict(x),
            Regressor::Forest(forest) => forest.predict(x),
        }
    }
}

/// Ordinary linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressor {
    fn validate(&self, input_width: usize) -> Result<(), String> {
        if self.coefficients.len() != input_width {
            return Err(format!(
                "linear regressor has {} coefficients, preprocessor produces {}",
                self.coefficients.len(),
                input_width
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("linear regressor has non-finite parameters".to_string());
        }
        Ok(())
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
        if x.len() != self.coefficients.len() {
            return Err(InferenceError::model(format!(
                "linear regressor expects {} inputs, got {}",
                self.coefficients.len(),
                x.len()
            )));
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(c, v)| c * v)
                .sum::<f64>())
    }
}

/// Averaging ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRegressor {
    pub trees: Vec<RegressionTree>,
}

impl ForestRegressor {
    fn validate(&self, input_width: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest regressor has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(input_width)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::model("forest regressor has no trees"));
        }
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(x)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

/// Single regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

/// Tree node, either an internal split or a leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    /// Children must point strictly forward, which rules out cycles
    fn validate(&self, input_width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= input_width {
                        return Err(format!(
                            "node {} splits on input {} but only {} exist",
                            index, feature, input_width
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", index));
                    }
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(format!(
                                "node {} has out-of-order child {}",
                                index, child
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", index));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, InferenceError> {
        let mut index = 0;
        // A path can never visit more nodes than the tree holds.
        for _ in 0..self.nodes.len() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| InferenceError::model(format!("tree node {} does not exist", index)))?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = x.get(*feature).ok_or_else(|| {
                        InferenceError::model(format!("tree splits on missing input {}", feature))
                    })?;
                    index = if *v <= *threshold { *left } else { *right };
                }
            }
        }
        Err(InferenceError::model("tree traversal did not reach a leaf"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> RegressionTree {
        RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    #[test]
    fn test_linear_predict() {
        let model = LinearRegressor {
            coefficients: vec![2.0, -1.0, 0.5],
            intercept: 10.0,
        };
        assert_eq!(model.predict(&[1.0, 2.0, 4.0]).unwrap(), 12.0);
        assert!(model.predict(&[1.0]).is_err());
    }

    #[test]
    fn test_tree_split_goes_left_on_equal() {
        let tree = stump(0, 5.0, 100.0, 200.0);
        assert_eq!(tree.evaluate(&[5.0]).unwrap(), 100.0);
        assert_eq!(tree.evaluate(&[5.1]).unwrap(), 200.0);
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = ForestRegressor {
            trees: vec![stump(0, 5.0, 100.0, 200.0), stump(1, 0.5, 300.0, 400.0)],
        };
        assert_eq!(forest.predict(&[6.0, 0.0]).unwrap(), 250.0);
        assert!(Regressor::Forest(forest).validate(2).is_ok());
    }

    #[test]
    fn test_validate_rejects_backward_children() {
        let tree = RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 1,
                },
                TreeNode::Leaf { value: 1.0 },
            ],
        };
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_evaluate_terminates_on_cyclic_tree() {
        let tree = RegressionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(tree.evaluate(&[0.0]).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_feature() {
        let regressor = Regressor::Forest(ForestRegressor {
            trees: vec![stump(3, 1.0, 1.0, 2.0)],
        });
        assert!(regressor.validate(3).is_err());

        let regressor = Regressor::Linear(LinearRegressor {
            coefficients: vec![1.0; 4],
            intercept: 0.0,
        });
        assert!(regressor.validate(3).is_err());
    }

    #[test]
    fn test_regressor_deserializes_from_json() {
        let regressor: Regressor = serde_json::from_value(serde_json::json!({
            "type": "forest",
            "trees": [{
                "nodes": [
                    {"feature": 0, "threshold": 5.0, "left": 1, "right": 2},
                    {"value": 100.0},
                    {"value": 200.0}
                ]
            }]
        }))
        .unwrap();
        assert_eq!(regressor.kind(), "forest");
        assert_eq!(regressor.predict(&[1.0]).unwrap(), 100.0);
    }
}
