//! Feed-forward policy network loaded from a JSON artifact.
//!
//! The artifact is an export of the trained actor network: a stack of dense
//! layers whose final outputs are action logits. Layer weights are stored
//! row-major as `out × in`.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "observation_size": 78,
//!   "action_count": 36,
//!   "layers": [
//!     {"weights": [[...], ...], "bias": [...], "activation": "tanh"},
//!     {"weights": [[...], ...], "bias": [...], "activation": "identity"}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AdvisorError, Result};
use crate::policy::traits::Policy;
use crate::util::{read_to_string_with_limit, MAX_ARTIFACT_SIZE};

/// Supported artifact format version.
pub const NETWORK_FORMAT_VERSION: u32 = 1;

/// Layer activation function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Tanh,
    Relu,
    #[default]
    Identity,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::Identity => x,
        }
    }
}

/// One fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// `out × in` weight matrix.
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn input_size(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn output_size(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                let sum: f64 = row
                    .iter()
                    .zip(input)
                    .map(|(w, x)| f64::from(*w) * x)
                    .sum();
                self.activation.apply(sum + f64::from(*bias))
            })
            .collect()
    }
}

/// A dense policy network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyNetwork {
    pub format_version: u32,
    pub observation_size: usize,
    pub action_count: usize,
    pub layers: Vec<DenseLayer>,
}

impl PolicyNetwork {
    /// Load and validate an artifact from disk.
    ///
    /// Every failure is reported as `PolicyUnavailable`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string_with_limit(path, MAX_ARTIFACT_SIZE)
            .map_err(|e| AdvisorError::policy_unavailable(e.to_string()))?;
        Self::from_json(&content).map_err(|e| match e {
            AdvisorError::PolicyUnavailable { message } => AdvisorError::policy_unavailable(
                format!("{}: {}", path.display(), message),
            ),
            other => other,
        })
    }

    /// Parse and validate an artifact.
    pub fn from_json(content: &str) -> Result<Self> {
        let network: PolicyNetwork = serde_json::from_str(content).map_err(|e| {
            AdvisorError::policy_unavailable(format!("artifact is not valid JSON: {}", e))
        })?;
        network.validate()?;
        Ok(network)
    }

    /// Check that layer dimensions chain from observation to action logits.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != NETWORK_FORMAT_VERSION {
            return Err(AdvisorError::policy_unavailable(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, NETWORK_FORMAT_VERSION
            )));
        }
        if self.layers.is_empty() {
            return Err(AdvisorError::policy_unavailable("network has no layers"));
        }

        let mut expected_input = self.observation_size;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.output_size() == 0 {
                return Err(AdvisorError::policy_unavailable(format!(
                    "layer {} has no outputs",
                    i
                )));
            }
            if layer.bias.len() != layer.output_size() {
                return Err(AdvisorError::policy_unavailable(format!(
                    "layer {} has {} biases for {} outputs",
                    i,
                    layer.bias.len(),
                    layer.output_size()
                )));
            }
            if layer.weights.iter().any(|row| row.len() != expected_input) {
                return Err(AdvisorError::policy_unavailable(format!(
                    "layer {} expects {} inputs, previous stage produces {}",
                    i,
                    layer.input_size(),
                    expected_input
                )));
            }
            let finite = layer
                .weights
                .iter()
                .flatten()
                .chain(&layer.bias)
                .all(|v| v.is_finite());
            if !finite {
                return Err(AdvisorError::policy_unavailable(format!(
                    "layer {} contains non-finite parameters",
                    i
                )));
            }
            expected_input = layer.output_size();
        }

        if expected_input != self.action_count {
            return Err(AdvisorError::policy_unavailable(format!(
                "network produces {} logits, artifact declares {} actions",
                expected_input, self.action_count
            )));
        }
        Ok(())
    }

    fn logits(&self, observation: &[f32]) -> Vec<f64> {
        let input: Vec<f64> = observation.iter().map(|v| f64::from(*v)).collect();
        self.layers
            .iter()
            .fold(input, |activations, layer| layer.forward(&activations))
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Policy for PolicyNetwork {
    fn observation_size(&self) -> usize {
        self.observation_size
    }

    fn action_count(&self) -> usize {
        self.action_count
    }

    fn action_distribution(&self, observation: &[f32]) -> Result<Vec<f64>> {
        if observation.len() != self.observation_size {
            return Err(AdvisorError::inference(format!(
                "observation has {} features, network expects {}",
                observation.len(),
                self.observation_size
            )));
        }

        let logits = self.logits(observation);
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(AdvisorError::inference("network produced non-finite logits"));
        }

        let probs = softmax(&logits);
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(AdvisorError::inference(
                "action distribution is not finite",
            ));
        }
        Ok(probs)
    }

    fn name(&self) -> &'static str {
        "dense-network"
    }
}

/// A single-layer network whose logits ignore the observation and peak at
/// `preferred`.
#[cfg(test)]
pub(crate) fn biased_network(
    observation_size: usize,
    action_count: usize,
    preferred: usize,
) -> PolicyNetwork {
    let mut bias = vec![0.0; action_count];
    bias[preferred] = 25.0;
    PolicyNetwork {
        format_version: NETWORK_FORMAT_VERSION,
        observation_size,
        action_count,
        layers: vec![DenseLayer {
            weights: vec![vec![0.0; observation_size]; action_count],
            bias,
            activation: Activation::Identity,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn two_layer() -> PolicyNetwork {
        PolicyNetwork {
            format_version: 1,
            observation_size: 2,
            action_count: 3,
            layers: vec![
                DenseLayer {
                    weights: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                    bias: vec![0.0, 0.0],
                    activation: Activation::Relu,
                },
                DenseLayer {
                    weights: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
                    bias: vec![0.0, 0.0, 0.5],
                    activation: Activation::Identity,
                },
            ],
        }
    }

    #[test]
    fn test_forward_pass() {
        let network = two_layer();
        network.validate().unwrap();
        let logits = network.logits(&[2.0, -1.0]);
        // relu([2, -1]) = [2, 0] → [2, 0, -1.5]
        assert_eq!(logits, vec![2.0, 0.0, -1.5]);
    }

    #[test]
    fn test_distribution_sums_to_one() {
        let probs = two_layer().action_distribution(&[0.3, 0.7]).unwrap();
        assert_eq!(probs.len(), 3);
        let total: f64 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(probs.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        let probs = softmax(&[1000.0, 0.0]);
        assert!((probs[0] - 1.0).abs() < 1e-12);
        assert!(probs[1] >= 0.0);
    }

    #[test]
    fn test_observation_mismatch_is_inference_failure() {
        let err = two_layer().action_distribution(&[1.0]).unwrap_err();
        assert!(matches!(err, AdvisorError::InferenceFailure { .. }));
    }

    #[test]
    fn test_validate_rejects_broken_chain() {
        let mut network = two_layer();
        network.layers[1].weights[0] = vec![1.0, 0.0, 0.0];
        assert!(matches!(
            network.validate(),
            Err(AdvisorError::PolicyUnavailable { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_action_count() {
        let mut network = two_layer();
        network.action_count = 4;
        let err = network.validate().unwrap_err();
        assert!(err.to_string().contains("3 logits"));
    }

    #[test]
    fn test_validate_rejects_bias_mismatch() {
        let mut network = two_layer();
        network.layers[0].bias.pop();
        assert!(network.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let mut network = two_layer();
        network.format_version = 2;
        assert!(network.validate().is_err());
    }

    #[test]
    fn test_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("policy.json");
        let network = biased_network(78, 36, 10);
        fs::write(&path, serde_json::to_string(&network).unwrap()).unwrap();

        let loaded = PolicyNetwork::load(&path).unwrap();
        assert_eq!(loaded.observation_size(), 78);
        assert_eq!(loaded.action_count(), 36);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = PolicyNetwork::load(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, AdvisorError::PolicyUnavailable { .. }));
    }

    #[test]
    fn test_load_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("policy.json");
        fs::write(&path, "PK\u{3}\u{4} not json").unwrap();

        let err = PolicyNetwork::load(&path).unwrap_err();
        assert!(matches!(err, AdvisorError::PolicyUnavailable { .. }));
        assert!(err.to_string().contains("policy.json"));
    }

    #[test]
    fn test_activation_defaults_to_identity() {
        let json = r#"{"weights": [[1.0]], "bias": [0.0]}"#;
        let layer: DenseLayer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.activation, Activation::Identity);
    }
}
