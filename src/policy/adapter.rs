//! Fail-open policy adapter.
//!
//! Wraps a [`Policy`] and turns its output distribution into a catalog
//! action. A load failure disables the adapter for its whole lifetime; a
//! failure during one inference is reported to the caller as an outcome and
//! leaves the adapter enabled.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{thread_rng, SeedableRng};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{PolicyConfig, MAX_HIVE_COUNT};
use crate::core::{HiveAction, ModelUsed, ACTION_COUNT};
use crate::engine::{StateLayout, StateVector};
use crate::error::{AdvisorError, Result};
use crate::policy::network::PolicyNetwork;
use crate::policy::traits::Policy;

/// How an action is chosen from the policy's distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceMode {
    /// Sample proportionally to the probabilities.
    Stochastic,
    /// Take the most probable action.
    Deterministic,
}

impl InferenceMode {
    pub fn from_stochastic(stochastic: bool) -> Self {
        if stochastic {
            InferenceMode::Stochastic
        } else {
            InferenceMode::Deterministic
        }
    }

    /// The `model_used` label for recommendations produced in this mode.
    pub fn model_used(self) -> ModelUsed {
        match self {
            InferenceMode::Stochastic => ModelUsed::PolicyStochastic,
            InferenceMode::Deterministic => ModelUsed::PolicyDeterministic,
        }
    }
}

/// Result of asking the policy for a suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutcome {
    /// The policy picked an action for a hive slot.
    Suggested {
        action: HiveAction,
        hive_index: usize,
        mode: InferenceMode,
    },
    /// The adapter is disabled.
    Unavailable,
    /// This inference failed; the adapter stays enabled.
    InferenceFailure(String),
}

enum AdapterState {
    Enabled {
        policy: Box<dyn Policy>,
        mode: InferenceMode,
        /// Present when sampling is seeded.
        rng: Option<Mutex<StdRng>>,
    },
    Disabled {
        reason: String,
    },
}

/// Adapter between state vectors and a learned policy.
pub struct PolicyAdapter {
    state: AdapterState,
}

impl fmt::Debug for PolicyAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            AdapterState::Enabled { policy, mode, rng } => f
                .debug_struct("PolicyAdapter")
                .field("policy", &policy.name())
                .field("mode", mode)
                .field("seeded", &rng.is_some())
                .finish(),
            AdapterState::Disabled { reason } => f
                .debug_struct("PolicyAdapter")
                .field("disabled", reason)
                .finish(),
        }
    }
}

impl PolicyAdapter {
    /// Load the configured artifact.
    ///
    /// Never fails: any problem yields a disabled adapter and a warning.
    pub fn load(config: &PolicyConfig, layout: StateLayout) -> Self {
        let mode = InferenceMode::from_stochastic(config.stochastic);

        let Some(path) = config.resolved_model_path() else {
            return Self::disabled("no model path configured and no home directory");
        };

        let loaded = PolicyNetwork::load(&path)
            .and_then(|network| Self::from_policy(Box::new(network), mode, config.seed, layout));

        match loaded {
            Ok(adapter) => {
                info!(path = %path.display(), ?mode, "policy loaded");
                adapter
            }
            Err(e) => Self::disabled(e.to_string()),
        }
    }

    /// Wrap an already constructed policy.
    ///
    /// Fails with `PolicyUnavailable` when the policy's shape does not match
    /// `layout`.
    pub fn from_policy(
        policy: Box<dyn Policy>,
        mode: InferenceMode,
        seed: Option<u64>,
        layout: StateLayout,
    ) -> Result<Self> {
        if layout.hive_count > MAX_HIVE_COUNT {
            return Err(AdvisorError::policy_unavailable(format!(
                "layout has {} hive slots, at most {} are supported",
                layout.hive_count, MAX_HIVE_COUNT
            )));
        }
        if policy.observation_size() != layout.len() {
            return Err(AdvisorError::policy_unavailable(format!(
                "policy expects {} features, layout produces {}",
                policy.observation_size(),
                layout.len()
            )));
        }
        let expected_actions = layout.hive_count * ACTION_COUNT;
        if policy.action_count() != expected_actions {
            return Err(AdvisorError::policy_unavailable(format!(
                "policy has {} outputs, layout needs {} ({} hives x {} actions)",
                policy.action_count(),
                expected_actions,
                layout.hive_count,
                ACTION_COUNT
            )));
        }

        Ok(Self {
            state: AdapterState::Enabled {
                policy,
                mode,
                rng: seed.map(|s| Mutex::new(StdRng::seed_from_u64(s))),
            },
        })
    }

    /// A permanently disabled adapter.
    pub fn disabled(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(reason = %reason, "policy disabled, using rule fallback");
        Self {
            state: AdapterState::Disabled { reason },
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, AdapterState::Enabled { .. })
    }

    /// Inference mode, if enabled.
    pub fn mode(&self) -> Option<InferenceMode> {
        match &self.state {
            AdapterState::Enabled { mode, .. } => Some(*mode),
            AdapterState::Disabled { .. } => None,
        }
    }

    /// Why the adapter is disabled, if it is.
    pub fn disabled_reason(&self) -> Option<&str> {
        match &self.state {
            AdapterState::Enabled { .. } => None,
            AdapterState::Disabled { reason } => Some(reason),
        }
    }

    /// Pick a joint action index (`hive_index * 12 + action_type`).
    pub fn infer(&self, state: &StateVector) -> Result<usize> {
        let (policy, mode, rng) = match &self.state {
            AdapterState::Enabled { policy, mode, rng } => (policy, *mode, rng),
            AdapterState::Disabled { reason } => {
                return Err(AdvisorError::policy_unavailable(reason.clone()))
            }
        };

        let probs = policy.action_distribution(state.as_slice())?;
        if probs.len() != policy.action_count() {
            return Err(AdvisorError::inference(format!(
                "distribution has {} entries, expected {}",
                probs.len(),
                policy.action_count()
            )));
        }

        match mode {
            InferenceMode::Deterministic => argmax(&probs),
            InferenceMode::Stochastic => {
                let dist = WeightedIndex::new(&probs)
                    .map_err(|e| AdvisorError::inference(format!("cannot sample: {}", e)))?;
                let index = match rng {
                    Some(rng) => {
                        let mut rng = rng.lock().unwrap_or_else(|e| e.into_inner());
                        dist.sample(&mut *rng)
                    }
                    None => dist.sample(&mut thread_rng()),
                };
                Ok(index)
            }
        }
    }

    /// Run one inference and decode it into an outcome.
    pub fn suggest(&self, state: &StateVector) -> PolicyOutcome {
        let Some(mode) = self.mode() else {
            return PolicyOutcome::Unavailable;
        };

        let decoded = self.infer(state).and_then(decode_action_index);
        match decoded {
            Ok((action, hive_index)) => {
                debug!(%action, hive_index, "policy suggestion");
                PolicyOutcome::Suggested {
                    action,
                    hive_index,
                    mode,
                }
            }
            Err(AdvisorError::PolicyUnavailable { .. }) => PolicyOutcome::Unavailable,
            Err(e) => {
                warn!(error = %e, "policy inference failed");
                PolicyOutcome::InferenceFailure(e.to_string())
            }
        }
    }
}

fn argmax(probs: &[f64]) -> Result<usize> {
    probs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_finite())
        .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
            Some((_, bp)) if bp >= *p => best,
            _ => Some((i, *p)),
        })
        .map(|(i, _)| i)
        .ok_or_else(|| AdvisorError::inference("empty action distribution"))
}

/// Split a joint index into the catalog action and the hive slot.
pub fn decode_action_index(index: usize) -> Result<(HiveAction, usize)> {
    let action = HiveAction::from_index(index % ACTION_COUNT)
        .ok_or_else(|| AdvisorError::inference(format!("invalid action index {}", index)))?;
    Ok((action, index / ACTION_COUNT))
}


#[cfg(test)]
mod tests {
    use super::testing::{adapter, FailingPolicy, FixedPolicy};
    use super::*;
    use crate::core::{AcousticSignal, ForecastSignal, SensorReading, TemporalContext};
    use crate::engine::StateVectorBuilder;
    use crate::policy::network::biased_network;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn state() -> StateVector {
        StateVectorBuilder::default()
            .build(
                &SensorReading::default(),
                &AcousticSignal::default(),
                &ForecastSignal::default(),
                &TemporalContext::new(2024, 167, 12),
            )
            .unwrap()
    }

    fn config_for(path: PathBuf, stochastic: bool) -> PolicyConfig {
        PolicyConfig {
            model_path: Some(path),
            stochastic,
            seed: Some(42),
        }
    }

    #[test]
    fn test_decode_action_index() {
        assert_eq!(decode_action_index(0).unwrap(), (HiveAction::DoNothing, 0));
        assert_eq!(decode_action_index(14).unwrap(), (HiveAction::AddFood, 1));
        assert_eq!(
            decode_action_index(35).unwrap(),
            (HiveAction::EmergencyIntervention, 2)
        );
    }

    #[test]
    fn test_deterministic_takes_argmax() {
        let adapter = adapter(FixedPolicy::peaked(22), InferenceMode::Deterministic);
        assert_eq!(adapter.infer(&state()).unwrap(), 22);
        assert_eq!(
            adapter.suggest(&state()),
            PolicyOutcome::Suggested {
                action: HiveAction::HarvestHoney,
                hive_index: 1,
                mode: InferenceMode::Deterministic,
            }
        );
    }

    #[test]
    fn test_stochastic_only_samples_supported_actions() {
        let mut policy = FixedPolicy::peaked(3);
        policy.probs[3] = 0.5;
        policy.probs[27] = 0.5;
        let adapter = adapter(policy, InferenceMode::Stochastic);
        for _ in 0..50 {
            let index = adapter.infer(&state()).unwrap();
            assert!(index == 3 || index == 27, "sampled {}", index);
        }
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let probs: Vec<f64> = (0..36).map(|i| (i + 1) as f64).collect();
        let sample = || {
            let adapter = adapter(
                FixedPolicy {
                    observation_size: 78,
                    probs: probs.clone(),
                },
                InferenceMode::Stochastic,
            );
            (0..10).map(|_| adapter.infer(&state()).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(sample(), sample());
    }

    #[test]
    fn test_inference_failure_keeps_adapter_enabled() {
        let adapter = adapter(FailingPolicy, InferenceMode::Deterministic);
        assert!(matches!(
            adapter.suggest(&state()),
            PolicyOutcome::InferenceFailure(_)
        ));
        assert!(adapter.is_enabled());
    }

    #[test]
    fn test_degenerate_distribution_is_inference_failure() {
        let mut policy = FixedPolicy::peaked(0);
        policy.probs[0] = 0.0;
        let adapter = adapter(policy, InferenceMode::Stochastic);
        assert!(matches!(
            adapter.suggest(&state()),
            PolicyOutcome::InferenceFailure(_)
        ));
    }

    #[test]
    fn test_disabled_adapter() {
        let adapter = PolicyAdapter::disabled("no artifact");
        assert!(!adapter.is_enabled());
        assert_eq!(adapter.mode(), None);
        assert_eq!(adapter.disabled_reason(), Some("no artifact"));
        assert_eq!(adapter.suggest(&state()), PolicyOutcome::Unavailable);
        assert!(matches!(
            adapter.infer(&state()),
            Err(AdvisorError::PolicyUnavailable { .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let policy = FixedPolicy {
            observation_size: 26,
            probs: vec![1.0; 12],
        };
        let result = PolicyAdapter::from_policy(
            Box::new(policy),
            InferenceMode::Deterministic,
            None,
            StateLayout::default(),
        );
        assert!(matches!(result, Err(AdvisorError::PolicyUnavailable { .. })));
    }

    #[test]
    fn test_load_missing_artifact_disables() {
        let temp = TempDir::new().unwrap();
        let adapter = PolicyAdapter::load(
            &config_for(temp.path().join("missing.json"), true),
            StateLayout::default(),
        );
        assert!(!adapter.is_enabled());
        assert!(adapter.disabled_reason().unwrap().contains("missing.json"));
    }

    #[test]
    fn test_load_wrong_layout_disables() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("policy.json");
        fs::write(&path, serde_json::to_string(&biased_network(26, 12, 0)).unwrap()).unwrap();

        let adapter = PolicyAdapter::load(&config_for(path, false), StateLayout::default());
        assert!(!adapter.is_enabled());
    }

    #[test]
    fn test_load_valid_artifact() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("policy.json");
        fs::write(&path, serde_json::to_string(&biased_network(78, 36, 4)).unwrap()).unwrap();

        let adapter = PolicyAdapter::load(&config_for(path, false), StateLayout::default());
        assert_eq!(adapter.mode(), Some(InferenceMode::Deterministic));
        assert_eq!(adapter.infer(&state()).unwrap(), 4);
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(
            InferenceMode::from_stochastic(true).model_used(),
            ModelUsed::PolicyStochastic
        );
        assert_eq!(
            InferenceMode::from_stochastic(false).model_used(),
            ModelUsed::PolicyDeterministic
        );
    }
}
