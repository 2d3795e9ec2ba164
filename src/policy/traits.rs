//! Decision policy trait.
//!
//! A policy maps an observation to a probability distribution over its joint
//! `(hive slot, action)` output space. Mode selection (sampling vs argmax)
//! and index decoding live in the adapter, not here.

use crate::error::Result;

/// Trait for pre-trained decision policies.
///
/// Implementations are read-only after construction and must be thread-safe
/// so one instance can serve concurrent requests.
pub trait Policy: Send + Sync {
    /// Expected observation length.
    fn observation_size(&self) -> usize;

    /// Size of the output space (hive slots × catalog actions).
    fn action_count(&self) -> usize;

    /// Run one forward pass.
    ///
    /// Returns `action_count()` non-negative probabilities summing to ~1.
    /// Shape mismatches and numeric failures are `InferenceFailure`s.
    fn action_distribution(&self, observation: &[f32]) -> Result<Vec<f64>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Blanket implementation for boxed trait objects.
impl Policy for Box<dyn Policy> {
    fn observation_size(&self) -> usize {
        (**self).observation_size()
    }

    fn action_count(&self) -> usize {
        (**self).action_count()
    }

    fn action_distribution(&self, observation: &[f32]) -> Result<Vec<f64>> {
        (**self).action_distribution(observation)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
