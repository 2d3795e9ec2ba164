//! Recommendation pipeline.
//!
//! Rules, state encoding, sanity checks and the orchestrator that ties them
//! to the learned policy.

pub mod orchestrator;
pub mod rules;
pub mod sanity;
pub mod state_vector;

pub use orchestrator::RecommendationEngine;
pub use rules::{evaluate_critical, fallback_decision, fallback_recommendation, RuleMatch};
pub use sanity::{SanityCheck, SanityChecker, SanityOverride, SanityVerdict};
pub use state_vector::{StateLayout, StateVector, StateVectorBuilder, FEATURES_PER_HIVE};
