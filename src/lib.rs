//! hive-advisor - hybrid recommendation engine for beehive management
//!
//! Combines hard-coded safety rules with a pre-trained decision policy to
//! recommend one of twelve interventions for a hive. Critical conditions are
//! answered by rules; otherwise the policy's suggestion is checked against
//! observed facts. When no policy is available the engine keeps answering
//! from a fallback rule table.

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod policy;
pub mod util;

pub use config::Config;
pub use core::{
    AcousticSignal, ForecastSignal, HiveAction, HiveSignals, ModelUsed, Priority, Recommendation,
    SensorReading, TemporalContext,
};
pub use engine::{RecommendationEngine, StateLayout, StateVector, StateVectorBuilder};
pub use error::{AdvisorError, Result};
pub use policy::{InferenceMode, Policy, PolicyAdapter, PolicyNetwork, PolicyOutcome};

// CLI commands
pub use cli::{CatalogCommand, ConfigCommand, RecommendCommand, StateCommand};
