//! Core types for hive-advisor.
//!
//! The action catalog, the caller-supplied input signals and the
//! recommendation record returned for every request.

pub mod action;
pub mod recommendation;
pub mod signals;

pub use action::{ActionMetadata, HiveAction, Priority, ACTION_COUNT};
pub use recommendation::{action_reason, ModelUsed, Recommendation};
pub use signals::{
    AcousticSignal, ClassProbabilities, ForecastSeries, ForecastSignal, ForecastTrends,
    HealthStatus, HiveSignals, SensorReading, TemporalContext, Trend,
};
