//! Recommendation orchestrator.
//!
//! Every request walks a fixed state machine:
//!
//! ```text
//! Start → RuleCheck ─┬→ CriticalMatched ──────────────────────────┐
//!                    ├→ PolicyPath → PolicyInference ─┬→ SanityCheck ─┤→ Done
//!                    └→ FallbackRules ←───────────────┘               │
//!                            └───────────────────────────────────────┘
//! ```
//!
//! Phases only move forward; there is no retry. The policy adapter is the
//! only shared state and is created at most once per engine.

use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::{
    action_reason, AcousticSignal, ForecastSignal, HiveAction, HiveSignals, Recommendation,
    SensorReading, TemporalContext,
};
use crate::engine::rules::{evaluate_critical, fallback_recommendation, RuleMatch};
use crate::engine::sanity::SanityChecker;
use crate::engine::state_vector::{StateLayout, StateVector, StateVectorBuilder};
use crate::error::Result;
use crate::policy::{InferenceMode, PolicyAdapter, PolicyOutcome};

/// Orchestrator phase.
#[derive(Debug)]
enum Phase {
    Start,
    RuleCheck,
    CriticalMatched(RuleMatch),
    PolicyPath(Arc<PolicyAdapter>),
    PolicyInference(Arc<PolicyAdapter>, StateVector),
    SanityCheck {
        suggested: HiveAction,
        hive_index: usize,
        mode: InferenceMode,
    },
    FallbackRules,
    Done(Recommendation),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::RuleCheck => "rule_check",
            Phase::CriticalMatched(_) => "critical_matched",
            Phase::PolicyPath(_) => "policy_path",
            Phase::PolicyInference(..) => "policy_inference",
            Phase::SanityCheck { .. } => "sanity_check",
            Phase::FallbackRules => "fallback_rules",
            Phase::Done(_) => "done",
        }
    }
}

/// Inputs of one request.
struct Request<'a> {
    sensors: &'a SensorReading,
    audio: &'a AcousticSignal,
    forecast: &'a ForecastSignal,
    context: &'a TemporalContext,
}

/// Hybrid rule/policy recommendation engine.
///
/// Cheap to share: wrap in an `Arc` and call [`recommend`](Self::recommend)
/// from any number of threads.
#[derive(Debug)]
pub struct RecommendationEngine {
    config: Config,
    builder: StateVectorBuilder,
    sanity: SanityChecker,
    adapter: OnceLock<Arc<PolicyAdapter>>,
}

impl RecommendationEngine {
    /// Create an engine. The policy artifact is loaded on first use.
    pub fn new(config: Config) -> Self {
        let layout = StateLayout::new(config.layout.hive_count);
        Self {
            builder: StateVectorBuilder::new(layout),
            sanity: SanityChecker::new(&config.harvest),
            adapter: OnceLock::new(),
            config,
        }
    }

    /// Create an engine around an existing adapter.
    pub fn with_adapter(config: Config, adapter: Arc<PolicyAdapter>) -> Self {
        let engine = Self::new(config);
        let _ = engine.adapter.set(adapter);
        engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> StateLayout {
        self.builder.layout()
    }

    /// The shared policy adapter, loading it on first access.
    pub fn adapter(&self) -> Arc<PolicyAdapter> {
        Arc::clone(self.adapter.get_or_init(|| {
            Arc::new(PolicyAdapter::load(&self.config.policy, self.builder.layout()))
        }))
    }

    /// Build the state vector the policy would observe.
    pub fn state_vector(
        &self,
        sensors: &SensorReading,
        audio: &AcousticSignal,
        forecast: &ForecastSignal,
        context: &TemporalContext,
    ) -> Result<StateVector> {
        self.builder.build(sensors, audio, forecast, context)
    }

    /// Recommend one action for a hive.
    ///
    /// Always answers for well-formed input. The only error is a `Shape`
    /// error for input that cannot be encoded.
    pub fn recommend(
        &self,
        sensors: &SensorReading,
        audio: &AcousticSignal,
        forecast: &ForecastSignal,
        context: &TemporalContext,
    ) -> Result<Recommendation> {
        let request = Request {
            sensors,
            audio,
            forecast,
            context,
        };

        let mut phase = Phase::Start;
        loop {
            phase = match self.step(phase, &request)? {
                Phase::Done(recommendation) => return Ok(recommendation),
                next => {
                    debug!(phase = next.name(), "orchestrator transition");
                    next
                }
            };
        }
    }

    /// Recommend from a bundled request, synthesizing a missing context.
    pub fn recommend_signals(&self, signals: &HiveSignals) -> Result<Recommendation> {
        let context = signals.resolved_context();
        self.recommend(&signals.sensors, &signals.audio, &signals.forecast, &context)
    }

    fn step(&self, phase: Phase, req: &Request<'_>) -> Result<Phase> {
        let next = match phase {
            Phase::Start => {
                req.sensors.validate()?;
                req.audio.validate()?;
                req.forecast.validate()?;
                req.context.validate()?;
                debug!(
                    temperature = req.sensors.temperature,
                    humidity = req.sensors.humidity,
                    weight = req.sensors.weight,
                    queenless_risk = req.audio.queenless_risk,
                    queen_present = req.audio.queen_present,
                    "hive conditions"
                );
                Phase::RuleCheck
            }
            Phase::RuleCheck => match evaluate_critical(req.sensors, req.audio) {
                Some(matched) => Phase::CriticalMatched(matched),
                None => {
                    let adapter = self.adapter();
                    if adapter.is_enabled() {
                        Phase::PolicyPath(adapter)
                    } else {
                        Phase::FallbackRules
                    }
                }
            },
            Phase::CriticalMatched(matched) => {
                info!(
                    action = %matched.action,
                    priority = %matched.priority,
                    reason = %matched.reason,
                    "critical rule matched"
                );
                Phase::Done(matched.into_recommendation())
            }
            Phase::PolicyPath(adapter) => {
                let state = self
                    .builder
                    .build(req.sensors, req.audio, req.forecast, req.context)?;
                Phase::PolicyInference(adapter, state)
            }
            Phase::PolicyInference(adapter, state) => match adapter.suggest(&state) {
                PolicyOutcome::Suggested {
                    action,
                    hive_index,
                    mode,
                } => {
                    info!(%action, hive_index, ?mode, "policy suggested action");
                    Phase::SanityCheck {
                        suggested: action,
                        hive_index,
                        mode,
                    }
                }
                PolicyOutcome::Unavailable => Phase::FallbackRules,
                PolicyOutcome::InferenceFailure(message) => {
                    warn!(error = %message, "falling back to rules for this request");
                    Phase::FallbackRules
                }
            },
            Phase::SanityCheck {
                suggested,
                hive_index,
                mode,
            } => {
                let verdict = self.sanity.check(suggested, req.sensors, req.audio);
                let action = verdict.action;
                let reason = action_reason(action, req.sensors, req.audio, req.forecast);
                let recommendation = Recommendation::new(
                    action,
                    action.metadata().severity,
                    reason,
                    mode.model_used(),
                )
                .with_hive_suggested(hive_index);
                Phase::Done(recommendation)
            }
            Phase::FallbackRules => {
                let recommendation = fallback_recommendation(
                    req.sensors,
                    req.audio,
                    req.forecast,
                    self.config.harvest.weight_threshold,
                );
                info!(action = %recommendation.action, "fallback rule table answered");
                Phase::Done(recommendation)
            }
            Phase::Done(recommendation) => Phase::Done(recommendation),
        };
        Ok(next)
    }
}
