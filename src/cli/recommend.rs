//! Recommend command for hive-advisor.
//!
//! Runs one request through the engine and prints the recommendation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::{HiveSignals, Recommendation};
use crate::engine::RecommendationEngine;
use crate::error::AdvisorError;

/// Options for the recommend command.
#[derive(Debug, Clone, Default)]
pub struct RecommendOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the recommend command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendOutput {
    /// Whether a recommendation was produced.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    /// Why the policy was not consulted, for fallback answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_note: Option<String>,
    /// Error message if the request was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecommendOutput {
    pub fn success(recommendation: Recommendation) -> Self {
        Self {
            success: true,
            recommendation: Some(recommendation),
            policy_note: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            recommendation: None,
            policy_note: None,
            error: Some(error.into()),
        }
    }
}

/// The recommend command implementation.
pub struct RecommendCommand {
    engine: Arc<RecommendationEngine>,
}

impl RecommendCommand {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self { engine }
    }

    /// Run the recommend command.
    pub fn run(&self, signals: &HiveSignals) -> RecommendOutput {
        match self.engine.recommend_signals(signals) {
            Ok(recommendation) => {
                let policy_note = if recommendation.fallback {
                    self.engine
                        .adapter()
                        .disabled_reason()
                        .map(str::to_string)
                } else {
                    None
                };
                RecommendOutput {
                    policy_note,
                    ..RecommendOutput::success(recommendation)
                }
            }
            Err(e) => RecommendOutput::failure(e.to_string()),
        }
    }

    /// Report a request that could not be read.
    pub fn reject(&self, error: &AdvisorError) -> RecommendOutput {
        RecommendOutput::failure(error.to_string())
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RecommendOutput, options: &RecommendOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &RecommendOutput) -> String {
        let rec = match (&output.recommendation, output.success) {
            (Some(rec), true) => rec,
            _ => {
                return format!(
                    "Request rejected: {}\n",
                    output.error.as_deref().unwrap_or("unknown error")
                )
            }
        };

        let mut lines = vec![
            format!(
                "{} ({} priority, {}% confidence)",
                rec.action, rec.priority, rec.confidence
            ),
            format!("  {}", rec.description),
            format!("  Reason: {}", rec.reason),
        ];

        let mut model = format!("  Model: {}", rec.model_used);
        if rec.sanity_checked {
            model.push_str(" [sanity checked]");
        }
        if rec.fallback {
            model.push_str(" [fallback]");
        }
        if let Some(hive) = rec.hive_suggested {
            model.push_str(&format!(" [hive slot {}]", hive));
        }
        lines.push(model);
        if let Some(note) = &output.policy_note {
            lines.push(format!("  Policy disabled: {}", note));
        }
        lines.push(format!(
            "  Cost: {} | Duration: {}h",
            rec.cost, rec.duration_hours
        ));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{AcousticSignal, HiveAction, SensorReading, TemporalContext};
    use crate::policy::PolicyAdapter;

    fn command() -> RecommendCommand {
        let engine = RecommendationEngine::with_adapter(
            Config::default(),
            Arc::new(PolicyAdapter::disabled("artifact missing")),
        );
        RecommendCommand::new(Arc::new(engine))
    }

    fn signals(sensors: SensorReading, risk: f64) -> HiveSignals {
        HiveSignals {
            sensors,
            audio: AcousticSignal::with_risk(risk, true),
            context: Some(TemporalContext::new(2024, 120, 8)),
            ..HiveSignals::default()
        }
    }

    #[test]
    fn test_recommend_success() {
        let output = command().run(&signals(SensorReading::new(34.0, 60.0, 49.0), 3.0));
        assert!(output.success);
        let rec = output.recommendation.unwrap();
        assert_eq!(rec.action, HiveAction::HarvestHoney);
        assert!(rec.fallback);
    }

    #[test]
    fn test_recommend_rejects_non_finite() {
        let output = command().run(&signals(SensorReading::new(34.0, f64::INFINITY, 45.0), 3.0));
        assert!(!output.success);
        assert!(output.error.unwrap().contains("humidity"));
    }

    #[test]
    fn test_format_json() {
        let cmd = command();
        let output = cmd.run(&signals(SensorReading::new(39.5, 60.0, 45.0), 3.0));
        let json = cmd.format_output(
            &output,
            &RecommendOptions {
                json: true,
                quiet: false,
            },
        );
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["recommendation"]["action"], "CONTROL_TEMPERATURE");
        assert_eq!(value["recommendation"]["model_used"], "Rules");
        assert!(value["recommendation"].get("hive_suggested").is_none());
    }

    #[test]
    fn test_format_human_readable() {
        let cmd = command();
        let output = cmd.run(&signals(SensorReading::new(34.0, 60.0, 45.0), 3.0));
        let text = cmd.format_output(&output, &RecommendOptions::default());
        assert!(text.starts_with("INSPECT_HIVE (low priority, 85% confidence)"));
        assert!(text.contains("Model: Rules-Only [fallback]"));
        assert!(text.contains("Policy disabled: artifact missing"));
    }

    #[test]
    fn test_policy_note_only_for_fallback() {
        let output = command().run(&signals(SensorReading::new(34.0, 60.0, 45.0), 3.0));
        assert_eq!(output.policy_note.as_deref(), Some("artifact missing"));

        // Critical rules answer before the policy is consulted.
        let output = command().run(&signals(SensorReading::new(34.0, 60.0, 45.0), 80.0));
        assert_eq!(output.policy_note, None);
    }

    #[test]
    fn test_format_quiet() {
        let cmd = command();
        let output = cmd.run(&HiveSignals::default());
        let options = RecommendOptions {
            json: false,
            quiet: true,
        };
        assert!(cmd.format_output(&output, &options).is_empty());
    }

    #[test]
    fn test_format_rejection() {
        let cmd = command();
        let output = cmd.reject(&AdvisorError::shape("request is not valid JSON"));
        let text = cmd.format_output(&output, &RecommendOptions::default());
        assert!(text.starts_with("Request rejected: malformed input"));
    }
}
