//! State command for hive-advisor.
//!
//! Prints the observation the policy would see for a request.

use serde::{Deserialize, Serialize};

use crate::core::HiveSignals;
use crate::engine::state_vector::FEATURE_NAMES;
use crate::engine::StateVectorBuilder;

/// Options for the state command.
#[derive(Debug, Clone, Default)]
pub struct StateOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the state command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateOutput {
    pub success: bool,
    pub hive_count: usize,
    pub features_per_hive: usize,
    /// The full observation, hive blocks concatenated.
    pub values: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StateOutput {
    pub fn success(hive_count: usize, features_per_hive: usize, values: Vec<f32>) -> Self {
        Self {
            success: true,
            hive_count,
            features_per_hive,
            values,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            hive_count: 0,
            features_per_hive: 0,
            values: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The state command implementation.
pub struct StateCommand {
    builder: StateVectorBuilder,
}

impl StateCommand {
    pub fn new(builder: StateVectorBuilder) -> Self {
        Self { builder }
    }

    /// Run the state command.
    pub fn run(&self, signals: &HiveSignals) -> StateOutput {
        let context = signals.resolved_context();
        match self
            .builder
            .build(&signals.sensors, &signals.audio, &signals.forecast, &context)
        {
            Ok(state) => {
                let layout = state.layout();
                StateOutput::success(layout.hive_count, layout.features_per_hive, state.into_vec())
            }
            Err(e) => StateOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StateOutput, options: &StateOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &StateOutput) -> String {
        if !output.success {
            return format!(
                "Request rejected: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!(
            "State vector: {} values ({} hive slots x {} features, slot 0 shown)\n",
            output.values.len(),
            output.hive_count,
            output.features_per_hive
        )];
        for (name, value) in FEATURE_NAMES.iter().zip(&output.values) {
            lines.push(format!("  {:<22} {:>8.4}", name, value));
        }
        lines.join("\n")
    }
}
