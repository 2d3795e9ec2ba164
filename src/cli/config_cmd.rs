//! Config command for hive-advisor.
//!
//! Shows the effective configuration and, with `--init`, writes it to the
//! project config file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;

/// Options for the config command.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Write the effective configuration to the project config file.
    pub init: bool,
}

/// Output format for the config command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOutput {
    pub success: bool,
    pub config: Config,
    /// Artifact path the engine would load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    /// Config file written by `--init`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The config command implementation.
pub struct ConfigCommand {
    cwd: PathBuf,
    config: Config,
}

impl ConfigCommand {
    pub fn new(cwd: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            cwd: cwd.into(),
            config,
        }
    }

    /// Run the config command.
    pub fn run(&self, options: &ConfigOptions) -> ConfigOutput {
        let model_path = self
            .config
            .policy
            .resolved_model_path()
            .map(|p| p.display().to_string());

        let mut output = ConfigOutput {
            success: true,
            config: self.config.clone(),
            model_path,
            written: None,
            error: None,
        };

        if options.init {
            match self.config.save_project(&self.cwd) {
                Ok(path) => output.written = Some(path.display().to_string()),
                Err(e) => {
                    output.success = false;
                    output.error = Some(e.to_string());
                }
            }
        }

        output
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ConfigOutput, options: &ConfigOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let mut lines = Vec::new();
        if let Some(error) = &output.error {
            lines.push(format!("Config write failed: {}", error));
        }
        if let Some(path) = &output.written {
            lines.push(format!("Wrote {}", path));
        }

        let policy = &output.config.policy;
        lines.push("Policy:".to_string());
        lines.push(format!(
            "  model_path: {}",
            output.model_path.as_deref().unwrap_or("(none)")
        ));
        lines.push(format!(
            "  mode: {}",
            if policy.stochastic {
                "stochastic"
            } else {
                "deterministic"
            }
        ));
        if let Some(seed) = policy.seed {
            lines.push(format!("  seed: {}", seed));
        }
        lines.push("Harvest:".to_string());
        lines.push(format!(
            "  weight_threshold: {:.1}kg",
            output.config.harvest.weight_threshold
        ));
        lines.push(format!(
            "  honey_level_threshold: {:.2}",
            output.config.harvest.honey_level_threshold
        ));
        lines.push("Layout:".to_string());
        lines.push(format!("  hive_count: {}", output.config.layout.hive_count));

        lines.join("\n")
    }
}
