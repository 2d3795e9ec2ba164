//! Catalog command for hive-advisor.
//!
//! Lists the interventions the engine can recommend.

use serde::{Deserialize, Serialize};

use crate::core::{HiveAction, Priority};

/// Options for the catalog command.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionInfo {
    pub index: usize,
    pub code: HiveAction,
    pub name: String,
    pub description: String,
    pub severity: Priority,
    pub cost: u32,
    pub duration_hours: u32,
}

impl ActionInfo {
    pub fn from_action(action: HiveAction) -> Self {
        let meta = action.metadata();
        Self {
            index: action.index(),
            code: action,
            name: meta.display_name.to_string(),
            description: meta.description.to_string(),
            severity: meta.severity,
            cost: meta.cost,
            duration_hours: meta.duration_hours,
        }
    }
}

/// Output format for the catalog command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOutput {
    pub success: bool,
    pub count: usize,
    pub actions: Vec<ActionInfo>,
}

/// The catalog command implementation.
#[derive(Debug, Default)]
pub struct CatalogCommand;

impl CatalogCommand {
    pub fn new() -> Self {
        Self
    }

    /// Run the catalog command.
    pub fn run(&self) -> CatalogOutput {
        let actions: Vec<ActionInfo> = HiveAction::all()
            .iter()
            .copied()
            .map(ActionInfo::from_action)
            .collect();
        CatalogOutput {
            success: true,
            count: actions.len(),
            actions,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CatalogOutput, options: &CatalogOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let mut lines = vec![format!("{} actions:\n", output.count)];
        for action in &output.actions {
            lines.push(format!(
                "{:>2}. {:<24} [{}] cost {} | {}h",
                action.index, action.code, action.severity, action.cost, action.duration_hours
            ));
            lines.push(format!("    {}", action.description));
        }
        lines.join("\n")
    }
}
