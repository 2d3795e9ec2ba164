//! Recommendation output type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::action::{HiveAction, Priority};
use crate::core::signals::{AcousticSignal, ForecastSignal, SensorReading};

/// Which decision path produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelUsed {
    /// Critical-condition rule short-circuit.
    #[serde(rename = "Rules")]
    Rules,
    /// Fallback rule table (policy disabled or inference failed).
    #[serde(rename = "Rules-Only")]
    RulesOnly,
    /// Policy sampled from its action distribution.
    #[serde(rename = "PPO-Stochastic")]
    PolicyStochastic,
    /// Policy took its most probable action.
    #[serde(rename = "PPO-Deterministic")]
    PolicyDeterministic,
}

impl ModelUsed {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelUsed::Rules => "Rules",
            ModelUsed::RulesOnly => "Rules-Only",
            ModelUsed::PolicyStochastic => "PPO-Stochastic",
            ModelUsed::PolicyDeterministic => "PPO-Deterministic",
        }
    }

    /// Fixed confidence reported for this path.
    ///
    /// These are constants, not calibrated probabilities.
    pub fn confidence(&self) -> u8 {
        match self {
            ModelUsed::Rules => 95,
            ModelUsed::RulesOnly => 85,
            ModelUsed::PolicyStochastic => 80,
            ModelUsed::PolicyDeterministic => 90,
        }
    }

    /// Whether the learned policy produced the candidate.
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            ModelUsed::PolicyStochastic | ModelUsed::PolicyDeterministic
        )
    }
}

impl fmt::Display for ModelUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recommended action for one hive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Action code (e.g. `INSPECT_HIVE`).
    pub action: HiveAction,
    /// Catalog index of the action.
    pub action_index: usize,
    pub priority: Priority,
    /// Catalog description of the action.
    pub description: String,
    /// Why this action was chosen, with the triggering metrics.
    pub reason: String,
    /// Confidence in percent.
    pub confidence: u8,
    pub cost: u32,
    pub duration_hours: u32,
    pub model_used: ModelUsed,
    /// True whenever the sanity checker ran (policy path only).
    pub sanity_checked: bool,
    /// True when the fallback rule table answered.
    pub fallback: bool,
    /// Hive slot the policy addressed (policy path only).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hive_suggested: Option<usize>,
}

impl Recommendation {
    /// Build a recommendation, filling catalog metadata for `action`.
    pub fn new(
        action: HiveAction,
        priority: Priority,
        reason: impl Into<String>,
        model_used: ModelUsed,
    ) -> Self {
        let meta = action.metadata();
        Self {
            action,
            action_index: action.index(),
            priority,
            description: meta.description.to_string(),
            reason: reason.into(),
            confidence: model_used.confidence(),
            cost: meta.cost,
            duration_hours: meta.duration_hours,
            model_used,
            sanity_checked: model_used.is_policy(),
            fallback: model_used == ModelUsed::RulesOnly,
            hive_suggested: None,
        }
    }

    /// Record which hive slot the policy addressed.
    pub fn with_hive_suggested(mut self, hive_index: usize) -> Self {
        self.hive_suggested = Some(hive_index);
        self
    }
}

/// Operator-facing reason for an action chosen by the policy or fallback table.
pub fn action_reason(
    action: HiveAction,
    sensors: &SensorReading,
    audio: &AcousticSignal,
    forecast: &ForecastSignal,
) -> String {
    match action {
        HiveAction::DoNothing => {
            "All parameters within optimal range, colony healthy".to_string()
        }
        HiveAction::InspectHive => "Routine inspection recommended".to_string(),
        HiveAction::AddFood => format!(
            "Weight at {:.1}kg, colony may need supplemental feeding",
            sensors.weight
        ),
        HiveAction::AddMedication => {
            "Health indicators suggest potential disease risk".to_string()
        }
        HiveAction::AdjustVentilation => format!(
            "Humidity at {:.0}%, ventilation adjustment needed",
            sensors.humidity
        ),
        HiveAction::ControlTemperature => format!(
            "Temperature {} (currently {:.1}°C)",
            forecast.trends.temperature.as_str(),
            sensors.temperature
        ),
        HiveAction::IntroduceQueen => format!(
            "Queenless risk at {:.1}%, colony needs new queen",
            audio.queenless_risk
        ),
        HiveAction::SplitColony => {
            "Colony strong, splitting recommended to prevent swarming".to_string()
        }
        HiveAction::RelocateHive => {
            "Environmental conditions suggest relocation beneficial".to_string()
        }
        HiveAction::CombineWeakColonies => {
            format!("Weight low at {:.1}kg, consider combining", sensors.weight)
        }
        HiveAction::HarvestHoney => format!(
            "Weight at {:.1}kg indicates honey ready for harvest",
            sensors.weight
        ),
        HiveAction::EmergencyIntervention => {
            "Critical conditions detected: immediate action required".to_string()
        }
    }
}
