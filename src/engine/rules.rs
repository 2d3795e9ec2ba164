//! Rule tables.
//!
//! Critical rules run before any policy inference and short-circuit the
//! pipeline. The fallback table answers when the policy is disabled or a
//! single inference fails.

use crate::core::{
    action_reason, AcousticSignal, ForecastSignal, HiveAction, ModelUsed, Priority,
    Recommendation, SensorReading,
};

/// Queenless risk (percent) above which a queen is introduced immediately.
pub const QUEENLESS_RISK_CRITICAL: f64 = 50.0;
/// Brood temperature (°C) above which the colony is overheating.
pub const TEMP_CRITICAL_HIGH: f64 = 38.0;
/// Brood temperature (°C) below which the colony is too cold.
pub const TEMP_CRITICAL_LOW: f64 = 30.0;
/// Hive weight (kg) below which the colony is starving.
pub const WEIGHT_CRITICAL_LOW: f64 = 38.0;

/// Optimal brood temperature band (°C).
pub const TEMP_OPTIMAL: (f64, f64) = (32.0, 36.0);
/// Optimal humidity band (%).
pub const HUMIDITY_OPTIMAL: (f64, f64) = (50.0, 70.0);
/// Hive weight (kg) below which feeding is advised.
pub const WEIGHT_LOW: f64 = 40.0;

/// A matched critical rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub action: HiveAction,
    pub priority: Priority,
    pub reason: String,
}

impl RuleMatch {
    /// Format as a rule-path recommendation.
    pub fn into_recommendation(self) -> Recommendation {
        Recommendation::new(self.action, self.priority, self.reason, ModelUsed::Rules)
    }
}

/// Evaluate the critical rules in order; the first match wins.
pub fn evaluate_critical(sensors: &SensorReading, audio: &AcousticSignal) -> Option<RuleMatch> {
    let temp = sensors.temperature;

    if audio.queenless_risk > QUEENLESS_RISK_CRITICAL {
        return Some(RuleMatch {
            action: HiveAction::IntroduceQueen,
            priority: Priority::Critical,
            reason: format!(
                "Queenless risk at {:.1}%, colony needs new queen urgently",
                audio.queenless_risk
            ),
        });
    }

    if temp > TEMP_CRITICAL_HIGH {
        return Some(RuleMatch {
            action: HiveAction::ControlTemperature,
            priority: Priority::High,
            reason: format!("Temperature too high at {:.1}°C (optimal: 32-36°C)", temp),
        });
    }

    if temp < TEMP_CRITICAL_LOW {
        return Some(RuleMatch {
            action: HiveAction::ControlTemperature,
            priority: Priority::High,
            reason: format!("Temperature too low at {:.1}°C (optimal: 32-36°C)", temp),
        });
    }

    if sensors.weight < WEIGHT_CRITICAL_LOW {
        return Some(RuleMatch {
            action: HiveAction::AddFood,
            priority: Priority::High,
            reason: format!(
                "Weight critically low at {:.1}kg, colony needs feeding",
                sensors.weight
            ),
        });
    }

    None
}

fn outside(value: f64, band: (f64, f64)) -> bool {
    value < band.0 || value > band.1
}

/// Pick an action from the fallback table.
pub fn fallback_decision(
    sensors: &SensorReading,
    audio: &AcousticSignal,
    harvest_weight_threshold: f64,
) -> (HiveAction, Priority) {
    let temp = sensors.temperature;
    let weight = sensors.weight;

    if audio.queenless_risk > QUEENLESS_RISK_CRITICAL {
        (HiveAction::IntroduceQueen, Priority::Critical)
    } else if temp > TEMP_CRITICAL_HIGH || temp < TEMP_CRITICAL_LOW {
        (HiveAction::ControlTemperature, Priority::High)
    } else if weight < WEIGHT_CRITICAL_LOW {
        (HiveAction::AddFood, Priority::High)
    } else if outside(temp, TEMP_OPTIMAL) {
        (HiveAction::ControlTemperature, Priority::Medium)
    } else if outside(sensors.humidity, HUMIDITY_OPTIMAL) {
        (HiveAction::AdjustVentilation, Priority::Medium)
    } else if weight < WEIGHT_LOW {
        (HiveAction::AddFood, Priority::Medium)
    } else if weight > harvest_weight_threshold {
        (HiveAction::HarvestHoney, Priority::Low)
    } else {
        (HiveAction::InspectHive, Priority::Low)
    }
}

/// Build the fallback-path recommendation.
pub fn fallback_recommendation(
    sensors: &SensorReading,
    audio: &AcousticSignal,
    forecast: &ForecastSignal,
    harvest_weight_threshold: f64,
) -> Recommendation {
    let (action, priority) = fallback_decision(sensors, audio, harvest_weight_threshold);
    let reason = action_reason(action, sensors, audio, forecast);
    Recommendation::new(action, priority, reason, ModelUsed::RulesOnly)
}
