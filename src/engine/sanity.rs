//! Post-inference sanity checks.
//!
//! A policy suggestion that contradicts directly observed facts is replaced
//! with a safer action. Checks run in a fixed order and at most one
//! substitution happens per call.

use tracing::info;

use crate::config::HarvestConfig;
use crate::core::{AcousticSignal, HiveAction, SensorReading};
use crate::engine::rules::{HUMIDITY_OPTIMAL, TEMP_OPTIMAL, WEIGHT_LOW};

/// Queenless risk (percent) below which a present queen is trusted.
pub const QUEEN_TRUSTED_RISK: f64 = 30.0;
/// Hive weight (kg) above which feeding is unnecessary.
pub const WEIGHT_WELL_FED: f64 = 48.0;

/// Which check caused a substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanityCheck {
    HarvestNotReady,
    IdleWithIssues,
    QueenAlreadyPresent,
    FoodNotNeeded,
}

/// A substitution made by the sanity checker.
#[derive(Debug, Clone, PartialEq)]
pub struct SanityOverride {
    pub check: SanityCheck,
    pub original: HiveAction,
    pub replacement: HiveAction,
    /// The numeric fact that triggered the substitution.
    pub fact: String,
}

/// Outcome of a sanity check pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SanityVerdict {
    /// The action to recommend.
    pub action: HiveAction,
    /// Present when the suggestion was replaced.
    pub substitution: Option<SanityOverride>,
}

/// Validates policy suggestions against raw sensor and acoustic facts.
#[derive(Debug, Clone, Copy)]
pub struct SanityChecker {
    harvest_weight_threshold: f64,
    harvest_honey_level_threshold: f64,
}

impl Default for SanityChecker {
    fn default() -> Self {
        Self::new(&HarvestConfig::default())
    }
}

impl SanityChecker {
    pub fn new(harvest: &HarvestConfig) -> Self {
        Self {
            harvest_weight_threshold: harvest.weight_threshold,
            harvest_honey_level_threshold: harvest.honey_level_threshold,
        }
    }

    /// Check a suggestion, returning the approved (possibly replaced) action.
    pub fn check(
        &self,
        suggested: HiveAction,
        sensors: &SensorReading,
        audio: &AcousticSignal,
    ) -> SanityVerdict {
        let substitution = self.find_substitution(suggested, sensors, audio);

        match substitution {
            Some(sub) => {
                info!(
                    original = %sub.original,
                    replacement = %sub.replacement,
                    fact = %sub.fact,
                    "sanity override"
                );
                SanityVerdict {
                    action: sub.replacement,
                    substitution: Some(sub),
                }
            }
            None => SanityVerdict {
                action: suggested,
                substitution: None,
            },
        }
    }

    fn find_substitution(
        &self,
        suggested: HiveAction,
        sensors: &SensorReading,
        audio: &AcousticSignal,
    ) -> Option<SanityOverride> {
        let replace = |check, replacement, fact: String| SanityOverride {
            check,
            original: suggested,
            replacement,
            fact,
        };

        let temp = sensors.temperature;
        let humidity = sensors.humidity;
        let weight = sensors.weight;

        match suggested {
            HiveAction::HarvestHoney => {
                let honey_level = sensors.honey_level();
                if weight < self.harvest_weight_threshold {
                    Some(replace(
                        SanityCheck::HarvestNotReady,
                        HiveAction::InspectHive,
                        format!(
                            "weight {:.1}kg < {:.1}kg threshold",
                            weight, self.harvest_weight_threshold
                        ),
                    ))
                } else if honey_level < self.harvest_honey_level_threshold {
                    Some(replace(
                        SanityCheck::HarvestNotReady,
                        HiveAction::InspectHive,
                        format!(
                            "honey level {:.2} < {:.2} threshold",
                            honey_level, self.harvest_honey_level_threshold
                        ),
                    ))
                } else {
                    None
                }
            }
            HiveAction::DoNothing => {
                if temp < TEMP_OPTIMAL.0 || temp > TEMP_OPTIMAL.1 {
                    Some(replace(
                        SanityCheck::IdleWithIssues,
                        HiveAction::ControlTemperature,
                        format!("temperature {:.1}°C outside 32-36°C", temp),
                    ))
                } else if humidity < HUMIDITY_OPTIMAL.0 || humidity > HUMIDITY_OPTIMAL.1 {
                    Some(replace(
                        SanityCheck::IdleWithIssues,
                        HiveAction::AdjustVentilation,
                        format!("humidity {:.1}% outside 50-70%", humidity),
                    ))
                } else if weight < WEIGHT_LOW {
                    Some(replace(
                        SanityCheck::IdleWithIssues,
                        HiveAction::AddFood,
                        format!("weight {:.1}kg < {:.1}kg", weight, WEIGHT_LOW),
                    ))
                } else {
                    None
                }
            }
            HiveAction::IntroduceQueen
                if audio.queen_present && audio.queenless_risk < QUEEN_TRUSTED_RISK =>
            {
                Some(replace(
                    SanityCheck::QueenAlreadyPresent,
                    HiveAction::InspectHive,
                    format!("queen present, queenless risk only {:.1}%", audio.queenless_risk),
                ))
            }
            HiveAction::AddFood if weight > WEIGHT_WELL_FED => Some(replace(
                SanityCheck::FoodNotNeeded,
                HiveAction::InspectHive,
                format!("weight {:.1}kg > {:.1}kg", weight, WEIGHT_WELL_FED),
            )),
            _ => None,
        }
    }
}
