//! Action catalog for hive-advisor.
//!
//! The closed set of operator interventions and their static metadata.
//! Catalog indices match the action space the decision policy was trained
//! against, so variant order is part of the contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of actions in the catalog.
pub const ACTION_COUNT: usize = 12;

/// An intervention that can be recommended for a hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HiveAction {
    /// Monitor without intervention.
    DoNothing,
    /// Visual inspection.
    InspectHive,
    /// Sugar syrup or pollen substitute.
    AddFood,
    /// Varroa, nosema or other disease treatment.
    AddMedication,
    /// Entrance or ventilation change.
    AdjustVentilation,
    /// Insulation or shading.
    ControlTemperature,
    /// Requeen a queenless colony.
    IntroduceQueen,
    /// Divide a strong colony to prevent swarming.
    SplitColony,
    /// Move the hive.
    RelocateHive,
    /// Merge a weak colony into a strong one.
    CombineWeakColonies,
    /// Extract honey.
    HarvestHoney,
    /// Colony collapse response.
    EmergencyIntervention,
}

/// Severity tier of an action or recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Lowercase name as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable metadata for a catalog action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionMetadata {
    /// Human-readable name (e.g. "Harvest Honey").
    pub display_name: &'static str,
    /// One-line description of the intervention.
    pub description: &'static str,
    /// Default severity tier.
    pub severity: Priority,
    /// Relative cost of the intervention.
    pub cost: u32,
    /// Expected duration in hours.
    pub duration_hours: u32,
}

const fn meta(
    display_name: &'static str,
    description: &'static str,
    severity: Priority,
    cost: u32,
    duration_hours: u32,
) -> ActionMetadata {
    ActionMetadata {
        display_name,
        description,
        severity,
        cost,
        duration_hours,
    }
}

impl HiveAction {
    /// All actions in catalog index order.
    pub fn all() -> &'static [HiveAction; ACTION_COUNT] {
        &[
            HiveAction::DoNothing,
            HiveAction::InspectHive,
            HiveAction::AddFood,
            HiveAction::AddMedication,
            HiveAction::AdjustVentilation,
            HiveAction::ControlTemperature,
            HiveAction::IntroduceQueen,
            HiveAction::SplitColony,
            HiveAction::RelocateHive,
            HiveAction::CombineWeakColonies,
            HiveAction::HarvestHoney,
            HiveAction::EmergencyIntervention,
        ]
    }

    /// Catalog index of this action.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode a catalog index.
    pub fn from_index(index: usize) -> Option<HiveAction> {
        Self::all().get(index).copied()
    }

    /// Static metadata for this action.
    pub fn metadata(self) -> ActionMetadata {
        match self {
            HiveAction::DoNothing => meta(
                "Do Nothing",
                "Monitor hive without intervention",
                Priority::Low,
                0,
                0,
            ),
            HiveAction::InspectHive => meta(
                "Inspect Hive",
                "Visual inspection to assess colony status",
                Priority::Low,
                5,
                1,
            ),
            HiveAction::AddFood => meta(
                "Add Food",
                "Provide sugar syrup or pollen substitute",
                Priority::Medium,
                10,
                1,
            ),
            HiveAction::AddMedication => meta(
                "Add Medication",
                "Treat for Varroa mites, nosema, or other diseases",
                Priority::High,
                20,
                2,
            ),
            HiveAction::AdjustVentilation => meta(
                "Adjust Ventilation",
                "Modify hive entrance or add ventilation",
                Priority::Medium,
                5,
                1,
            ),
            HiveAction::ControlTemperature => meta(
                "Control Temperature",
                "Add insulation or shading to regulate temperature",
                Priority::Medium,
                15,
                2,
            ),
            HiveAction::IntroduceQueen => meta(
                "Introduce Queen",
                "Add new queen to queenless colony",
                Priority::High,
                50,
                3,
            ),
            HiveAction::SplitColony => meta(
                "Split Colony",
                "Divide strong colony to prevent swarming",
                Priority::Medium,
                30,
                4,
            ),
            HiveAction::RelocateHive => meta(
                "Relocate Hive",
                "Move hive to better location",
                Priority::Low,
                40,
                6,
            ),
            HiveAction::CombineWeakColonies => meta(
                "Combine Weak Colonies",
                "Merge weak hive with strong one",
                Priority::High,
                25,
                3,
            ),
            HiveAction::HarvestHoney => meta(
                "Harvest Honey",
                "Extract honey when production is sufficient",
                Priority::Low,
                20,
                4,
            ),
            HiveAction::EmergencyIntervention => meta(
                "Emergency Intervention",
                "Critical action for colony collapse risk",
                Priority::Critical,
                100,
                6,
            ),
        }
    }

    /// Wire name (e.g. `HARVEST_HONEY`).
    pub fn code(self) -> &'static str {
        match self {
            HiveAction::DoNothing => "DO_NOTHING",
            HiveAction::InspectHive => "INSPECT_HIVE",
            HiveAction::AddFood => "ADD_FOOD",
            HiveAction::AddMedication => "ADD_MEDICATION",
            HiveAction::AdjustVentilation => "ADJUST_VENTILATION",
            HiveAction::ControlTemperature => "CONTROL_TEMPERATURE",
            HiveAction::IntroduceQueen => "INTRODUCE_QUEEN",
            HiveAction::SplitColony => "SPLIT_COLONY",
            HiveAction::RelocateHive => "RELOCATE_HIVE",
            HiveAction::CombineWeakColonies => "COMBINE_WEAK_COLONIES",
            HiveAction::HarvestHoney => "HARVEST_HONEY",
            HiveAction::EmergencyIntervention => "EMERGENCY_INTERVENTION",
        }
    }
}

impl fmt::Display for HiveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}
