//! State vector construction.
//!
//! Encodes one hive's signals into the fixed-length observation the decision
//! policy was trained on. Each hive slot holds a 26-feature block; the single
//! real hive is broadcast into every slot of the layout.
//!
//! Per-block feature order:
//!
//! | Offset | Count | Features |
//! |---|---|---|
//! | 0 | 4 | active, inactive, queenless probability, max of the three |
//! | 4 | 2 | temperature, humidity |
//! | 6 | 8 | 6h/24h rolling means and stds (approximated, see below) |
//! | 14 | 5 | hour, day of month, month, day of week, is weekend |
//! | 19 | 3 | honey level, colony strength, days since last action |
//! | 22 | 4 | 6h-ahead temperature, humidity, and their trend deltas |
//!
//! Rolling statistics are not available to this component. Means are the
//! current reading and standard deviations are fixed (1.0 °C, 5.0 %). This
//! is a known accuracy limitation shared with the training environment.

use chrono::{Datelike, NaiveDate};

use crate::config::MAX_HIVE_COUNT;
use crate::core::{AcousticSignal, ForecastSignal, SensorReading, TemporalContext};
use crate::error::{AdvisorError, Result};

/// Features per hive block.
pub const FEATURES_PER_HIVE: usize = 26;

/// Forecast step used for the 6-hours-ahead features (0-based).
pub const FORECAST_HORIZON_INDEX: usize = 5;

/// Offsets of the signed trend features within a block.
pub const TREND_FEATURE_OFFSETS: [usize; 2] = [24, 25];

/// Feature names in block order.
pub const FEATURE_NAMES: [&str; FEATURES_PER_HIVE] = [
    "audio_active",
    "audio_inactive",
    "audio_queenless",
    "audio_max_confidence",
    "temperature",
    "humidity",
    "temperature_mean_6h",
    "temperature_std_6h",
    "temperature_mean_24h",
    "temperature_std_24h",
    "humidity_mean_6h",
    "humidity_std_6h",
    "humidity_mean_24h",
    "humidity_std_24h",
    "hour",
    "day_of_month",
    "month",
    "day_of_week",
    "is_weekend",
    "honey_level",
    "colony_strength",
    "days_since_action",
    "temperature_6h_ahead",
    "humidity_6h_ahead",
    "temperature_trend",
    "humidity_trend",
];

const TEMP_SCALE: f64 = 50.0;
const HUMIDITY_SCALE: f64 = 100.0;
const ASSUMED_TEMP_STD: f64 = 1.0;
const TEMP_STD_SCALE: f64 = 10.0;
const ASSUMED_HUMIDITY_STD: f64 = 5.0;
const HUMIDITY_STD_SCALE: f64 = 20.0;
const TEMP_TREND_SCALE: f64 = 10.0;
const HUMIDITY_TREND_SCALE: f64 = 20.0;
const DAYS_SINCE_ACTION_SCALE: f64 = 30.0;

/// Shape of the observation: hive slots × features per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    pub hive_count: usize,
    pub features_per_hive: usize,
}

impl StateLayout {
    /// Layout with `hive_count` slots of the standard block.
    pub fn new(hive_count: usize) -> Self {
        Self {
            hive_count,
            features_per_hive: FEATURES_PER_HIVE,
        }
    }

    /// Total observation length.
    pub fn len(&self) -> usize {
        self.hive_count.saturating_mul(self.features_per_hive)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StateLayout {
    fn default() -> Self {
        Self::new(3)
    }
}

/// A built observation.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    values: Vec<f32>,
    layout: StateLayout,
}

impl StateVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn layout(&self) -> StateLayout {
        self.layout
    }

    /// The feature block for one hive slot.
    pub fn hive_block(&self, hive_index: usize) -> Option<&[f32]> {
        let width = self.layout.features_per_hive;
        let start = hive_index.checked_mul(width)?;
        self.values.get(start..start + width)
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

/// Builds state vectors for a fixed layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateVectorBuilder {
    layout: StateLayout,
}

impl StateVectorBuilder {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> StateLayout {
        self.layout
    }

    /// Build the observation for one hive.
    ///
    /// Short forecast series are padded with their last value; empty series
    /// fall back to the current reading. Non-finite inputs, an invalid
    /// temporal context or a layout that does not use the standard block are
    /// rejected.
    pub fn build(
        &self,
        sensors: &SensorReading,
        audio: &AcousticSignal,
        forecast: &ForecastSignal,
        context: &TemporalContext,
    ) -> Result<StateVector> {
        if self.layout.hive_count == 0 {
            return Err(AdvisorError::shape("layout has no hive slots"));
        }
        if self.layout.hive_count > MAX_HIVE_COUNT {
            return Err(AdvisorError::shape(format!(
                "layout has {} hive slots, at most {} are supported",
                self.layout.hive_count, MAX_HIVE_COUNT
            )));
        }
        if self.layout.features_per_hive != FEATURES_PER_HIVE {
            return Err(AdvisorError::shape(format!(
                "layout expects {} features per hive, builder produces {}",
                self.layout.features_per_hive, FEATURES_PER_HIVE
            )));
        }
        sensors.validate()?;
        audio.validate()?;
        forecast.validate()?;
        let date = context.validate()?;

        let block = hive_block(sensors, audio, forecast, context, date);

        let mut values = Vec::with_capacity(self.layout.len());
        for _ in 0..self.layout.hive_count {
            values.extend_from_slice(&block);
        }

        Ok(StateVector {
            values,
            layout: self.layout,
        })
    }
}

fn unit(value: f64) -> f32 {
    value.clamp(0.0, 1.0) as f32
}

fn signed_unit(value: f64) -> f32 {
    value.clamp(-1.0, 1.0) as f32
}

/// Value at the forecast horizon, padding short series with the last value.
fn horizon_value(series: &[f64], current: f64) -> f64 {
    series
        .get(FORECAST_HORIZON_INDEX)
        .or_else(|| series.last())
        .copied()
        .unwrap_or(current)
}

fn colony_strength(health_status: u8) -> f64 {
    match health_status {
        2 => 0.9,
        1 => 0.6,
        _ => 0.3,
    }
}

fn hive_block(
    sensors: &SensorReading,
    audio: &AcousticSignal,
    forecast: &ForecastSignal,
    context: &TemporalContext,
    date: NaiveDate,
) -> [f32; FEATURES_PER_HIVE] {
    let probs = &audio.probabilities;
    let active = unit(probs.active / 100.0);
    let inactive = unit(probs.inactive / 100.0);
    let queenless = unit(probs.queenless / 100.0);
    let max_confidence = active.max(inactive).max(queenless);

    let temp = unit(sensors.temperature / TEMP_SCALE);
    let humidity = unit(sensors.humidity / HUMIDITY_SCALE);
    let temp_std = unit(ASSUMED_TEMP_STD / TEMP_STD_SCALE);
    let humidity_std = unit(ASSUMED_HUMIDITY_STD / HUMIDITY_STD_SCALE);

    let weekday = date.weekday().num_days_from_monday();
    let is_weekend = if weekday >= 5 { 1.0 } else { 0.0 };

    let days_since_action = context.hours_since_last_action / 24.0;

    let temp_6h = horizon_value(&forecast.forecasts.temperature, sensors.temperature);
    let humidity_6h = horizon_value(&forecast.forecasts.humidity, sensors.humidity);

    [
        // Acoustic
        active,
        inactive,
        queenless,
        max_confidence,
        // Current sensors
        temp,
        humidity,
        // Rolling approximations
        temp,
        temp_std,
        temp,
        temp_std,
        humidity,
        humidity_std,
        humidity,
        humidity_std,
        // Temporal
        unit(context.hour_of_day as f64 / 24.0),
        unit(date.day() as f64 / 31.0),
        unit(date.month() as f64 / 12.0),
        unit(weekday as f64 / 7.0),
        is_weekend,
        // Hive status
        sensors.honey_level() as f32,
        colony_strength(context.health_status) as f32,
        unit(days_since_action / DAYS_SINCE_ACTION_SCALE),
        // Forecast
        unit(temp_6h / TEMP_SCALE),
        unit(humidity_6h / HUMIDITY_SCALE),
        signed_unit((temp_6h - sensors.temperature) / TEMP_TREND_SCALE),
        signed_unit((humidity_6h - sensors.humidity) / HUMIDITY_TREND_SCALE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ClassProbabilities;

    fn approx(a: f32, b: f64) -> bool {
        (a as f64 - b).abs() < 1e-6
    }

    fn scenario() -> (SensorReading, AcousticSignal, ForecastSignal, TemporalContext) {
        let sensors = SensorReading::new(34.5, 62.0, 45.2);
        let audio = AcousticSignal {
            status: "active".to_string(),
            probabilities: ClassProbabilities {
                active: 90.0,
                inactive: 9.0,
                queenless: 1.0,
            },
            queenless_risk: 1.0,
            queen_present: true,
        };
        let forecast = ForecastSignal::new(
            vec![34.6, 34.8, 35.0, 35.2, 35.4, 35.5],
            vec![62.0, 61.0, 60.0, 59.0, 58.0, 56.0],
        );
        // 2024-06-15 is a Saturday.
        let context = TemporalContext::new(2024, 167, 14)
            .with_hours_since_last_action(48.0)
            .with_health_status(2);
        (sensors, audio, forecast, context)
    }

    #[test]
    fn test_default_layout_is_78() {
        let builder = StateVectorBuilder::default();
        let (s, a, f, c) = scenario();
        let state = builder.build(&s, &a, &f, &c).unwrap();
        assert_eq!(state.len(), 78);
        assert_eq!(state.layout().hive_count, 3);
    }

    #[test]
    fn test_feature_values() {
        let (s, a, f, c) = scenario();
        let state = StateVectorBuilder::default().build(&s, &a, &f, &c).unwrap();
        let b = state.hive_block(0).unwrap();

        assert!(approx(b[0], 0.9));
        assert!(approx(b[1], 0.09));
        assert!(approx(b[2], 0.01));
        assert!(approx(b[3], 0.9));
        assert!(approx(b[4], 34.5 / 50.0));
        assert!(approx(b[5], 0.62));
        assert!(approx(b[6], 34.5 / 50.0));
        assert!(approx(b[7], 0.1));
        assert!(approx(b[9], 0.1));
        assert!(approx(b[10], 0.62));
        assert!(approx(b[11], 0.25));
        assert!(approx(b[13], 0.25));
        assert!(approx(b[14], 14.0 / 24.0));
        assert!(approx(b[15], 15.0 / 31.0));
        assert!(approx(b[16], 6.0 / 12.0));
        assert!(approx(b[17], 5.0 / 7.0));
        assert!(approx(b[18], 1.0));
        assert!(approx(b[19], (45.2 - 38.0) / 12.0));
        assert!(approx(b[20], 0.9));
        assert!(approx(b[21], 2.0 / 30.0));
        assert!(approx(b[22], 35.5 / 50.0));
        assert!(approx(b[23], 0.56));
        assert!(approx(b[24], 0.1));
        assert!(approx(b[25], -0.3));
    }

    #[test]
    fn test_hive_blocks_are_duplicates() {
        let (s, a, f, c) = scenario();
        let state = StateVectorBuilder::default().build(&s, &a, &f, &c).unwrap();
        let first = state.hive_block(0).unwrap();
        assert_eq!(state.hive_block(1).unwrap(), first);
        assert_eq!(state.hive_block(2).unwrap(), first);
        assert!(state.hive_block(3).is_none());
    }

    #[test]
    fn test_custom_hive_count() {
        let (s, a, f, c) = scenario();
        let state = StateVectorBuilder::new(StateLayout::new(1))
            .build(&s, &a, &f, &c)
            .unwrap();
        assert_eq!(state.len(), FEATURES_PER_HIVE);
    }

    #[test]
    fn test_oversized_layout_is_rejected() {
        let (s, a, f, c) = scenario();
        let layout = StateLayout::new(usize::MAX / 2);
        assert_eq!(layout.len(), usize::MAX);

        let err = StateVectorBuilder::new(layout)
            .build(&s, &a, &f, &c)
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Shape { .. }));

        let state = StateVectorBuilder::new(StateLayout::new(MAX_HIVE_COUNT))
            .build(&s, &a, &f, &c)
            .unwrap();
        assert_eq!(state.len(), MAX_HIVE_COUNT * FEATURES_PER_HIVE);
    }

    #[test]
    fn test_short_forecast_repeats_last_value() {
        let (s, a, _, c) = scenario();
        let forecast = ForecastSignal::new(vec![35.0, 36.0], vec![]);
        let state = StateVectorBuilder::default().build(&s, &a, &forecast, &c).unwrap();
        let b = state.hive_block(0).unwrap();
        assert!(approx(b[22], 36.0 / 50.0));
        // Empty humidity series falls back to the current reading
        assert!(approx(b[23], 0.62));
        assert!(approx(b[25], 0.0));
    }

    #[test]
    fn test_trend_is_clamped() {
        let (s, a, _, c) = scenario();
        let forecast = ForecastSignal::new(vec![60.0; 6], vec![0.0; 6]);
        let state = StateVectorBuilder::default().build(&s, &a, &forecast, &c).unwrap();
        let b = state.hive_block(0).unwrap();
        assert!(approx(b[24], 1.0));
        assert!(approx(b[25], -1.0));
    }

    #[test]
    fn test_colony_strength_mapping() {
        assert_eq!(colony_strength(2), 0.9);
        assert_eq!(colony_strength(1), 0.6);
        assert_eq!(colony_strength(0), 0.3);
        assert_eq!(colony_strength(7), 0.3);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let (s, a, f, c) = scenario();
        let builder = StateVectorBuilder::default();

        let bad_sensor = SensorReading::new(34.0, f64::INFINITY, 45.0);
        assert!(builder.build(&bad_sensor, &a, &f, &c).is_err());

        let bad_forecast = ForecastSignal::new(vec![f64::NAN], vec![]);
        assert!(builder.build(&s, &a, &bad_forecast, &c).is_err());

        let bad_context = TemporalContext::new(2023, 400, 3);
        assert!(builder.build(&s, &a, &f, &bad_context).is_err());

        let empty = StateVectorBuilder::new(StateLayout::new(0));
        assert!(matches!(
            empty.build(&s, &a, &f, &c),
            Err(AdvisorError::Shape { .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        prop_compose! {
            fn arb_audio()(
                active in 0.0f64..100.0,
                inactive in 0.0f64..100.0,
                queenless in 0.0f64..100.0,
            ) -> AcousticSignal {
                AcousticSignal {
                    probabilities: ClassProbabilities { active, inactive, queenless },
                    ..Default::default()
                }
            }
        }

        prop_compose! {
            fn arb_inputs()(
                temperature in -20.0f64..70.0,
                humidity in 0.0f64..100.0,
                weight in 0.0f64..100.0,
                audio in arb_audio(),
                temps in prop::collection::vec(-20.0f64..70.0, 0..8),
                hums in prop::collection::vec(0.0f64..100.0, 0..8),
                day in 1u32..=365,
                hour in 0u32..24,
                hours_since in 0.0f64..5000.0,
                health in 0u8..4,
            ) -> (SensorReading, AcousticSignal, ForecastSignal, TemporalContext) {
                let context = TemporalContext::new(2023, day, hour)
                    .with_hours_since_last_action(hours_since)
                    .with_health_status(health);
                (
                    SensorReading::new(temperature, humidity, weight),
                    audio,
                    ForecastSignal::new(temps, hums),
                    context,
                )
            }
        }

        proptest! {
            // Property: identical inputs produce identical vectors
            #[test]
            fn prop_build_is_deterministic((s, a, f, c) in arb_inputs()) {
                let builder = StateVectorBuilder::default();
                let first = builder.build(&s, &a, &f, &c).unwrap();
                let second = builder.build(&s, &a, &f, &c).unwrap();
                prop_assert_eq!(first, second);
            }

            // Property: trend features in [-1, 1], everything else in [0, 1]
            #[test]
            fn prop_values_are_normalized((s, a, f, c) in arb_inputs()) {
                let state = StateVectorBuilder::default().build(&s, &a, &f, &c).unwrap();
                prop_assert_eq!(state.len(), 78);
                for (i, v) in state.as_slice().iter().enumerate() {
                    let offset = i % FEATURES_PER_HIVE;
                    if TREND_FEATURE_OFFSETS.contains(&offset) {
                        prop_assert!((-1.0..=1.0).contains(v), "trend {} = {}", i, v);
                    } else {
                        prop_assert!((0.0..=1.0).contains(v), "feature {} = {}", i, v);
                    }
                }
            }
        }
    }
}
