//! Input signal types.
//!
//! Snapshots supplied by the caller: sensor readings, the acoustic
//! classifier's verdict, the short-horizon forecast and temporal context.
//! All fields are optional on the wire and fall back to neutral defaults.

use chrono::{Datelike, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Weight (kg) at which stored honey is considered empty.
pub const HONEY_EMPTY_WEIGHT_KG: f64 = 38.0;

/// Weight span (kg) between an empty and a full honey store.
pub const HONEY_SPAN_KG: f64 = 12.0;

/// Point-in-time sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorReading {
    /// Brood-nest temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Total hive weight in kg.
    pub weight: f64,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            temperature: 34.0,
            humidity: 65.0,
            weight: 45.0,
        }
    }
}

impl SensorReading {
    /// Create a reading.
    pub fn new(temperature: f64, humidity: f64, weight: f64) -> Self {
        Self {
            temperature,
            humidity,
            weight,
        }
    }

    /// Normalized [0, 1] proxy for stored honey, linear in weight.
    pub fn honey_level(&self) -> f64 {
        ((self.weight - HONEY_EMPTY_WEIGHT_KG) / HONEY_SPAN_KG).clamp(0.0, 1.0)
    }

    /// Reject non-finite readings.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("weight", self.weight),
        ] {
            if !value.is_finite() {
                return Err(AdvisorError::shape(format!(
                    "sensor {} is not a finite number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Per-class probabilities from the acoustic classifier, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassProbabilities {
    pub active: f64,
    pub inactive: f64,
    pub queenless: f64,
}

impl Default for ClassProbabilities {
    fn default() -> Self {
        Self {
            active: 50.0,
            inactive: 25.0,
            queenless: 25.0,
        }
    }
}

/// Acoustic health classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcousticSignal {
    /// Classifier label (informational only).
    pub status: String,
    /// Class probabilities in percent; should sum to about 100.
    pub probabilities: ClassProbabilities,
    /// Probability in percent that the colony has no living queen.
    pub queenless_risk: f64,
    /// Whether the classifier believes a queen is present.
    pub queen_present: bool,
}

impl Default for AcousticSignal {
    fn default() -> Self {
        Self {
            status: "unknown".to_string(),
            probabilities: ClassProbabilities::default(),
            queenless_risk: 0.0,
            queen_present: true,
        }
    }
}

impl AcousticSignal {
    /// Build a signal from the two fields the rules care about.
    pub fn with_risk(queenless_risk: f64, queen_present: bool) -> Self {
        Self {
            queenless_risk,
            queen_present,
            ..Default::default()
        }
    }

    /// Reject non-finite values.
    pub fn validate(&self) -> Result<()> {
        let p = &self.probabilities;
        for (name, value) in [
            ("probabilities.active", p.active),
            ("probabilities.inactive", p.inactive),
            ("probabilities.queenless", p.queenless),
            ("queenless_risk", self.queenless_risk),
        ] {
            if !value.is_finite() {
                return Err(AdvisorError::shape(format!(
                    "acoustic {} is not a finite number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Direction of a forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

/// Hourly forecast series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSeries {
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
}

/// Forecast trend labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastTrends {
    pub temperature: Trend,
    pub humidity: Trend,
}

/// Short-horizon forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSignal {
    pub forecasts: ForecastSeries,
    pub trends: ForecastTrends,
}

impl ForecastSignal {
    /// Build a forecast from explicit series.
    pub fn new(temperature: Vec<f64>, humidity: Vec<f64>) -> Self {
        Self {
            forecasts: ForecastSeries {
                temperature,
                humidity,
            },
            trends: ForecastTrends::default(),
        }
    }

    /// Set the trend labels.
    pub fn with_trends(mut self, temperature: Trend, humidity: Trend) -> Self {
        self.trends = ForecastTrends {
            temperature,
            humidity,
        };
        self
    }

    /// Reject non-finite forecast values.
    pub fn validate(&self) -> Result<()> {
        let series = &self.forecasts;
        let finite = series
            .temperature
            .iter()
            .chain(series.humidity.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(AdvisorError::shape(
                "forecast series contains a non-finite value",
            ));
        }
        Ok(())
    }
}

/// Colony health as reported by the caller (0 = weak, 1 = fair, 2 = strong).
pub type HealthStatus = u8;

/// Temporal context of a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalContext {
    /// Calendar year the `day_of_year` belongs to. Defaults to the current
    /// UTC year.
    #[serde(default = "current_year")]
    pub year: i32,
    /// Ordinal day (1-based).
    pub day_of_year: u32,
    /// Hour of day, 0-23.
    pub hour_of_day: u32,
    /// Hours since the last intervention on this hive.
    #[serde(default = "default_hours_since_action")]
    pub hours_since_last_action: f64,
    #[serde(default = "default_health_status")]
    pub health_status: HealthStatus,
}

fn current_year() -> i32 {
    Utc::now().year()
}

fn default_hours_since_action() -> f64 {
    24.0
}

fn default_health_status() -> HealthStatus {
    1
}

impl TemporalContext {
    /// Create a context for a given calendar position.
    pub fn new(year: i32, day_of_year: u32, hour_of_day: u32) -> Self {
        Self {
            year,
            day_of_year,
            hour_of_day,
            hours_since_last_action: default_hours_since_action(),
            health_status: default_health_status(),
        }
    }

    /// Synthesize a context from wall-clock UTC time.
    pub fn now() -> Self {
        let now = Utc::now();
        Self::new(now.year(), now.ordinal(), now.hour())
    }

    pub fn with_hours_since_last_action(mut self, hours: f64) -> Self {
        self.hours_since_last_action = hours;
        self
    }

    pub fn with_health_status(mut self, status: HealthStatus) -> Self {
        self.health_status = status;
        self
    }

    /// Resolve the calendar date.
    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, self.day_of_year).ok_or_else(|| {
            AdvisorError::shape(format!(
                "day_of_year {} is not valid for year {}",
                self.day_of_year, self.year
            ))
        })
    }

    /// Validate ranges; returns the resolved date.
    pub fn validate(&self) -> Result<NaiveDate> {
        if self.hour_of_day > 23 {
            return Err(AdvisorError::shape(format!(
                "hour_of_day must be 0-23, got {}",
                self.hour_of_day
            )));
        }
        if !self.hours_since_last_action.is_finite() || self.hours_since_last_action < 0.0 {
            return Err(AdvisorError::shape(
                "hours_since_last_action must be a non-negative number",
            ));
        }
        self.date()
    }
}

/// One recommendation request as read from a file or stdin.
///
/// `context` may be omitted; it is then synthesized from the current time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveSignals {
    pub sensors: SensorReading,
    pub audio: AcousticSignal,
    pub forecast: ForecastSignal,
    pub context: Option<TemporalContext>,
}

impl HiveSignals {
    /// The request's context, or one synthesized from wall-clock time.
    pub fn resolved_context(&self) -> TemporalContext {
        self.context.unwrap_or_else(|| {
            tracing::debug!("no temporal context supplied, synthesizing from current time");
            TemporalContext::now()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_honey_level_is_linear_and_clamped() {
        assert_eq!(SensorReading::new(34.0, 60.0, 38.0).honey_level(), 0.0);
        assert_eq!(SensorReading::new(34.0, 60.0, 44.0).honey_level(), 0.5);
        assert_eq!(SensorReading::new(34.0, 60.0, 50.0).honey_level(), 1.0);
        assert_eq!(SensorReading::new(34.0, 60.0, 20.0).honey_level(), 0.0);
        assert_eq!(SensorReading::new(34.0, 60.0, 70.0).honey_level(), 1.0);
    }

    #[test]
    fn test_sensor_defaults_fill_missing_fields() {
        let reading: SensorReading = serde_json::from_str(r#"{"weight": 41.5}"#).unwrap();
        assert_eq!(reading.temperature, 34.0);
        assert_eq!(reading.humidity, 65.0);
        assert_eq!(reading.weight, 41.5);
    }

    #[test]
    fn test_sensor_rejects_nan() {
        let reading = SensorReading::new(f64::NAN, 60.0, 45.0);
        let err = reading.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_acoustic_defaults() {
        let audio: AcousticSignal =
            serde_json::from_str(r#"{"probabilities": {"active": 80.0}}"#).unwrap();
        assert_eq!(audio.probabilities.active, 80.0);
        assert_eq!(audio.probabilities.inactive, 25.0);
        assert_eq!(audio.probabilities.queenless, 25.0);
        assert_eq!(audio.queenless_risk, 0.0);
        assert!(audio.queen_present);
    }

    #[test]
    fn test_forecast_parses_trends() {
        let json = r#"{
            "forecasts": {"temperature": [34.0, 34.5], "humidity": [60.0]},
            "trends": {"temperature": "increasing"},
            "changes": {"temperature": 0.5}
        }"#;
        let forecast: ForecastSignal = serde_json::from_str(json).unwrap();
        assert_eq!(forecast.forecasts.temperature, vec![34.0, 34.5]);
        assert_eq!(forecast.trends.temperature, Trend::Increasing);
        assert_eq!(forecast.trends.humidity, Trend::Stable);
    }

    #[test]
    fn test_temporal_context_resolves_date() {
        let ctx = TemporalContext::new(2024, 60, 12);
        let date = ctx.validate().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_temporal_context_rejects_bad_ranges() {
        assert!(TemporalContext::new(2023, 366, 12).validate().is_err());
        assert!(TemporalContext::new(2023, 0, 12).validate().is_err());
        assert!(TemporalContext::new(2023, 100, 24).validate().is_err());
        let negative = TemporalContext::new(2023, 100, 5).with_hours_since_last_action(-1.0);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_temporal_context_now_is_valid() {
        assert!(TemporalContext::now().validate().is_ok());
    }

    #[test]
    fn test_signals_without_context() {
        let signals: HiveSignals =
            serde_json::from_str(r#"{"sensors": {"temperature": 35.0}}"#).unwrap();
        assert!(signals.context.is_none());
        assert!(signals.resolved_context().validate().is_ok());
        assert_eq!(signals.sensors.temperature, 35.0);
    }
}
