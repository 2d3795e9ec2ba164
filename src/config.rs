//! Configuration loading for hive-advisor.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.hive-advisor/config.toml`)
//! 3. User config (`~/.hive-advisor/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. Without a policy artifact the engine runs
//! in rule-only mode.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AdvisorError, FailOpen, Result};

/// Name of the per-user and per-project configuration directory.
pub const ADVISOR_DIR_NAME: &str = ".hive-advisor";

/// File name of the policy artifact inside the advisor home.
pub const DEFAULT_POLICY_FILE: &str = "policy.json";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Learned-policy configuration.
    pub policy: PolicyConfig,
    /// Harvest sanity-check thresholds.
    pub harvest: HarvestConfig,
    /// State vector layout expected by the policy.
    pub layout: LayoutConfig,
}

/// Learned-policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Path to the policy artifact. Defaults to `<advisor_home>/policy.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    /// Sample from the action distribution instead of taking the argmax.
    pub stochastic: bool,
    /// Seed for stochastic sampling. Unseeded sampling uses the thread RNG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            stochastic: true,
            seed: None,
        }
    }
}

impl PolicyConfig {
    /// The artifact path to load, falling back to the advisor home.
    pub fn resolved_model_path(&self) -> Option<PathBuf> {
        self.model_path
            .clone()
            .or_else(|| advisor_home().map(|h| h.join(DEFAULT_POLICY_FILE)))
    }
}

/// Harvest sanity-check thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarvestConfig {
    /// Minimum hive weight (kg) before a harvest is allowed.
    pub weight_threshold: f64,
    /// Minimum honey level (0-1) before a harvest is allowed.
    pub honey_level_threshold: f64,
}

impl HarvestConfig {
    /// Weight threshold must be finite and positive.
    pub fn is_valid_weight_threshold(value: f64) -> bool {
        value.is_finite() && value > 0.0
    }

    /// Honey level threshold must lie in [0.0, 1.0].
    pub fn is_valid_honey_level_threshold(value: f64) -> bool {
        value.is_finite() && (0.0..=1.0).contains(&value)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            weight_threshold: 47.0,
            honey_level_threshold: 0.65,
        }
    }
}

/// State vector layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of hive slots the policy observes. The real hive is broadcast
    /// into every slot.
    pub hive_count: usize,
}

/// Minimum valid hive_count.
pub const MIN_HIVE_COUNT: usize = 1;

/// Maximum valid hive_count.
pub const MAX_HIVE_COUNT: usize = 64;

impl LayoutConfig {
    pub fn is_valid_hive_count(value: usize) -> bool {
        (MIN_HIVE_COUNT..=MAX_HIVE_COUNT).contains(&value)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { hive_count: 3 }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.hive-advisor/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = advisor_home()?;
        Self::load_existing(&home.join("config.toml"))
    }

    /// Load project config from `.hive-advisor/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = cwd.join(ADVISOR_DIR_NAME).join("config.toml");
        Self::load_existing(&config_path)
    }

    /// Load a config file if it exists. An unreadable or invalid file is
    /// warned about and skipped.
    fn load_existing(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_default(&format!("loading {}", path.display()))
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| AdvisorError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| AdvisorError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // HIVE_ADVISOR_MODEL_PATH
        if let Ok(val) = env::var("HIVE_ADVISOR_MODEL_PATH") {
            if val.is_empty() {
                tracing::warn!("HIVE_ADVISOR_MODEL_PATH is empty, ignoring");
            } else {
                self.policy.model_path = Some(PathBuf::from(val));
            }
        }

        // HIVE_ADVISOR_STOCHASTIC
        if let Ok(val) = env::var("HIVE_ADVISOR_STOCHASTIC") {
            match val.as_str() {
                "true" | "1" => self.policy.stochastic = true,
                "false" | "0" => self.policy.stochastic = false,
                _ => tracing::warn!(
                    "Invalid HIVE_ADVISOR_STOCHASTIC value '{}'. \
                    Expected true/false. Using '{}'.",
                    val,
                    self.policy.stochastic
                ),
            }
        }

        // HIVE_ADVISOR_SEED
        if let Ok(val) = env::var("HIVE_ADVISOR_SEED") {
            match val.parse::<u64>() {
                Ok(n) => self.policy.seed = Some(n),
                Err(_) => tracing::warn!(
                    "Invalid HIVE_ADVISOR_SEED value '{}'. \
                    Expected an unsigned integer. Ignoring.",
                    val
                ),
            }
        }

        // HIVE_ADVISOR_HARVEST_WEIGHT
        if let Ok(val) = env::var("HIVE_ADVISOR_HARVEST_WEIGHT") {
            match val.parse::<f64>() {
                Ok(n) if HarvestConfig::is_valid_weight_threshold(n) => {
                    self.harvest.weight_threshold = n;
                }
                _ => tracing::warn!(
                    "Invalid HIVE_ADVISOR_HARVEST_WEIGHT value '{}'. \
                    Expected a positive number. Using '{}'.",
                    val,
                    self.harvest.weight_threshold
                ),
            }
        }

        // HIVE_ADVISOR_HARVEST_HONEY_LEVEL
        if let Ok(val) = env::var("HIVE_ADVISOR_HARVEST_HONEY_LEVEL") {
            match val.parse::<f64>() {
                Ok(n) if HarvestConfig::is_valid_honey_level_threshold(n) => {
                    self.harvest.honey_level_threshold = n;
                }
                _ => tracing::warn!(
                    "Invalid HIVE_ADVISOR_HARVEST_HONEY_LEVEL value '{}'. \
                    Must be in range [0.0, 1.0]. Using '{}'.",
                    val,
                    self.harvest.honey_level_threshold
                ),
            }
        }

        // HIVE_ADVISOR_HIVE_COUNT
        if let Ok(val) = env::var("HIVE_ADVISOR_HIVE_COUNT") {
            match val.parse::<usize>() {
                Ok(n) if LayoutConfig::is_valid_hive_count(n) => self.layout.hive_count = n,
                _ => tracing::warn!(
                    "Invalid HIVE_ADVISOR_HIVE_COUNT value '{}'. \
                    Must be {}-{}. Using '{}'.",
                    val,
                    MIN_HIVE_COUNT,
                    MAX_HIVE_COUNT,
                    self.layout.hive_count
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence field by field. As with any
    /// default-comparison merge, a layer cannot reset a value back to its
    /// default once a lower layer changed it.
    fn merge(mut self, other: Config) -> Self {
        let default_policy = PolicyConfig::default();
        if other.policy.model_path.is_some() {
            self.policy.model_path = other.policy.model_path;
        }
        if other.policy.stochastic != default_policy.stochastic {
            self.policy.stochastic = other.policy.stochastic;
        }
        if other.policy.seed.is_some() {
            self.policy.seed = other.policy.seed;
        }

        let default_harvest = HarvestConfig::default();
        if other.harvest.weight_threshold != default_harvest.weight_threshold
            && HarvestConfig::is_valid_weight_threshold(other.harvest.weight_threshold)
        {
            self.harvest.weight_threshold = other.harvest.weight_threshold;
        }
        if other.harvest.honey_level_threshold != default_harvest.honey_level_threshold
            && HarvestConfig::is_valid_honey_level_threshold(other.harvest.honey_level_threshold)
        {
            self.harvest.honey_level_threshold = other.harvest.honey_level_threshold;
        }

        if other.layout.hive_count != LayoutConfig::default().hive_count
            && LayoutConfig::is_valid_hive_count(other.layout.hive_count)
        {
            self.layout.hive_count = other.layout.hive_count;
        }

        self
    }

    /// Save configuration to `.hive-advisor/config.toml` in the given directory.
    ///
    /// Writes to a temp file first, then renames over the target.
    pub fn save_project(&self, cwd: &Path) -> Result<PathBuf> {
        let dir = cwd.join(ADVISOR_DIR_NAME);

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| AdvisorError::storage(&dir, e))?;
        }

        let config_path = dir.join("config.toml");
        let content =
            toml::to_string_pretty(self).map_err(|e| AdvisorError::config(e.to_string()))?;

        let temp_path = dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| AdvisorError::storage(&temp_path, e))?;

        let file = fs::File::open(&temp_path).map_err(|e| AdvisorError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| AdvisorError::storage(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &config_path)
            .map_err(|e| AdvisorError::storage(&config_path, e))?;

        Ok(config_path)
    }
}

/// Get the advisor home directory.
///
/// Checks `HIVE_ADVISOR_HOME` first, then falls back to `~/.hive-advisor`.
/// An empty `HIVE_ADVISOR_HOME` is ignored.
pub fn advisor_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("HIVE_ADVISOR_HOME") {
        if home.is_empty() {
            tracing::warn!("HIVE_ADVISOR_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("HIVE_ADVISOR_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(ADVISOR_DIR_NAME))
}
