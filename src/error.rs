//! Unified error types for hive-advisor with fail-open philosophy.
//!
//! The learned-policy subsystem never blocks a recommendation. Artifact and
//! inference errors are logged and recovered locally; only malformed input
//! (`Shape`) is ever surfaced to the caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for hive-advisor operations.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Policy artifact missing, corrupt, or shaped for a different layout.
    #[error("policy unavailable: {message}")]
    PolicyUnavailable { message: String },

    /// A single forward pass failed.
    #[error("inference failure: {message}")]
    InferenceFailure { message: String },

    /// Input data cannot be turned into a state vector.
    #[error("malformed input: {message}")]
    Shape { message: String },

    /// I/O errors reading artifacts, configs or request files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for hive-advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;

impl AdvisorError {
    /// Create a policy-unavailable error.
    pub fn policy_unavailable(message: impl Into<String>) -> Self {
        Self::PolicyUnavailable {
            message: message.into(),
        }
    }

    /// Create an inference failure.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::InferenceFailure {
            message: message.into(),
        }
    }

    /// Create a shape error.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error may reach the caller of
    /// [`RecommendationEngine::recommend`](crate::engine::RecommendationEngine::recommend).
    ///
    /// Everything except malformed input is recovered inside the engine.
    pub fn is_caller_visible(&self) -> bool {
        matches!(self, Self::Shape { .. })
    }
}

impl From<io::Error> for AdvisorError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and return a safe default instead of propagating.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }
}

/// Exit codes for the hive-advisor CLI.
pub mod exit_codes {
    /// A recommendation (or other requested output) was produced.
    pub const SUCCESS: i32 = 0;

    /// The request was rejected as malformed.
    pub const REJECTED: i32 = 2;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
