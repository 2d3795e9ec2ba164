//! CLI commands for hive-advisor.
//!
//! - **Engine commands**: recommend, state
//! - **Utility commands**: catalog, config

pub mod input;

// Engine commands
pub mod recommend;
pub mod state;

// Utility commands
pub mod catalog;
pub mod config_cmd;

pub use catalog::CatalogCommand;
pub use config_cmd::ConfigCommand;
pub use input::InputSource;
pub use recommend::RecommendCommand;
pub use state::StateCommand;
