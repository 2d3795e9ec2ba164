//! Learned decision policy.
//!
//! - [`traits`]: the [`Policy`] trait implemented by inference backends
//! - [`network`]: dense network loaded from a JSON artifact
//! - [`adapter`]: fail-open wrapper that selects and decodes actions

pub mod adapter;
pub mod network;
pub mod traits;

pub use adapter::{decode_action_index, InferenceMode, PolicyAdapter, PolicyOutcome};
pub use network::{Activation, DenseLayer, PolicyNetwork, NETWORK_FORMAT_VERSION};
pub use traits::Policy;
