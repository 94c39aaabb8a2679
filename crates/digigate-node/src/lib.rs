//! Node orchestration for the digigate APRS gateway.
//!
//! Loads the station configuration, builds the gateway from it and applies
//! the actions the gateway returns.

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod gateway_init;
pub mod logging;
pub mod transport_log;

pub use config::NodeConfig;
pub use engine::Engine;
pub use error::NodeError;
