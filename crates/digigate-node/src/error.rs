//! Error types for the node.

use digigate_transport::RegistryError;

/// Errors raised while configuring or running the node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
