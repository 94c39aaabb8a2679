//! Transport that only logs what would go on the air.
//!
//! The node has no radio drivers of its own; every radio interface is
//! bound to one of these so transmissions are visible in the log.

use digigate_transport::{Transport, TransportError};

/// Logs every frame at trace level and reports success.
#[derive(Debug, Clone)]
pub struct LoggingTransport {
    interface: String,
}

impl LoggingTransport {
    /// Transport logging under the name of `interface`.
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl Transport for LoggingTransport {
    fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        tracing::trace!(
            interface = %self.interface,
            len = frame.len(),
            bytes = %hex::encode(frame),
            "frame to transport"
        );
        Ok(())
    }
}
