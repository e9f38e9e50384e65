use thiserror::Error;

/// Connection-level failures reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection closed by peer")]
    Closed,
    #[error("broken pipe: {0}")]
    BrokenPipe(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("realtime connection is not established")]
    NotConnected,
    #[error("realtime handshake was rejected")]
    HandshakeRejected,
    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The remote call completed but answered `ok=false`.
    #[error("{method} answered ok=false: {reason}")]
    Upstream { method: String, reason: String },
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("payload does not match {shape}: {details}")]
    Schema { shape: &'static str, details: String },
}

impl GatewayError {
    pub fn schema(shape: &'static str, details: impl Into<String>) -> Self {
        Self::Schema {
            shape,
            details: details.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: &str) -> Self {
        Self::NotFound {
            kind,
            key: key.to_owned(),
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
