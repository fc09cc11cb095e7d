/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the connection failed before the handshake completed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// The server answered the upgrade request with a non-101 status.
    #[error("handshake rejected with HTTP status {0}")]
    Rejected(u16),

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}

impl TransportError {
    /// Returns the HTTP status if the server refused the upgrade.
    pub fn rejection_status(&self) -> Option<u16> {
        match self {
            Self::Rejected(status) => Some(*status),
            _ => None,
        }
    }
}
