//! Transport error types

use thiserror::Error;

/// Transport error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_destination(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidDestination, message)
    }

    pub fn not_registered(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NotRegistered, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Rejected, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn is_caller_error(&self) -> bool {
        self.kind.is_caller_error()
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Destination is not a usable address - caller must fix input
    InvalidDestination,
    /// Destination is well formed but unknown to the network - caller must fix input
    NotRegistered,
    /// Bridge unreachable or timed out - retryable
    Network,
    /// Throttled by the network (429) - retryable with backoff
    RateLimit,
    /// Bridge failed (5xx) - retryable
    ServerError,
    /// Bridge refused the request (4xx)
    Rejected,
    /// Unknown error
    Unknown,
}

impl TransportErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }

    pub fn is_caller_error(self) -> bool {
        matches!(self, Self::InvalidDestination | Self::NotRegistered)
    }
}
