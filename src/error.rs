//! Error Types
//!
//! One enum per layer. Gateway failures are classified transport errors;
//! mutation errors are what the UI sees after a rollback.

use thiserror::Error;

use crate::domain::ResourceKind;

/// Failures from the request gateway
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("server rejected request ({status}): {message}")]
    ServerRejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// 401 and 403 mean the bearer token is no longer accepted
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, GatewayError::ServerRejected { status: 401 | 403, .. })
    }
}

/// Client-side pre-flight failures; the store is never touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} requires a {field} reference")]
    MissingReference { kind: ResourceKind, field: &'static str },

    #[error("{kind} requires {field}")]
    MissingField { kind: ResourceKind, field: &'static str },

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("{kind} #{id} not found")]
    NotFound { kind: ResourceKind, id: i64 },

    #[error("{kind} #{id} is still being created")]
    NotPersisted { kind: ResourceKind, id: i64 },
}

/// Error surfaced by a mutation controller after rollback
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("network error: {0}")]
    Network(String),

    #[error("{message}")]
    ServerRejected { status: u16, message: String },

    #[error("session expired: {0}")]
    AuthExpired(String),

    #[error("unexpected server response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MutationError {
    /// Transient failures the caller may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, MutationError::Network(_))
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, MutationError::AuthExpired(_))
    }

    /// Text shown to the user. Malformed responses read like a server rejection.
    pub fn user_message(&self) -> String {
        match self {
            MutationError::MalformedResponse(_) => {
                "The server returned an unexpected response".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<GatewayError> for MutationError {
    fn from(e: GatewayError) -> Self {
        if e.is_auth_expired() {
            let message = match &e {
                GatewayError::ServerRejected { message, .. } => message.clone(),
                _ => e.to_string(),
            };
            return MutationError::AuthExpired(message);
        }
        match e {
            GatewayError::Timeout { .. } => MutationError::Network(e.to_string()),
            GatewayError::NetworkUnreachable(msg) => MutationError::Network(msg),
            GatewayError::ServerRejected { status, message } => {
                MutationError::ServerRejected { status, message }
            }
            GatewayError::MalformedResponse(msg) => MutationError::MalformedResponse(msg),
        }
    }
}

/// Entity store invariant violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("duplicate id {0}")]
    DuplicateId(i64),

    #[error("id {0} not in store")]
    Missing(i64),
}

/// Configuration file problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
