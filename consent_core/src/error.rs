use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsentError>;

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure reported by a [`ConsentService`](crate::service::ConsentService) call.
///
/// Remote errors that carry a structured body keep it verbatim so it can be
/// surfaced to the caller as `detail`. Everything else is opaque.
#[derive(Debug, Clone, Error)]
pub enum RemoteFailure {
    #[error("Remote service returned an error payload: {0}")]
    WithPayload(Value),

    #[error("Remote service call failed: {0}")]
    Opaque(String),
}

impl RemoteFailure {
    /// The remote payload, if the failure carried one
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::WithPayload(payload) => Some(payload),
            Self::Opaque(_) => None,
        }
    }

    pub fn into_payload(self) -> Option<Value> {
        match self {
            Self::WithPayload(payload) => Some(payload),
            Self::Opaque(_) => None,
        }
    }
}

impl From<String> for RemoteFailure {
    fn from(s: String) -> Self {
        RemoteFailure::Opaque(s)
    }
}

impl From<&str> for RemoteFailure {
    fn from(s: &str) -> Self {
        RemoteFailure::Opaque(s.to_string())
    }
}
