use thiserror::Error;

/// Why a single options fetch produced no list.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered, but not with a 2xx status.
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("api key cannot be sent as an http header value")]
    InvalidKeyHeader,
    #[error("request failed: {source}")]
    Transport { source: anyhow::Error },
    #[error("response body is not a list of strings: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn transport(source: impl Into<anyhow::Error>) -> Self {
        Self::Transport {
            source: source.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// The option list could not be read or rewritten.
#[derive(Debug, Error)]
#[error("option list unavailable: {0}")]
pub struct TargetError(pub String);

impl TargetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
