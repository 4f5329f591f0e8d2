use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Transport,
    Status,
    Timeout,
    Parse,
}

/// Failure of a single communes fetch. Never retried by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("provider answered with status {status}")]
    Status { status: u16 },
    #[error("request timed out")]
    Timeout,
    #[error("malformed communes payload: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Status { .. } => FetchErrorKind::Status,
            FetchError::Timeout => FetchErrorKind::Timeout,
            FetchError::Parse(_) => FetchErrorKind::Parse,
        }
    }

    pub fn is_parse(&self) -> bool {
        self.kind() == FetchErrorKind::Parse
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        FetchError::Parse(value.to_string())
    }
}
