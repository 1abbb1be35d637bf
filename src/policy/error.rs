use thiserror::Error;

/// Broad classification of a [`PolicyError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The policy could not be constructed from its configuration
    InvalidConfiguration,
    /// The caller supplied an empty tag list
    EmptyInput,
    /// No tag survived filtering, parsing and constraint checks
    NoMatch,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("invalid order argument provided: '{0}', must be one of: asc, desc")]
    InvalidOrder(String),

    #[error("invalid semver range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },

    #[error("invalid policy choice: {0}")]
    InvalidChoice(String),

    #[error("version list argument cannot be empty")]
    EmptyInput,

    #[error("unable to determine latest version from provided list")]
    NoMatch,
}

impl PolicyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::InvalidOrder(_)
            | PolicyError::InvalidRange { .. }
            | PolicyError::InvalidChoice(_) => ErrorKind::InvalidConfiguration,
            PolicyError::EmptyInput => ErrorKind::EmptyInput,
            PolicyError::NoMatch => ErrorKind::NoMatch,
        }
    }

    pub(crate) fn invalid_range(range: &str, reason: impl Into<String>) -> Self {
        PolicyError::InvalidRange {
            range: range.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}
