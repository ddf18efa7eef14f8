use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("secret `{key}` is missing")]
    MissingCredential { key: String },

    #[error("cannot read secrets: {0}")]
    Secrets(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("model discovery failed: {0}")]
    Discovery(String),

    #[error("no available model supports content generation")]
    NoGenerationModel,

    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("prompt blocked: {0}")]
    Blocked(String),
}

impl ChatError {
    pub fn secrets(msg: impl Into<String>) -> Self {
        Self::Secrets(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Setup errors disable the whole session; everything else only fails
    /// the current submission.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. }
                | Self::Secrets(_)
                | Self::InvalidConfig(_)
                | Self::Discovery(_)
                | Self::NoGenerationModel
        )
    }
}
