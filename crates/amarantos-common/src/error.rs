use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmarantosError {
    /// Malformed Choice or EffectRecord. The offending choice is rejected,
    /// the rest of the run proceeds.
    #[error("Validation error in '{choice}': {reason}")]
    Validation { choice: String, reason: String },

    /// Input outside the domain of an outcome transform (e.g. ratio <= 0).
    #[error("Domain error: {0}")]
    Domain(String),

    /// Invalid run options. Fatal for the whole run.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AmarantosError {
    pub fn validation(choice: impl Into<String>, reason: impl Into<String>) -> Self {
        AmarantosError::Validation {
            choice: choice.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AmarantosError>;
