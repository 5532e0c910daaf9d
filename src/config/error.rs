use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Encode(#[source] serde_yaml::Error),

    #[error("Failed to write config file '{}': {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("{0}")]
    Validation(String),

    #[error("'{name}' already exists (pass --update to replace it)")]
    NameConflict { name: String },

    #[error("Gave up choosing a free name after {attempts} attempts")]
    RenameLimitExceeded { attempts: usize },

    #[error("No providers configured. Run `aicraft config provider` first.")]
    NotConfigured,

    #[error("Agent '{0}' not found. Run `aicraft config agent` first.")]
    UnknownAgent(String),

    #[error("Configuration '{0}' not found. Run `aicraft config provider` first.")]
    UnknownProviderConfig(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Cancelled")]
    Cancelled,
}
