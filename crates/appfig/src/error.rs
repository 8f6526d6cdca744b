use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallerError {
    // Package/application errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Block location errors
    #[error("Config block not found: {marker}")]
    BlockNotFound { marker: String },

    // composer.json metadata errors
    #[error("Failed to parse composer.json: {0}")]
    JsonParse(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InstallerError>;
