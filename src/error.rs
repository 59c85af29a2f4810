use thiserror::Error;

/// Failures that cross a component boundary.
///
/// "Nothing parsed" and "catalog had no match" are not errors: the parser and
/// the catalog return `None` for those.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Missing or unusable configuration. Fatal until the environment is fixed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The AI provider rejected the credential.
    #[error("Invalid API Key. Please check your configuration.")]
    InvalidCredential,

    /// Any other failure of the identification call.
    #[error("Failed to get response from AI model.")]
    ModelRequest,

    /// Network/HTTP failure outside the identification call.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Image error: {0}")]
    Image(String),

    /// A new identification was started while one is still loading.
    #[error("An identification is already in progress.")]
    Busy,
}

pub type Result<T> = std::result::Result<T, ScoutError>;
