use thiserror::Error;

/// Top-level error type for Doorman.
#[derive(Debug, Error)]
pub enum DoormanError {
    /// A runtime setting was rejected by validation. The prior value is kept.
    #[error("invalid value for {setting}: {reason}")]
    ConfigValidation { setting: String, reason: String },

    /// Configuration file error.
    #[error("config error: {0}")]
    Config(String),

    /// Error from the chat channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// The vision collaborator could not describe an avatar.
    #[error("avatar description failed: {0}")]
    DescriptionFailed(String),

    /// A single image-generation attempt failed. `transient` marks
    /// gateway-timeout-class failures eligible for retry.
    #[error("image generation failed: {message}")]
    Generation { message: String, transient: bool },

    /// All image-generation retries were spent.
    #[error("image generation failed after {attempts} attempts: {last_error}")]
    GenerationExhausted { attempts: u32, last_error: String },

    /// A generated artifact could not be downloaded.
    #[error("artifact download failed: {0}")]
    DownloadFailed(String),

    /// A channel send of the final artifact failed.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DoormanError {
    /// Whether this error is a transient failure eligible for retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Generation { transient: true, .. })
    }
}
