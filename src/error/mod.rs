use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Signing input errors
    #[error("Invalid socket id: {0}")]
    InvalidSocketId(String),

    #[error("Channel name invalid: {0}")]
    InvalidChannelName(String),

    #[error("Invalid presence member data: {0}")]
    InvalidMemberData(String),

    #[error("Encryption master key is required for encrypted channel {0}")]
    EncryptionKeyMissing(String),

    // Configuration errors
    #[error("Missing credentials: {}", .0.join(", "))]
    ConfigurationMissing(Vec<&'static str>),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    // JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors raised by the signer because its inputs were rejected, as opposed
    /// to the signer itself misbehaving.
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidSocketId(_)
                | Error::InvalidChannelName(_)
                | Error::InvalidMemberData(_)
                | Error::EncryptionKeyMissing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
