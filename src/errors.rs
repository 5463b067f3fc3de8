use thiserror::Error;

/// All errors that can occur in totp.
#[derive(Debug, Error)]
pub enum TotpError {
    // --- Collection errors ---
    #[error("Secret name must not be empty")]
    EmptyName,

    #[error("Secret value must not be empty")]
    EmptyValue,

    #[error("Secret '{0}' not found")]
    NotFound(String),

    #[error("No filename or writer configured for saving the collection")]
    NoSaveTarget,

    #[error("Invalid collection data: {0}")]
    Decode(String),

    // --- Code generation errors ---
    #[error("Invalid secret: {0}")]
    Generator(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- CLI errors ---
    #[error("The name \"{0}\" is reserved for the {0} command")]
    ReservedName(String),

    #[error("Invalid duration '{0}' (use values like 30s, 1m, 1h30m)")]
    InvalidDuration(String),

    #[error("Invalid time '{0}' (use RFC 3339, e.g. 2019-06-23T20:00:00-05:00)")]
    InvalidTime(String),

    #[error("QR code error: {0}")]
    Qr(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("{0}")]
    Usage(String),
}

/// Convenience type alias for totp results.
pub type Result<T> = std::result::Result<T, TotpError>;
