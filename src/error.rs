//! Error types for leadbot.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Sales notification errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Email notifications are not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP send failed: {0}")]
    Send(String),

    #[error("SendGrid API send failed: {0}")]
    Api(String),
}

/// CV upload errors. Messages are shown to the visitor verbatim.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file selected")]
    NoFile,

    #[error("Only PDF files allowed")]
    NotPdf,

    #[error("File size exceeds 5 MB")]
    TooLarge { size: usize },

    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// Collaborator call failures, as seen by the dialog engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The collaborator answered but reported failure (`ok: false`).
    #[error("{0}")]
    Rejected(String),

    /// The transport failed before a usable answer arrived.
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<UploadError> for BackendError {
    fn from(e: UploadError) -> Self {
        Self::Rejected(e.to_string())
    }
}
