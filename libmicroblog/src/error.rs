//! Error types for Microblog

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MicroblogError>;

#[derive(Error, Debug)]
pub enum MicroblogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl MicroblogError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            MicroblogError::Unauthorized(_) => 2,
            MicroblogError::InvalidInput(_) => 3,
            MicroblogError::Conflict(_) => 3,
            MicroblogError::NotFound(_) => 4,
            MicroblogError::Config(_) => 1,
            MicroblogError::Database(_) => 1,
            MicroblogError::Notify(_) => 1,
            MicroblogError::Serialization(_) => 1,
        }
    }
}

impl From<sqlx::Error> for MicroblogError {
    fn from(err: sqlx::Error) -> Self {
        MicroblogError::Database(DbError::SqlxError(err))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to render email: {0}")]
    Template(#[from] askama::Error),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Notification queue closed")]
    QueueClosed,
}
