use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlabError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: u64, available: u64 },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Backend returned code {code}: {message}")]
    Backend { code: i64, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation requires approval: {0}")]
    ApprovalRequired(String),
}

impl GlabError {
    /// Stable machine-readable code for JSON error output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Http(_) => "http",
            Self::Backend { .. } => "backend",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::ApprovalRequired(_) => "approval_required",
        }
    }

    /// Whether a save that failed with this error is worth retrying after eviction.
    #[must_use]
    pub const fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, GlabError>;
