//! Error types for popcorn

use thiserror::Error;

/// Error codes, one per failure class the core distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Catalog errors
    NetworkError,
    NotFound,
    Cancelled,

    // Watch-list errors
    ParseError,
    PersistenceCorrupt,

    // User errors
    InvalidRating,
    NotRated,
    NoDetail,
    InvalidConfig,

    // System errors
    FileError,
}

/// Main error type for popcorn
#[derive(Error, Debug)]
pub enum PopcornError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    NotFound(String),

    /// Superseded request. Absorbed by the controllers, never shown.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Failed to parse {0}")]
    Parse(String),

    #[error("Stored watch-list is unreadable: {0}")]
    PersistenceCorrupt(String),

    #[error("Rating must be between 1 and {max}, got {got}")]
    InvalidRating { got: u8, max: u8 },

    #[error("Rate the movie before adding it to the list")]
    NotRated,

    #[error("No movie detail is loaded")]
    NoDetail,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PopcornError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Network(_) => ErrorCode::NetworkError,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Parse(_) => ErrorCode::ParseError,
            Self::PersistenceCorrupt(_) => ErrorCode::PersistenceCorrupt,
            Self::InvalidRating { .. } => ErrorCode::InvalidRating,
            Self::NotRated => ErrorCode::NotRated,
            Self::NoDetail => ErrorCode::NoDetail,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::File(_) => ErrorCode::FileError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Json(_) => ErrorCode::PersistenceCorrupt,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, PopcornError>;
