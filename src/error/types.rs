// src/error/types.rs
use crate::domain::{DomainError, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Player error: {0}")]
    Player(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// True for failures that came back from the hosted backend or the
    /// network in between.
    pub fn is_remote(&self) -> bool {
        matches!(self, AppError::Http(_) | AppError::Backend { .. })
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Other(format!("UUID error: {}", err))
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Other(format!("Date parse error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
