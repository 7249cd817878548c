//! Error types for budgetview-store

use budgetview_core::{CoreError, SourceError};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Envelope not found: {name}")]
    EnvelopeNotFound { name: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for SourceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EnvelopeNotFound { name } => SourceError::EnvelopeNotFound { envelope: name },
            other => SourceError::Unavailable {
                message: other.to_string(),
            },
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EnvelopeNotFound { name } => CoreError::EnvelopeNotFound { name },
            StoreError::TransactionNotFound { id } => CoreError::TransactionNotFound { id },
            other => CoreError::Source(other.into()),
        }
    }
}
