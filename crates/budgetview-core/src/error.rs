//! Error types for budgetview-core
//!
//! `SourceError` is what a transaction source reports; its text is shown
//! verbatim in the table body. `CoreError` covers everything else the view
//! can reject: bad host input, bad configuration, a stopped runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Envelope not found
    EnvelopeNotFound,
    /// Transaction not found
    TransactionNotFound,
    /// Unknown column name
    UnknownColumn,
    /// Filter form input could not be parsed
    InvalidFilter,
    /// Page size out of range
    InvalidPageSize,
    /// Transaction source failure
    SourceError,
    /// Configuration error
    ConfigError,
    /// View runtime no longer running
    RuntimeStopped,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::EnvelopeNotFound => write!(f, "ENVELOPE_NOT_FOUND"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::UnknownColumn => write!(f, "UNKNOWN_COLUMN"),
            ErrorCode::InvalidFilter => write!(f, "INVALID_FILTER"),
            ErrorCode::InvalidPageSize => write!(f, "INVALID_PAGE_SIZE"),
            ErrorCode::SourceError => write!(f, "SOURCE_ERROR"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::RuntimeStopped => write!(f, "RUNTIME_STOPPED"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            suggestions: vec![],
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Failure reported by a transaction source.
///
/// `Display` is the text shown to the user, so `Rejected` prints its message
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("{message}")]
    Rejected { message: String },

    #[error("Envelope not found: {envelope}")]
    EnvelopeNotFound { envelope: String },

    #[error("Source unavailable: {message}")]
    Unavailable { message: String },
}

impl SourceError {
    pub fn rejected(message: impl Into<String>) -> Self {
        SourceError::Rejected {
            message: message.into(),
        }
    }
}

/// Main error type for budgetview-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Envelope not found: {name}")]
    EnvelopeNotFound { name: String },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("Invalid page size: {size}")]
    InvalidPageSize { size: usize },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("View runtime has stopped")]
    RuntimeStopped,
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::EnvelopeNotFound { .. } => ErrorCode::EnvelopeNotFound,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::UnknownColumn { .. } => ErrorCode::UnknownColumn,
            CoreError::InvalidFilter { .. } => ErrorCode::InvalidFilter,
            CoreError::InvalidPageSize { .. } => ErrorCode::InvalidPageSize,
            CoreError::Source(_) => ErrorCode::SourceError,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::RuntimeStopped => ErrorCode::RuntimeStopped,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::EnvelopeNotFound { .. } => ErrorSeverity::Info,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::UnknownColumn { .. } => ErrorSeverity::Warning,
            CoreError::InvalidFilter { .. } => ErrorSeverity::Warning,
            CoreError::InvalidPageSize { .. } => ErrorSeverity::Warning,
            CoreError::Source(_) => ErrorSeverity::Error,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::RuntimeStopped => ErrorSeverity::Critical,
        }
    }

    /// Whether the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::UnknownColumn { .. }
                | CoreError::InvalidFilter { .. }
                | CoreError::InvalidPageSize { .. }
        )
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::EnvelopeNotFound { name } => {
                details = details.with_suggestion(format!(
                    "Check if the envelope '{}' exists for this user.",
                    name
                ));
                details = details
                    .with_suggestion("Use the /api/envelopes endpoint to list envelopes.".to_string());
            }
            CoreError::UnknownColumn { .. } => {
                details = details.with_suggestion(
                    "Valid columns: date, amount, type, categories, currency, description.".to_string(),
                );
            }
            CoreError::InvalidFilter { .. } => {
                details = details
                    .with_suggestion("Dates use the YYYY-MM-DD format.".to_string())
                    .with_suggestion("Separate categories with commas.".to_string());
            }
            CoreError::InvalidPageSize { .. } => {
                details =
                    details.with_suggestion("Page size must be greater than 0.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Envelope the view was showing
    pub envelope: Option<String>,
    /// Request generation, for fetch failures
    pub generation: Option<u64>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            envelope: None,
            generation: None,
        }
    }

    pub fn with_envelope(mut self, envelope: Option<String>) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "budgetview::error",
            "ERROR [{}] {} - Operation: {} - Envelope: {:?} - Generation: {:?}",
            error.code(),
            error.to_details(),
            context.operation,
            context.envelope,
            context.generation
        );
    }
}

// ==================== Tests ====================
