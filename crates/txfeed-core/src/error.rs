//! Error types for txfeed-core
//!
//! Every transport failure of the three caches is reported as a
//! [`FetchError`]. The cache keeps a copy in its state so the presentation
//! layer can render it, and the failing call returns it wrapped in
//! [`CoreError::FetchFailed`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A transport request failed
    FetchFailed,
    /// A selection that cannot be fetched (empty employee id)
    InvalidSelection,
    /// The cache stopped publishing state
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::FetchFailed => write!(f, "FETCH_FAILED"),
            ErrorCode::InvalidSelection => write!(f, "INVALID_SELECTION"),
            ErrorCode::Internal => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - the view keeps its previous data
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - the controller cannot make progress
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Which transport call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOperation {
    Employees,
    TransactionsPage,
    EmployeeTransactions,
}

impl std::fmt::Display for FetchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOperation::Employees => write!(f, "fetch_employees"),
            FetchOperation::TransactionsPage => write!(f, "fetch_transactions_page"),
            FetchOperation::EmployeeTransactions => write!(f, "fetch_transactions_for_employee"),
        }
    }
}

/// A failed fetch, as recorded in a cache's state
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{operation} failed: {message}")]
pub struct FetchError {
    pub operation: FetchOperation,
    pub message: String,
}

impl FetchError {
    pub fn new(operation: FetchOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Detailed error information for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for txfeed-core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    FetchFailed(#[from] FetchError),

    #[error("Invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::FetchFailed(_) => ErrorCode::FetchFailed,
            CoreError::InvalidSelection { .. } => ErrorCode::InvalidSelection,
            CoreError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::FetchFailed(_) => ErrorSeverity::Warning,
            CoreError::InvalidSelection { .. } => ErrorSeverity::Error,
            CoreError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::FetchFailed(fetch) => {
                details = details
                    .with_detail(serde_json::json!({ "operation": fetch.operation }))
                    .with_suggestion("Previously loaded transactions are still shown.".to_string())
                    .with_suggestion("Select the filter again to retry.".to_string());
            }
            CoreError::InvalidSelection { .. } => {
                details = details.with_suggestion(
                    "Pick a concrete employee or \"All Employees\".".to_string(),
                );
            }
            CoreError::Internal { .. } => {}
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
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Warning => log::warn!(
                target: "txfeed::error",
                "[{}] {} - Operation: {} - Context: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            _ => log::error!(
                target: "txfeed::error",
                "[{}] {} - Operation: {} - Context: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
        }
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "txfeed::error",
            "{} - Operation: {} - Context: {}",
            message,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================
