//! Error types for QuickJS operations

use thiserror::Error;

/// Errors that can occur while driving the engine
#[derive(Error, Debug)]
pub enum QjsError {
    /// Runtime allocation failed
    #[error("Failed to create runtime")]
    RuntimeCreation,

    /// Context allocation failed
    #[error("Failed to create context: {message}")]
    ContextCreation { message: String },

    /// A script raised an exception
    #[error("{error_type}: {message}")]
    Script {
        error_type: String,
        message: String,
        stack: Option<String>,
    },

    /// A value could not be converted to a UTF-8 string
    #[error("String encoding error: {0}")]
    StringEncoding(String),

    /// Source text contained an interior NUL byte
    #[error("Source text is not a valid C string")]
    SourceEncoding,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QjsError {
    pub fn script(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        QjsError::Script {
            error_type: error_type.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn script_with_stack(
        error_type: impl Into<String>,
        message: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        QjsError::Script {
            error_type: error_type.into(),
            message: message.into(),
            stack: Some(stack.into()),
        }
    }

    pub fn context_creation(message: impl Into<String>) -> Self {
        QjsError::ContextCreation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        QjsError::Internal(message.into())
    }

    /// True when the error came from script execution
    pub fn is_script_error(&self) -> bool {
        matches!(self, QjsError::Script { .. })
    }

    /// Stack trace captured from the exception, when present
    pub fn stack_trace(&self) -> Option<&str> {
        match self {
            QjsError::Script { stack, .. } => stack.as_deref(),
            _ => None,
        }
    }

    /// JavaScript error class name (TypeError, ReferenceError, ...)
    pub fn error_type(&self) -> Option<&str> {
        match self {
            QjsError::Script { error_type, .. } => Some(error_type),
            _ => None,
        }
    }
}

pub type QjsResult<T> = Result<T, QjsError>;
