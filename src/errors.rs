use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Input or output failed a declared schema before/after a handler ran.
    #[error("validation failed: {message}")]
    Validation { code: &'static str, message: String },
    /// Unexpected failure inside a handler or the protocol plumbing.
    #[error("internal error: {message}")]
    Internal { code: &'static str, message: String },
}

impl AppError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
        }
    }
}
