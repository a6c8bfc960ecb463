//! §4.3/§7 executor error taxonomy, grounded in the teacher's
//! `action-primitives::errors::ActionError` (clonable thiserror enum with an
//! `is_retryable`/`severity` pair).

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ExecutorError {
    #[error("operation timed out: {0}")]
    Timeout(String),
    #[error("element not found: {0}")]
    NotFound(String),
    #[error("element not enabled: {0}")]
    NotEnabled(String),
    #[error("assertion mismatch: {0}")]
    AssertionMismatch(String),
    #[error("missing capability: {0}")]
    MissingCapability(String),
    #[error("bad argument: {0}")]
    BadArgument(String),
    #[error("browser error: {0}")]
    BrowserError(String),
}

impl ExecutorError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExecutorError::Timeout(_) | ExecutorError::NotFound(_) | ExecutorError::BrowserError(_)
        )
    }

    /// 0 = low, 3 = critical.
    pub fn severity(&self) -> u8 {
        match self {
            ExecutorError::BrowserError(_) => 2,
            ExecutorError::Timeout(_) | ExecutorError::NotFound(_) | ExecutorError::NotEnabled(_) => 1,
            ExecutorError::AssertionMismatch(_) | ExecutorError::MissingCapability(_) | ExecutorError::BadArgument(_) => 0,
        }
    }
}
