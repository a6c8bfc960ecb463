use thiserror::Error;

/// §4.2: "If all extraction paths fail: return an error that the engine
/// treats as fatal."
#[derive(Debug, Error, Clone)]
pub enum ObserveError {
    #[error("failed to read page content: {0}")]
    ContentUnavailable(String),
    #[error("content extraction timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("browser is closed")]
    BrowserClosed,
}
