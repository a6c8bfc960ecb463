//! §7 top-level `EngineError`, composing the lower crates' error enums plus
//! the engine's own fatal conditions.

use thiserror::Error;
use webagent_page_observer::ObserveError;
use webagent_planner::PlannerError;

#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("browser or page is closed")]
    BrowserClosed,
    #[error("page observation failed: {0}")]
    Observe(#[from] ObserveError),
    #[error("planner exhausted its retries: {0}")]
    PlannerExhausted(#[from] PlannerError),
    #[error("failed to navigate to start url: {0}")]
    NavigationFailed(String),
}
