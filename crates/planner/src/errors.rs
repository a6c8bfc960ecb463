//! §4.4/§7 planner error taxonomy.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum PlannerError {
    #[error("planner call timed out after 3 attempts")]
    Timeout,
    #[error("malformed plan after {attempts} attempt(s): {detail}")]
    Malformed { attempts: u32, detail: String },
    #[error("LLM call failed: {0}")]
    LlmFailed(String),
}
