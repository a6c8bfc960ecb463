//! §4.3 `respond` and `done`: the two early-terminator operations (§4.1 step 6).
//! `InteractionEngine` intercepts these before dispatch; these functions exist
//! so the executor's match arm stays exhaustive and so tests can exercise
//! them directly.

use webagent_core_types::Step;

use crate::errors::ExecutorError;

pub async fn respond(step: &Step) -> Result<String, ExecutorError> {
    Ok(format!("AGENT_RESPONSE: {}", step.value))
}

pub async fn done(_step: &Step) -> Result<String, ExecutorError> {
    Ok("task marked done".to_string())
}
