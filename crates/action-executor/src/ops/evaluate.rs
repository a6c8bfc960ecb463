//! §4.3 `evaluate`: run arbitrary JS, stringify the result.

use webagent_core_types::Step;

use crate::errors::ExecutorError;
use crate::ops::OpContext;

pub async fn evaluate(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.value.trim().is_empty() {
        return Err(ExecutorError::BadArgument("evaluate requires a script in value".into()));
    }
    let result = ctx
        .browser
        .evaluate(&step.value)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    Ok(match result {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
