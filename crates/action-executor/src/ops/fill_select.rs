//! §4.3 `fill` and `select`.

use std::time::Duration;

use webagent_core_types::{Step, WaitState};

use crate::errors::ExecutorError;
use crate::ops::OpContext;

const VISIBLE_WAIT: Duration = Duration::from_secs(10);
const FILL_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn fill(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument("fill requires a selector".into()));
    }
    let locator = ctx.browser.locator(&step.selector);
    locator
        .wait_for(WaitState::Visible, VISIBLE_WAIT)
        .await
        .map_err(to_wait_error)?;
    if !locator.is_enabled().await.map_err(|e| ExecutorError::BrowserError(e.to_string()))? {
        return Err(ExecutorError::NotEnabled(step.selector.clone()));
    }

    locator
        .fill(&step.value, FILL_TIMEOUT)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let observed = locator
        .input_value()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    if observed == step.value {
        Ok(format!("filled '{}' with '{}'", step.selector, step.value))
    } else {
        // Mismatch is a warning, not a failure (§4.3).
        Ok(format!(
            "filled '{}' but observed value '{observed}' differs from requested '{}' (warning)",
            step.selector, step.value
        ))
    }
}

pub async fn select(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument("select requires a selector".into()));
    }
    let locator = ctx.browser.locator(&step.selector);
    locator
        .wait_for(WaitState::Visible, VISIBLE_WAIT)
        .await
        .map_err(to_wait_error)?;
    locator
        .select_option(&step.value, FILL_TIMEOUT)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    Ok(format!("selected '{}' on '{}'", step.value, step.selector))
}

fn to_wait_error(err: webagent_core_types::BrowserError) -> ExecutorError {
    use webagent_core_types::BrowserError;
    match err {
        BrowserError::Timeout(_) => ExecutorError::Timeout(err.to_string()),
        BrowserError::NotFound(m) => ExecutorError::NotFound(m),
        other => ExecutorError::BrowserError(other.to_string()),
    }
}
