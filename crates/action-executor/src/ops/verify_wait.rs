//! §4.3 `wait` and `verify`.

use std::str::FromStr;
use std::time::Duration;

use webagent_core_types::{Step, WaitState};

use crate::errors::ExecutorError;
use crate::ops::OpContext;

const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
const ATTACHED_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn wait(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    let value = step.value.trim();
    if let Ok(ms) = value.parse::<u64>() {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            return Ok(format!("waited {ms}ms"));
        }
    }

    let (selector, state) = match step.selector.rsplit_once('|') {
        Some((sel, state_str)) => (
            sel,
            WaitState::from_str(state_str).unwrap_or(WaitState::Visible),
        ),
        None => (step.selector.as_str(), WaitState::Visible),
    };

    if selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument(
            "wait requires a positive millisecond value or a selector".into(),
        ));
    }

    ctx.browser
        .locator(selector)
        .wait_for(state, DEFAULT_WAIT_TIMEOUT)
        .await
        .map_err(|e| ExecutorError::Timeout(e.to_string()))?;
    Ok(format!("waited for '{selector}' to reach {state:?}"))
}

pub async fn verify(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument("verify requires a selector".into()));
    }
    let locator = ctx.browser.locator(&step.selector);
    locator
        .wait_for(WaitState::Attached, ATTACHED_TIMEOUT)
        .await
        .map_err(|_| ExecutorError::NotFound(step.selector.clone()))?;

    // check_visibility defaults to true (§4.3); the current `Step` shape has
    // no field to opt out of it.
    locator
        .wait_for(WaitState::Visible, ATTACHED_TIMEOUT)
        .await
        .map_err(|_| ExecutorError::AssertionMismatch(format!("'{}' is not visible", step.selector)))?;

    if !step.value.trim().is_empty() {
        let text = locator
            .text_content(ATTACHED_TIMEOUT)
            .await
            .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
        if !text.contains(step.value.trim()) {
            return Err(ExecutorError::AssertionMismatch(format!(
                "expected '{}' to contain '{}', found '{}'",
                step.selector, step.value, text
            )));
        }
    }

    Ok(format!("verified '{}'", step.selector))
}
