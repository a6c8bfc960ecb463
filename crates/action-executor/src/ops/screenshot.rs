//! §4.3 `screenshot`: full-page capture, optionally ringing `selector` in red
//! for the shot and restoring its style afterward.

use webagent_core_types::Step;

use crate::errors::ExecutorError;
use crate::ops::OpContext;

pub async fn screenshot(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    let selector = step.selector.trim();

    if selector.is_empty() {
        let bytes = capture(ctx).await?;
        return Ok(format!("captured full-page screenshot ({} bytes)", bytes.len()));
    }

    let highlight_js = format!(
        "(() => {{ const el = document.querySelector({sel}); if (!el) return null; \
         const prev = el.style.outline; el.style.outline = '3px solid red'; return prev; }})()",
        sel = serde_json::to_string(selector).unwrap(),
    );
    let previous_outline = ctx
        .browser
        .evaluate(&highlight_js)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let bytes = capture(ctx).await?;

    let restore_js = format!(
        "(() => {{ const el = document.querySelector({sel}); if (el) el.style.outline = {prev}; }})()",
        sel = serde_json::to_string(selector).unwrap(),
        prev = previous_outline,
    );
    let _ = ctx.browser.evaluate(&restore_js).await;

    Ok(format!(
        "captured screenshot highlighting '{selector}' ({} bytes)",
        bytes.len()
    ))
}

async fn capture(ctx: &OpContext) -> Result<Vec<u8>, ExecutorError> {
    ctx.browser
        .screenshot(true)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))
}
