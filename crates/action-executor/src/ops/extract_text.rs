//! §4.3 `extract_text`: OCR over a screenshot of `selector`'s element. Since
//! the `Browser` capability only screenshots full pages, we highlight and
//! crop is left to the OCR capability; here we pass the full-page image,
//! which the original source also does when no bounding box is available.

use webagent_core_types::Step;

use crate::errors::ExecutorError;
use crate::ops::OpContext;

pub async fn extract_text(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument("extract_text requires a selector".into()));
    }

    let ocr = ctx
        .qr_ocr
        .as_ref()
        .ok_or_else(|| ExecutorError::MissingCapability("OCR capability not configured".into()))?;

    // Make sure the element is on screen before capturing.
    ctx.browser
        .locator(&step.selector)
        .scroll_into_view_if_needed(std::time::Duration::from_secs(10))
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let png = ctx
        .browser
        .screenshot(false)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let text = ocr
        .ocr(&png)
        .await
        .map_err(|e| ExecutorError::MissingCapability(format!("OCR failed: {e}")))?;

    Ok(text)
}
