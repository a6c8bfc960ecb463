//! §4.3 `handle_mfa`: screenshot → QR decode → TOTP → fill + submit.

use webagent_core_types::Step;

use crate::errors::ExecutorError;
use crate::mfa::{find_totp_payload, generate_totp};
use crate::ops::OpContext;

const DEFAULT_SUBMIT_SELECTOR: &str = r#"button[type="submit"]"#;

pub async fn handle_mfa(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument(
            "handle_mfa requires a selector for the code input field".into(),
        ));
    }

    let qr_ocr = ctx
        .qr_ocr
        .as_ref()
        .ok_or_else(|| ExecutorError::MissingCapability("QR decode capability not configured".into()))?;

    let png = ctx
        .browser
        .screenshot(false)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let payloads = qr_ocr
        .decode_qr(&png)
        .await
        .map_err(|e| ExecutorError::MissingCapability(format!("QR decode failed: {e}")))?;

    let payload = find_totp_payload(&payloads)
        .ok_or_else(|| ExecutorError::AssertionMismatch("no otpauth://totp/ QR payload found".into()))?
        .to_string();

    let code = generate_totp(&payload).map_err(|e| ExecutorError::AssertionMismatch(e.to_string()))?;

    ctx.browser
        .locator(&step.selector)
        .fill(&code, std::time::Duration::from_secs(10))
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let submit_selector = if step.value.trim().is_empty() {
        DEFAULT_SUBMIT_SELECTOR
    } else {
        step.value.trim()
    };

    ctx.browser
        .locator(submit_selector)
        .click(std::time::Duration::from_secs(30), false)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    Ok("submitted TOTP code".to_string())
}
