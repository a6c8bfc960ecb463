//! §4.3 `download`: await a download triggered by clicking `selector`, save
//! it, then verify the saved file is non-empty.

use std::time::Duration;

use webagent_core_types::Step;

use crate::errors::ExecutorError;
use crate::ops::OpContext;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn download(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    if step.selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument(
            "download requires a trigger selector".into(),
        ));
    }

    let browser = ctx.browser.clone();
    let selector = step.selector.clone();
    let trigger: std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), webagent_core_types::BrowserError>> + Send>> =
        Box::pin(async move { browser.locator(&selector).click(DOWNLOAD_TIMEOUT, false).await });

    let path = ctx
        .browser
        .expect_download(DOWNLOAD_TIMEOUT, trigger)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| ExecutorError::AssertionMismatch(format!("downloaded file '{path}' missing: {e}")))?;

    if metadata.len() == 0 {
        return Err(ExecutorError::AssertionMismatch(format!(
            "downloaded file '{path}' is empty"
        )));
    }

    Ok(format!("downloaded file saved at '{path}' ({} bytes)", metadata.len()))
}
