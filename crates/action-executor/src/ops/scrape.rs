//! §4.3 `scrape_to_memory`: delegates to the optional memory-ingest capability.

use webagent_core_types::Step;

use crate::errors::ExecutorError;
use crate::ops::OpContext;

pub async fn scrape_to_memory(ctx: &OpContext, _step: &Step) -> Result<String, ExecutorError> {
    let ingest = ctx
        .memory_ingest
        .as_ref()
        .ok_or_else(|| ExecutorError::MissingCapability("memory ingest capability not configured".into()))?;

    let snapshot = ctx
        .page_observer
        .snapshot()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    if snapshot.content_text.is_empty() {
        return Err(ExecutorError::AssertionMismatch(
            "page content is empty, nothing to scrape".into(),
        ));
    }

    ingest
        .ingest_current_page(&snapshot.url, &ctx.conversation_id)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    Ok(format!("scraped '{}' into memory", snapshot.url))
}
