//! §4.3 `get_content` / `get_fields`: proxy straight to PageObserver.

use webagent_core_types::Step;

use crate::errors::ExecutorError;
use crate::ops::OpContext;

pub async fn get_content(ctx: &OpContext, _step: &Step) -> Result<String, ExecutorError> {
    let snapshot = ctx
        .page_observer
        .snapshot()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    Ok(snapshot.content_text)
}

pub async fn get_fields(ctx: &OpContext, _step: &Step) -> Result<String, ExecutorError> {
    let snapshot = ctx
        .page_observer
        .snapshot()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    Ok(snapshot.field_inventory.render(1500))
}
