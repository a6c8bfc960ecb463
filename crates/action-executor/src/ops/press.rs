//! §4.3 `press`. `Enter` gets a dedicated wait-and-compare cascade since it
//! usually submits a form or triggers navigation; every other key just waits
//! a fixed settle time.

use std::time::Duration;

use webagent_core_types::{LoadState, Step};

use crate::errors::ExecutorError;
use crate::ops::OpContext;

const NETWORKIDLE_WAIT: Duration = Duration::from_secs(5);
const DOMCONTENTLOADED_WAIT: Duration = Duration::from_secs(3);
const SETTLE_WAIT: Duration = Duration::from_secs(2);
const GENERIC_KEY_WAIT: Duration = Duration::from_millis(200);

pub async fn press(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    let key = step.value.trim();
    if key.is_empty() {
        return Err(ExecutorError::BadArgument("press requires a key name in value".into()));
    }

    if key.eq_ignore_ascii_case("enter") {
        return press_enter(ctx).await;
    }

    ctx.browser
        .press_key(key)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    tokio::time::sleep(GENERIC_KEY_WAIT).await;
    Ok(format!("pressed '{key}'"))
}

async fn press_enter(ctx: &OpContext) -> Result<String, ExecutorError> {
    let before_url = ctx
        .browser
        .current_url()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    let before_digest = page_digest(ctx).await?;

    ctx.browser
        .press_key("Enter")
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    if ctx
        .browser
        .wait_for_load_state(LoadState::NetworkIdle, NETWORKIDLE_WAIT)
        .await
        .is_err()
    {
        let _ = ctx
            .browser
            .wait_for_load_state(LoadState::DomContentLoaded, DOMCONTENTLOADED_WAIT)
            .await;
    }
    tokio::time::sleep(SETTLE_WAIT).await;

    let after_url = ctx
        .browser
        .current_url()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    let after_digest = page_digest(ctx).await?;

    if after_url != before_url || after_digest != before_digest {
        Ok("pressed Enter: page updated".to_string())
    } else {
        Ok("pressed Enter: page did not change".to_string())
    }
}

async fn page_digest(ctx: &OpContext) -> Result<String, ExecutorError> {
    let snapshot = ctx
        .page_observer
        .snapshot()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    Ok(snapshot.content_digest)
}
