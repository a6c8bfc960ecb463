//! §4.3 `click`: text-match cascade (exact → partial → flexible → auth
//! synonym) before falling back to a selector click with a force-click retry.

use std::time::Duration;

use webagent_core_types::{BrowserError, Step};

use crate::errors::ExecutorError;
use crate::ops::OpContext;

const CLICK_TIMEOUT: Duration = Duration::from_secs(30);
const NETWORKIDLE_WAIT: Duration = Duration::from_secs(5);
const LOAD_WAIT: Duration = Duration::from_secs(10);
const DOMCONTENTLOADED_WAIT: Duration = Duration::from_secs(2);

/// Groups of interchangeable auth-flow labels (§4.3). If the requested
/// `value` falls in a group, every other label in that group is tried too.
const AUTH_SYNONYM_GROUPS: &[&[&str]] = &[
    &["login", "log in", "sign in"],
    &["signup", "sign up", "register", "create account"],
    &["logout", "log out", "sign out"],
];

pub async fn click(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    let value = step.value.trim();
    if !value.is_empty() {
        if let Some(msg) = try_text_click(ctx, value).await? {
            return Ok(msg);
        }
    }

    if step.selector.trim().is_empty() {
        return Err(ExecutorError::BadArgument(
            "click requires a non-empty selector or value".into(),
        ));
    }

    click_by_selector(ctx, &step.selector).await
}

async fn try_text_click(ctx: &OpContext, value: &str) -> Result<Option<String>, ExecutorError> {
    if click_if_unique(ctx, value, true).await? {
        return Ok(Some(format!("clicked exact text '{value}'")));
    }
    if click_if_unique(ctx, value, false).await? {
        return Ok(Some(format!("clicked partial text '{value}'")));
    }
    if let Some(msg) = try_flexible_text_click(ctx, value).await? {
        return Ok(Some(msg));
    }

    let lowered = value.to_lowercase();
    for group in AUTH_SYNONYM_GROUPS {
        if group.iter().any(|candidate| lowered.contains(candidate)) {
            for candidate in *group {
                if click_if_unique(ctx, candidate, false).await? {
                    return Ok(Some(format!("clicked auth synonym '{candidate}' for '{value}'")));
                }
            }
        }
    }

    Ok(None)
}

/// §4.3 cascade step 3: whitespace/punctuation-normalized substring match in
/// either direction against the page's clickable texts, tried before auth
/// synonyms and after an exact/partial text match both miss.
async fn try_flexible_text_click(ctx: &OpContext, value: &str) -> Result<Option<String>, ExecutorError> {
    let normalized_value = normalize_for_match(value);
    if normalized_value.is_empty() {
        return Ok(None);
    }

    let snapshot = ctx
        .page_observer
        .snapshot()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;

    for candidate in &snapshot.clickable_texts {
        let normalized_candidate = normalize_for_match(candidate);
        if normalized_candidate.is_empty() {
            continue;
        }
        if normalized_candidate.contains(&normalized_value) || normalized_value.contains(&normalized_candidate) {
            if click_if_unique(ctx, candidate, true).await? {
                return Ok(Some(format!("clicked flexible match '{candidate}' for '{value}'")));
            }
        }
    }

    Ok(None)
}

/// Lowercased, punctuation-stripped, whitespace-collapsed form used by
/// `try_flexible_text_click`.
fn normalize_for_match(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim().to_string()
}

async fn click_if_unique(ctx: &OpContext, text: &str, exact: bool) -> Result<bool, ExecutorError> {
    let locator = ctx.browser.get_by_text(text, exact);
    let count = locator
        .count()
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    if count != 1 {
        return Ok(false);
    }
    locator
        .click(CLICK_TIMEOUT, false)
        .await
        .map_err(|e| ExecutorError::BrowserError(e.to_string()))?;
    settle_after_click(ctx).await;
    Ok(true)
}

async fn click_by_selector(ctx: &OpContext, selector: &str) -> Result<String, ExecutorError> {
    let locator = ctx.browser.locator(selector);
    match locator.click(CLICK_TIMEOUT, false).await {
        Ok(()) => {}
        Err(BrowserError::Timeout(_)) => {
            locator
                .click(CLICK_TIMEOUT, true)
                .await
                .map_err(|e| ExecutorError::BrowserError(format!("force-click failed: {e}")))?;
        }
        Err(BrowserError::NotFound(m)) => return Err(ExecutorError::NotFound(m)),
        Err(e) => return Err(ExecutorError::BrowserError(e.to_string())),
    }
    settle_after_click(ctx).await;
    Ok(format!("clicked selector '{selector}'"))
}

/// Best-effort wait cascade after a successful click (§4.3): networkidle,
/// falling back to load, falling back to domcontentloaded. Never fails the
/// operation itself.
async fn settle_after_click(ctx: &OpContext) {
    use webagent_core_types::LoadState;

    if ctx
        .browser
        .wait_for_load_state(LoadState::NetworkIdle, NETWORKIDLE_WAIT)
        .await
        .is_ok()
    {
        return;
    }
    if ctx
        .browser
        .wait_for_load_state(LoadState::Load, LOAD_WAIT)
        .await
        .is_ok()
    {
        return;
    }
    let _ = ctx
        .browser
        .wait_for_load_state(LoadState::DomContentLoaded, DOMCONTENTLOADED_WAIT)
        .await;
}
