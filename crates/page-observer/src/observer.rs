use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use webagent_core_types::Browser;

use crate::digest::content_digest;
use crate::errors::ObserveError;
use crate::extract::{extract_clickable_texts, extract_content_text, extract_field_inventory, extract_stable_selectors};
use crate::snapshot::{FieldKind, PageSnapshot};

/// Hard timeout on the primary `content()` read before falling back to an
/// `evaluate` call against `document.body.innerHTML` (§4.2).
const PRIMARY_CONTENT_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_EVALUATE_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_CONTENT_TEXT_CHARS: usize = 4_000;

/// Extracts structured page state for the Planner. Never mutates the page.
pub struct PageObserver {
    browser: Arc<dyn Browser>,
}

impl PageObserver {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Self { browser }
    }

    /// §4.2 contract: `Snapshot() → PageSnapshot | ObserveError`.
    pub async fn snapshot(&self) -> Result<PageSnapshot, ObserveError> {
        let url = self
            .browser
            .current_url()
            .await
            .map_err(|_| ObserveError::BrowserClosed)?;

        let html = self.read_content().await?;

        let content_digest = if html.trim().is_empty() {
            content_digest(&url)
        } else {
            content_digest(&html)
        };

        let mut content_text = extract_content_text(&html);
        truncate_chars_inplace(&mut content_text, MAX_CONTENT_TEXT_CHARS);

        let stable_selectors = extract_stable_selectors(&html);
        let field_inventory = extract_field_inventory(&html);

        let mut clickable_texts = extract_clickable_texts(&html);
        let mut seen: std::collections::HashSet<String> = clickable_texts.iter().cloned().collect();
        for field in &field_inventory.fields {
            if matches!(field.kind, FieldKind::Link | FieldKind::Button) {
                if let Some(label) = &field.label {
                    let len = label.chars().count();
                    if (3..=200).contains(&len) && seen.insert(label.clone()) {
                        clickable_texts.push(label.clone());
                    }
                }
            }
        }

        debug!(url = %url, selectors = stable_selectors.len(), "page snapshot taken");

        Ok(PageSnapshot {
            url,
            content_text,
            content_digest,
            stable_selectors,
            clickable_texts,
            field_inventory,
        })
    }

    async fn read_content(&self) -> Result<String, ObserveError> {
        match self.browser.content(PRIMARY_CONTENT_TIMEOUT).await {
            Ok(html) => Ok(html),
            Err(primary_err) => {
                warn!(error = %primary_err, "primary content read failed, falling back to innerHTML evaluate");
                let fallback = tokio::time::timeout(
                    FALLBACK_EVALUATE_TIMEOUT,
                    self.browser.evaluate("document.body.innerHTML"),
                )
                .await;

                match fallback {
                    Ok(Ok(value)) => value
                        .as_str()
                        .map(|s| s.to_string())
                        .ok_or_else(|| ObserveError::ContentUnavailable("innerHTML evaluate returned non-string".into())),
                    Ok(Err(eval_err)) => Err(ObserveError::ContentUnavailable(format!(
                        "both content() and innerHTML evaluate failed: {primary_err} / {eval_err}"
                    ))),
                    Err(_) => Err(ObserveError::Timeout(FALLBACK_EVALUATE_TIMEOUT)),
                }
            }
        }
    }
}

fn truncate_chars_inplace(s: &mut String, max_chars: usize) {
    if s.chars().count() <= max_chars {
        return;
    }
    let truncated: String = s.chars().take(max_chars.saturating_sub(16)).collect();
    *s = format!("{truncated}\n...[truncated]");
}
