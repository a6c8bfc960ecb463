use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use tracing::{info, instrument, warn};

use webagent_core_types::{
    ActivityEvent, ActivityId, ActivityRole, ActivitySink, Browser, MemoryIngest, Operation, Outcome, QrOcr,
    Severity, Step,
};
use webagent_page_observer::PageObserver;

use crate::errors::ExecutorError;
use crate::ops::{
    content, cookies, download, evaluate, extract_text, fill_select, mfa, navigate_click, press, respond_done,
    screenshot, scrape, verify_wait, OpContext,
};

const RETRY_SLEEP: Duration = Duration::from_millis(500);
/// §4.1: the field inventory is capped at ~1500 chars in the planner prompt;
/// the after-action summary uses the same budget for consistency.
const POST_SUMMARY_CHARS: usize = 1500;

/// §4.3 ActionExecutor: maps a validated `Step` to a browser action with
/// retries, before/after screenshots and ActivityLog entries.
pub struct ActionExecutor {
    browser: Arc<dyn Browser>,
    qr_ocr: Option<Arc<dyn QrOcr>>,
    memory_ingest: Option<Arc<dyn MemoryIngest>>,
    activity_sink: Arc<dyn ActivitySink>,
    conversation_id: String,
}

impl ActionExecutor {
    pub fn new(
        browser: Arc<dyn Browser>,
        qr_ocr: Option<Arc<dyn QrOcr>>,
        memory_ingest: Option<Arc<dyn MemoryIngest>>,
        activity_sink: Arc<dyn ActivitySink>,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self {
            browser,
            qr_ocr,
            memory_ingest,
            activity_sink,
            conversation_id: conversation_id.into(),
        }
    }

    /// §4.3 contract: `Execute(step, before_snapshot) → Outcome`.
    #[instrument(skip(self, step), fields(operation = %step.operation))]
    pub async fn execute(&self, step: &Step, activity_id: ActivityId) -> Outcome {
        let before_url = self.browser.current_url().await.unwrap_or_default();
        let before_screenshot = self.capture_screenshot().await;
        let before_digest = self.content_digest().await;

        self.activity_sink.emit(
            ActivityEvent::new(
                activity_id,
                ActivityRole::Intent,
                Severity::Info,
                format!("executing {}: {}", step.operation, step.description),
            )
            .with_attachment(before_screenshot.clone().unwrap_or_default()),
        );

        let (success, message) = self.run_with_retries(step).await;

        let after_url = self.browser.current_url().await.unwrap_or_else(|_| before_url.clone());
        let after_screenshot = self.capture_screenshot().await;
        let after_digest = self.content_digest().await;

        let mut outcome = if success {
            Outcome::success(message, before_url, after_url)
        } else {
            Outcome::failure(message, before_url, after_url)
        };
        outcome = outcome
            .with_screenshots(before_screenshot.clone(), after_screenshot.clone())
            .with_digests(&before_digest, &after_digest);

        if success && !step.operation.skips_post_summary() {
            if let Some(summary) = self.post_action_summary().await {
                outcome.message = format!("{}\nPage state: {summary}", outcome.message);
            }
        }

        self.activity_sink.emit(
            ActivityEvent::new(
                activity_id,
                ActivityRole::Outcome,
                if success { Severity::Info } else { Severity::Warning },
                outcome.message.clone(),
            )
            .with_attachment(after_screenshot.unwrap_or_default()),
        );

        outcome
    }

    async fn run_with_retries(&self, step: &Step) -> (bool, String) {
        let attempts = step.max_attempts();
        let mut last_message = String::new();

        for attempt in 1..=attempts {
            let mut attempt_step = step.clone();
            if attempt > 1 {
                if let Some(alt) = step.retry_policy.as_ref().and_then(|r| r.alternate_selector.clone()) {
                    attempt_step.selector = alt;
                }
            }

            let ctx = OpContext {
                browser: self.browser.clone(),
                qr_ocr: self.qr_ocr.clone(),
                memory_ingest: self.memory_ingest.clone(),
                page_observer: PageObserver::new(self.browser.clone()),
                conversation_id: self.conversation_id.clone(),
            };

            match dispatch(&ctx, &attempt_step).await {
                Ok(message) => {
                    info!(attempt, "operation succeeded");
                    return (true, message);
                }
                Err(err) => {
                    warn!(attempt, error = %err, "operation attempt failed");
                    last_message = err.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(RETRY_SLEEP).await;
                    }
                }
            }
        }

        (false, last_message)
    }

    async fn capture_screenshot(&self) -> Option<String> {
        match self.browser.screenshot(false).await {
            Ok(bytes) => Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            Err(_) => None,
        }
    }

    async fn content_digest(&self) -> String {
        PageObserver::new(self.browser.clone())
            .snapshot()
            .await
            .map(|s| s.content_digest)
            .unwrap_or_default()
    }

    async fn post_action_summary(&self) -> Option<String> {
        let snapshot = PageObserver::new(self.browser.clone()).snapshot().await.ok()?;
        let mut text = snapshot.content_text;
        if text.chars().count() > POST_SUMMARY_CHARS {
            text = text.chars().take(POST_SUMMARY_CHARS).collect::<String>() + "...[truncated]";
        }
        Some(text)
    }
}

async fn dispatch(ctx: &OpContext, step: &Step) -> Result<String, ExecutorError> {
    match step.operation {
        Operation::Click => navigate_click::click(ctx, step).await,
        Operation::Fill => fill_select::fill(ctx, step).await,
        Operation::Select => fill_select::select(ctx, step).await,
        Operation::Wait => verify_wait::wait(ctx, step).await,
        Operation::Verify => verify_wait::verify(ctx, step).await,
        Operation::Press => press::press(ctx, step).await,
        Operation::ScrapeToMemory => scrape::scrape_to_memory(ctx, step).await,
        Operation::HandleMfa => mfa::handle_mfa(ctx, step).await,
        Operation::GetCookies => cookies::get_cookies(ctx, step).await,
        Operation::SetCookies => cookies::set_cookies(ctx, step).await,
        Operation::GetContent => content::get_content(ctx, step).await,
        Operation::GetFields => content::get_fields(ctx, step).await,
        Operation::Evaluate => evaluate::evaluate(ctx, step).await,
        Operation::Screenshot => screenshot::screenshot(ctx, step).await,
        Operation::Download => download::download(ctx, step).await,
        Operation::ExtractText => extract_text::extract_text(ctx, step).await,
        Operation::Respond => respond_done::respond(step).await,
        Operation::Done => respond_done::done(step).await,
    }
}
