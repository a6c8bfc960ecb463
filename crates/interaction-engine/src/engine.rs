//! §4.1 `InteractionEngine`: the bounded observe-plan-act loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use webagent_action_executor::ActionExecutor;
use webagent_core_types::{
    ActivityEvent, ActivityId, ActivityRole, ActivitySink, AttemptOutcome, AttemptRecord, Browser, LlmProvider,
    LoadState, MemoryIngest, Operation, QrOcr, Severity, Step,
};
use webagent_page_observer::{is_stable_selector, PageObserver};
use webagent_planner::{Planner, PlannerConfig, PlanningContext};

use crate::activity_log::ActivityLog;
use crate::complexity;
use crate::config::Config;
use crate::report::{FinalReport, TerminationReason};
use crate::state::InteractionState;

const FIELD_INVENTORY_PROMPT_CHARS: usize = 1500;

pub struct InteractionEngine {
    browser: Arc<dyn Browser>,
    page_observer: PageObserver,
    action_executor: ActionExecutor,
    planner: Planner,
    activity_log: Arc<ActivityLog>,
    config: Config,
    /// §5 caller-initiated cancellation source, cloned into the planner and
    /// executor awaits inside `run()`. The engine owns the only "real" copy;
    /// `cancellation_token()` hands callers a clone to cancel from outside.
    cancellation_token: CancellationToken,
    /// Set once a run reaches `finish()`. `Drop` warns if it never was.
    cleanup_done: AtomicBool,
}

impl InteractionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        browser: Arc<dyn Browser>,
        llm: Arc<dyn LlmProvider>,
        qr_ocr: Option<Arc<dyn QrOcr>>,
        memory_ingest: Option<Arc<dyn MemoryIngest>>,
        activity_log: Arc<ActivityLog>,
        conversation_id: impl Into<String>,
        config: Config,
    ) -> Self {
        let page_observer = PageObserver::new(browser.clone());
        let action_executor = ActionExecutor::new(
            browser.clone(),
            qr_ocr,
            memory_ingest,
            activity_log.clone() as Arc<dyn ActivitySink>,
            conversation_id,
        );
        let planner = Planner::with_config(
            llm,
            PlannerConfig {
                planning_timeout: config.planning_timeout,
            },
        );
        Self {
            browser,
            page_observer,
            action_executor,
            planner,
            activity_log,
            config,
            cancellation_token: CancellationToken::new(),
            cleanup_done: AtomicBool::new(false),
        }
    }

    /// A clone of the engine's cancellation source (§5): cancelling it
    /// unblocks the in-flight `run()` call at its next suspension point.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// §4.1 contract: `Run(task, start_url) → FinalReport`. Never propagates
    /// an exception to the caller; every path returns a report.
    #[instrument(skip(self, task, start_url))]
    pub async fn run(&self, task: impl Into<String>, start_url: impl Into<String>) -> FinalReport {
        let task = task.into();
        let start_url = start_url.into();
        let activity_id = ActivityId::new();

        if let Err(err) = self.navigate(&start_url).await {
            self.cleanup_done.store(true, Ordering::SeqCst);
            return FinalReport {
                task,
                iteration_count: 0,
                termination_reason: TerminationReason::Fatal,
                agent_response_message: None,
                fatal_detail: Some(err.to_string()),
                history: Vec::new(),
            };
        }

        let max_iterations = complexity::tier(&task).max(self.config.min_max_iterations);
        let mut state = InteractionState::new(
            task,
            start_url,
            activity_id.clone(),
            max_iterations,
            self.config.max_runtime_seconds,
        );

        loop {
            // 1. Budget check. The iteration cap is checked *before*
            // incrementing, so that path never reports an `iteration_count`
            // exceeding `max_iterations` in the `FinalReport`.
            if state.iteration_count >= state.max_iterations {
                return self.finish(state, TerminationReason::IterationCapReached, None);
            }
            state.iteration_count += 1;
            info!(iteration = state.iteration_count, "starting iteration");

            if state.elapsed() >= Duration::from_secs(state.max_runtime_seconds) {
                return self.finish(state, TerminationReason::BudgetExceeded, None);
            }
            if self.cancellation_token.is_cancelled() {
                return self.finish(state, TerminationReason::Cancelled, None);
            }

            // 2. Browser liveness.
            if let Err(err) = self.browser.current_url().await {
                return self.finish(state, TerminationReason::Fatal, Some(format!("browser lost: {err}")));
            }

            // 3. Observe.
            let snapshot = match self.page_observer.snapshot().await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    return self.finish(state, TerminationReason::Fatal, Some(format!("observation failed: {err}")))
                }
            };

            let url_changed = snapshot.url != state.current_url;
            let content_changed = state
                .last_content_digest
                .as_deref()
                .map(|digest| digest != snapshot.content_digest)
                .unwrap_or(true);
            state.current_url = snapshot.url.clone();
            let previous_digest = state.last_content_digest.replace(snapshot.content_digest.clone());
            let _ = previous_digest;

            // 4. Plan.
            let context = PlanningContext {
                task: state.task.clone(),
                iteration: state.iteration_count,
                max_iterations: state.max_iterations,
                current_url: snapshot.url.clone(),
                url_changed,
                stable_selectors: snapshot.stable_selectors.clone(),
                clickable_texts: snapshot.clickable_texts.clone(),
                field_inventory_rendered: snapshot.field_inventory.render(FIELD_INVENTORY_PROMPT_CHARS),
                history: state.history.clone(),
            };

            let step = tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    warn!("cancelled while awaiting the planner; its call may still be running in the background");
                    return self.finish(state, TerminationReason::Cancelled, None);
                }
                result = self.planner.next_step(&context) => match result {
                    Ok(step) => step,
                    Err(err) => {
                        warn!(error = %err, "planner exhausted its retries");
                        return self.finish(state, TerminationReason::Fatal, Some(format!("planner failed: {err}")));
                    }
                },
            };

            // 5. Validate.
            if let Err(reason) = validate_step(&step) {
                state.push(
                    AttemptRecord::new(
                        state.iteration_count,
                        step.signature(),
                        AttemptOutcome::Failure,
                        format!("planner_malformed: {reason}"),
                    ),
                    false,
                );
                continue;
            }

            // 6. Early terminators.
            if step.operation == Operation::Done {
                state.push(
                    AttemptRecord::new(state.iteration_count, step.signature(), AttemptOutcome::Success, "done"),
                    false,
                );
                return self.finish(state, TerminationReason::Done, None);
            }
            if step.operation == Operation::Respond {
                state.agent_response_message = Some(step.value.clone());
                state.push(
                    AttemptRecord::new(
                        state.iteration_count,
                        step.signature(),
                        AttemptOutcome::Success,
                        "respond",
                    ),
                    false,
                );
                return self.finish(state, TerminationReason::Respond, None);
            }

            // 7. Stall check.
            let signature = step.signature();
            let page_changed_since_last = url_changed || content_changed;
            if state.is_stall_repeat(&signature, page_changed_since_last) {
                state.stalled_plan_count += 1;
            } else {
                state.stalled_plan_count = 0;
            }
            let stall_threshold = state.stall_threshold_for(&self.config, step.operation);
            if state.stalled_plan_count >= stall_threshold {
                warn!(count = state.stalled_plan_count, "stall threshold exceeded");
                return self.finish(state, TerminationReason::Stalled, None);
            }

            // 8. Repeat-failure check.
            if state.has_repeat_failure(self.config.repeat_failure_window, self.config.repeat_failure_threshold) {
                return self.finish(state, TerminationReason::RepeatFailure, None);
            }

            // 9. Progress check.
            if state.iteration_count >= self.config.progress_check_start_iteration {
                let ratio = state.recent_success_ratio(self.config.progress_window);
                let changed_recently = state.recent_page_changed(self.config.progress_window);
                if ratio < self.config.progress_ratio && !changed_recently {
                    self.activity_log.emit(ActivityEvent::new(
                        activity_id.clone(),
                        ActivityRole::Warning,
                        Severity::Warning,
                        format!("no progress in the last {} iterations", self.config.progress_window),
                    ));
                    if state.iteration_count >= self.config.progress_hard_break_iteration {
                        return self.finish(state, TerminationReason::ProgressHardBreak, None);
                    }
                }
            }

            // 10. Execute.
            let outcome = tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    warn!("cancelled while awaiting the executor; its call may still be running in the background");
                    return self.finish(state, TerminationReason::Cancelled, None);
                }
                outcome = self.action_executor.execute(&step, activity_id.clone()) => outcome,
            };

            // 11. Record.
            let outcome_tag = if outcome.is_success() {
                AttemptOutcome::Success
            } else {
                AttemptOutcome::Failure
            };
            state.push(
                AttemptRecord::new(state.iteration_count, signature, outcome_tag, outcome.message.clone()),
                outcome.page_changed,
            );

            // 12. Continue.
        }
    }

    async fn navigate(&self, url: &str) -> Result<(), crate::errors::EngineError> {
        self.browser
            .goto(url, LoadState::DomContentLoaded, self.config.navigation_timeout)
            .await
            .map_err(|err| crate::errors::EngineError::NavigationFailed(err.to_string()))?;
        let _ = self
            .browser
            .wait_for_load_state(LoadState::Load, self.config.navigation_timeout)
            .await;
        let _ = self
            .browser
            .wait_for_load_state(LoadState::NetworkIdle, self.config.navigation_timeout)
            .await;
        Ok(())
    }

    fn finish(&self, state: InteractionState, reason: TerminationReason, fatal_detail: Option<String>) -> FinalReport {
        info!(reason = reason.as_str(), iterations = state.iteration_count, "run finished");
        self.cleanup_done.store(true, Ordering::SeqCst);
        FinalReport {
            task: state.task,
            iteration_count: state.iteration_count,
            termination_reason: reason,
            agent_response_message: state.agent_response_message,
            fatal_detail,
            history: state.history,
        }
    }
}

/// §5 cleanup guarantee: a run that never reaches `finish()` (engine dropped
/// mid-run, e.g. its owning task was aborted out from under it) still gets a
/// best-effort, once-only log of the fact, rather than silently vanishing.
impl Drop for InteractionEngine {
    fn drop(&mut self) {
        if !self.cleanup_done.load(Ordering::SeqCst) {
            warn!("InteractionEngine dropped without a completed run; cleanup was never invoked");
        }
    }
}

/// §4.1 step 5 / §8 invariant 6: operations requiring a selector need a
/// *stable* one; `click` may instead rely on a non-empty `value`.
fn validate_step(step: &Step) -> Result<(), String> {
    if step.operation == Operation::Click {
        if step.selector.trim().is_empty() {
            if step.value.trim().is_empty() {
                return Err("click requires either a stable selector or a non-empty value".to_string());
            }
            return Ok(());
        }
        if !is_stable_selector(&step.selector) {
            return Err(format!("selector '{}' fails the stability rule", step.selector));
        }
        return Ok(());
    }

    if step.operation.requires_selector() {
        if step.selector.trim().is_empty() {
            return Err(format!("{} requires a selector", step.operation));
        }
        if !is_stable_selector(&step.selector) {
            return Err(format!("selector '{}' fails the stability rule", step.selector));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_with_empty_selector_but_a_value_is_valid() {
        let step = Step::new(Operation::Click).with_value("Sign in");
        assert!(validate_step(&step).is_ok());
    }

    #[test]
    fn click_with_unstable_selector_is_rejected() {
        let step = Step::new(Operation::Click).with_selector(".btn > span:nth-child(2)");
        assert!(validate_step(&step).is_err());
    }

    #[test]
    fn fill_without_a_selector_is_rejected() {
        let step = Step::new(Operation::Fill).with_value("hello");
        assert!(validate_step(&step).is_err());
    }

    #[test]
    fn fill_with_a_stable_id_selector_is_valid() {
        let step = Step::new(Operation::Fill).with_selector("#q").with_value("hello");
        assert!(validate_step(&step).is_ok());
    }

    #[test]
    fn wait_never_needs_a_selector() {
        let step = Step::new(Operation::Wait).with_value("1000");
        assert!(validate_step(&step).is_ok());
    }
}
