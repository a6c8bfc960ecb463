//! §3 `InteractionState`: per-run mutable state owned by the engine, plus the
//! pure termination heuristics (§4.1 steps 7-9) that read it.

use std::time::Instant;

use webagent_core_types::{ActivityId, AttemptOutcome, AttemptRecord, Operation};

use crate::config::Config;

pub struct InteractionState {
    pub task: String,
    pub start_url: String,
    pub activity_id: ActivityId,
    pub max_iterations: u32,
    pub max_runtime_seconds: u64,
    pub history: Vec<AttemptRecord>,
    /// Structured `page_changed` tag for each pushed `AttemptRecord`, kept
    /// alongside `history` rather than inferred from `detail` text (§9:
    /// "a reimplementation should use the structured AttemptRecord tags").
    page_changed_history: Vec<bool>,
    pub last_step_signature: Option<(Operation, String, String)>,
    pub stalled_plan_count: u32,
    pub last_content_digest: Option<String>,
    pub current_url: String,
    pub agent_response_message: Option<String>,
    pub start_monotonic_time: Instant,
    pub iteration_count: u32,
}

impl InteractionState {
    pub fn new(
        task: impl Into<String>,
        start_url: impl Into<String>,
        activity_id: ActivityId,
        max_iterations: u32,
        max_runtime_seconds: u64,
    ) -> Self {
        let start_url = start_url.into();
        Self {
            task: task.into(),
            current_url: start_url.clone(),
            start_url,
            activity_id,
            max_iterations,
            max_runtime_seconds,
            history: Vec::new(),
            page_changed_history: Vec::new(),
            last_step_signature: None,
            stalled_plan_count: 0,
            last_content_digest: None,
            agent_response_message: None,
            start_monotonic_time: Instant::now(),
            iteration_count: 0,
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start_monotonic_time.elapsed()
    }

    pub fn push(&mut self, record: AttemptRecord, page_changed: bool) {
        self.last_step_signature = Some(record.signature.clone());
        self.history.push(record);
        self.page_changed_history.push(page_changed);
    }

    /// Last 5 entries, oldest first (§4.1 step 4).
    pub fn recent_history(&self) -> Vec<AttemptRecord> {
        self.history.iter().rev().take(5).rev().cloned().collect()
    }

    /// §4.1 step 7: `signature` repeats the last one and neither the URL nor
    /// the content digest changed since. The source's third clause ("and the
    /// previous step didn't report success") turns out to key off substring
    /// markers like "scraped"/"retrieved"/"downloaded" that only ever appear
    /// in the handful of retrieval operations already covered by
    /// `has_extended_stall_tolerance`'s wider threshold — for a page-changing
    /// operation like `press` it is always false, success or not, so a
    /// repeated no-op `press Enter` must count toward the stall even though
    /// each individual press succeeds. We drop that clause rather than
    /// reconstruct it from message text.
    pub fn is_stall_repeat(&self, signature: &(Operation, String, String), page_changed: bool) -> bool {
        if page_changed {
            return false;
        }
        match &self.last_step_signature {
            Some(last_signature) => last_signature == signature,
            None => false,
        }
    }

    pub fn stall_threshold_for(&self, config: &Config, operation: Operation) -> u32 {
        if operation.has_extended_stall_tolerance() {
            config.stalled_plan_threshold + config.extended_stall_bonus
        } else {
            config.stalled_plan_threshold
        }
    }

    /// §4.1 step 8: within the last `window` entries, do `>= threshold` share
    /// a `(operation, selector, value)` or `(operation, selector, *)` signature?
    pub fn has_repeat_failure(&self, window: usize, threshold: usize) -> bool {
        let tail: Vec<&AttemptRecord> = self.history.iter().rev().take(window).collect();
        for (i, a) in tail.iter().enumerate() {
            if !a.outcome.is_failure_like() {
                continue;
            }
            let mut count = 1;
            for b in tail.iter().skip(i + 1) {
                if !b.outcome.is_failure_like() {
                    continue;
                }
                // `(operation, selector, value)` or `(operation, selector, *)`:
                // matching operation + selector is sufficient either way.
                let (a_op, a_sel, _) = &a.signature;
                let (b_op, b_sel, _) = &b.signature;
                if a_op == b_op && a_sel == b_sel {
                    count += 1;
                }
            }
            if count >= threshold {
                return true;
            }
        }
        false
    }

    /// §4.1 step 9: last `window` entries' success ratio, once at least one exists.
    pub fn recent_success_ratio(&self, window: usize) -> f64 {
        let tail: Vec<&AttemptRecord> = self.history.iter().rev().take(window).collect();
        if tail.is_empty() {
            return 1.0;
        }
        let successes = tail.iter().filter(|r| r.outcome == AttemptOutcome::Success).count();
        successes as f64 / tail.len() as f64
    }

    /// §4.1 step 9: whether any of the last `window` iterations changed the page.
    pub fn recent_page_changed(&self, window: usize) -> bool {
        self.page_changed_history.iter().rev().take(window).any(|changed| *changed)
    }
}
