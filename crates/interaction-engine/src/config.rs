//! Every tunable named in §4-5, grounded in `agent-core::agent_loop::config::AgentLoopConfig`'s
//! shape: one flat struct with stated defaults, preset constructors, and builder setters.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// §3: lower bound of any computed task-complexity tier.
    pub min_max_iterations: u32,
    /// §5: overall run budget.
    pub max_runtime_seconds: u64,
    /// §8 invariant 3: grace allowed past `max_runtime_seconds` for final summary assembly.
    pub grace_for_final_summary: Duration,

    /// §4.1 step 7 / §9: stall threshold before clean termination.
    pub stalled_plan_threshold: u32,
    /// §4.1 step 7: bonus tolerance for operations tolerant of not changing page state.
    pub extended_stall_bonus: u32,

    /// §4.1 step 8: repeat-failure lookback window.
    pub repeat_failure_window: usize,
    /// §4.1 step 8: failures sharing a signature within the window before termination.
    pub repeat_failure_threshold: usize,

    /// §4.1 step 9: progress lookback window.
    pub progress_window: usize,
    /// §4.1 step 9: minimum success ratio within the window before a progress warning fires.
    pub progress_ratio: f64,
    /// §4.1 step 9: iteration at which progress checking begins.
    pub progress_check_start_iteration: u32,
    /// §4.1 step 9: iteration at which continued no-progress becomes a hard break.
    pub progress_hard_break_iteration: u32,

    /// §5: navigation wait-strategy cascade timeout.
    pub navigation_timeout: Duration,
    /// §5: generic selector wait.
    pub generic_selector_wait: Duration,
    /// §5: element click timeout (before force-click fallback).
    pub click_timeout: Duration,
    /// §5/§4.4: LLM planning call hard timeout.
    pub planning_timeout: Duration,
    /// §5: per-step page-state summary LLM call timeout (not yet wired to a summarizer capability).
    pub step_summary_timeout: Duration,
    /// §5: visual-analysis LLM call timeout (carried for parity; no visual-analysis operation in scope).
    pub visual_analysis_timeout: Duration,
    /// §5: web-search LLM call timeout (carried for parity; no web-search operation in scope).
    pub web_search_timeout: Duration,
    /// §5: scrape-to-memory call timeout.
    pub scrape_to_memory_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_max_iterations: 50,
            max_runtime_seconds: 300,
            grace_for_final_summary: Duration::from_secs(5),

            stalled_plan_threshold: 5,
            extended_stall_bonus: 3,

            repeat_failure_window: 3,
            repeat_failure_threshold: 2,

            progress_window: 10,
            progress_ratio: 0.3,
            progress_check_start_iteration: 25,
            progress_hard_break_iteration: 35,

            navigation_timeout: Duration::from_secs(30),
            generic_selector_wait: Duration::from_secs(10),
            click_timeout: Duration::from_secs(30),
            planning_timeout: Duration::from_secs(90),
            step_summary_timeout: Duration::from_secs(15),
            visual_analysis_timeout: Duration::from_secs(120),
            web_search_timeout: Duration::from_secs(60),
            scrape_to_memory_timeout: Duration::from_secs(90),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fast, low-timeout config for tests (mirrors `AgentLoopConfig::minimal`).
    pub fn minimal() -> Self {
        Self {
            min_max_iterations: 10,
            max_runtime_seconds: 30,
            grace_for_final_summary: Duration::from_secs(1),
            stalled_plan_threshold: 3,
            extended_stall_bonus: 2,
            repeat_failure_window: 3,
            repeat_failure_threshold: 2,
            progress_window: 5,
            progress_ratio: 0.3,
            progress_check_start_iteration: 5,
            progress_hard_break_iteration: 8,
            navigation_timeout: Duration::from_secs(5),
            generic_selector_wait: Duration::from_secs(2),
            click_timeout: Duration::from_secs(5),
            planning_timeout: Duration::from_secs(5),
            step_summary_timeout: Duration::from_secs(2),
            visual_analysis_timeout: Duration::from_secs(5),
            web_search_timeout: Duration::from_secs(5),
            scrape_to_memory_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_runtime_seconds(mut self, seconds: u64) -> Self {
        self.max_runtime_seconds = seconds;
        self
    }

    pub fn stalled_plan_threshold(mut self, threshold: u32) -> Self {
        self.stalled_plan_threshold = threshold;
        self
    }

    pub fn planning_timeout(mut self, timeout: Duration) -> Self {
        self.planning_timeout = timeout;
        self
    }
}
