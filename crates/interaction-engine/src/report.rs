//! §4.1 / §7: `FinalReport` assembly — every run produces one, never an
//! escaped exception.

use webagent_core_types::AttemptRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    Done,
    Respond,
    Stalled,
    RepeatFailure,
    BudgetExceeded,
    IterationCapReached,
    ProgressHardBreak,
    Fatal,
    Cancelled,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::Done => "done",
            TerminationReason::Respond => "respond",
            TerminationReason::Stalled => "stalled",
            TerminationReason::RepeatFailure => "repeat_failure",
            TerminationReason::BudgetExceeded => "budget_exceeded",
            TerminationReason::IterationCapReached => "iteration_cap_reached",
            TerminationReason::ProgressHardBreak => "progress_hard_break",
            TerminationReason::Fatal => "fatal",
            TerminationReason::Cancelled => "cancelled",
        }
    }
}

/// §7 "User-visible failure behavior": task statement, total iterations,
/// termination reason, optional agent response, per-iteration summaries.
#[derive(Debug, Clone)]
pub struct FinalReport {
    pub task: String,
    pub iteration_count: u32,
    pub termination_reason: TerminationReason,
    pub agent_response_message: Option<String>,
    pub fatal_detail: Option<String>,
    pub history: Vec<AttemptRecord>,
}

impl FinalReport {
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(msg) = &self.agent_response_message {
            lines.push(msg.clone());
        }
        lines.push(format!(
            "task: {} | iterations: {} | termination: {}",
            self.task,
            self.iteration_count,
            self.termination_reason.as_str()
        ));
        if let Some(detail) = &self.fatal_detail {
            lines.push(format!("fatal: {detail}"));
        }
        for record in &self.history {
            lines.push(record.summary_line());
        }
        lines.join("\n")
    }

    pub fn is_success(&self) -> bool {
        matches!(self.termination_reason, TerminationReason::Done | TerminationReason::Respond)
    }
}
