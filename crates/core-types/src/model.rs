//! The §3 data model: `Step`, `Outcome`, `AttemptRecord`, and the operation vocabulary.

use std::fmt;

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
pub enum Operation {
    Click,
    Fill,
    Select,
    Wait,
    Verify,
    Press,
    ScrapeToMemory,
    HandleMfa,
    GetCookies,
    SetCookies,
    GetContent,
    GetFields,
    Evaluate,
    Screenshot,
    Download,
    ExtractText,
    Respond,
    Done,
}

impl Operation {
    /// Operations that proxy or inspect state without needing a target selector.
    pub fn requires_selector(self) -> bool {
        !matches!(
            self,
            Operation::Wait
                | Operation::ScrapeToMemory
                | Operation::GetCookies
                | Operation::SetCookies
                | Operation::GetContent
                | Operation::GetFields
                | Operation::Evaluate
                | Operation::Screenshot
                | Operation::Respond
                | Operation::Done
                | Operation::Press // press targets the keyboard, not an element
                | Operation::Click // click may resolve purely from `value` text
        )
    }

    /// §4.1 step 7: operations tolerant of not changing page state, given an
    /// extended stall threshold of `threshold + 3` instead of `threshold`.
    pub fn has_extended_stall_tolerance(self) -> bool {
        matches!(
            self,
            Operation::Wait
                | Operation::GetContent
                | Operation::GetFields
                | Operation::ScrapeToMemory
                | Operation::GetCookies
                | Operation::Screenshot
                | Operation::Download
        )
    }

    /// §4.3: operations the executor does not bother to compute a page-state
    /// summary for after executing (either side-effect free or already terse).
    pub fn skips_post_summary(self) -> bool {
        matches!(
            self,
            Operation::Wait
                | Operation::GetContent
                | Operation::GetFields
                | Operation::Screenshot
                | Operation::Verify
                | Operation::Evaluate
                | Operation::Done
                | Operation::Press
                | Operation::ScrapeToMemory
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Click => "click",
            Operation::Fill => "fill",
            Operation::Select => "select",
            Operation::Wait => "wait",
            Operation::Verify => "verify",
            Operation::Press => "press",
            Operation::ScrapeToMemory => "scrape_to_memory",
            Operation::HandleMfa => "handle_mfa",
            Operation::GetCookies => "get_cookies",
            Operation::SetCookies => "set_cookies",
            Operation::GetContent => "get_content",
            Operation::GetFields => "get_fields",
            Operation::Evaluate => "evaluate",
            Operation::Screenshot => "screenshot",
            Operation::Download => "download",
            Operation::ExtractText => "extract_text",
            Operation::Respond => "respond",
            Operation::Done => "done",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "click" => Operation::Click,
            "fill" => Operation::Fill,
            "select" => Operation::Select,
            "wait" => Operation::Wait,
            "verify" => Operation::Verify,
            "press" => Operation::Press,
            "scrape_to_memory" => Operation::ScrapeToMemory,
            "handle_mfa" => Operation::HandleMfa,
            "get_cookies" => Operation::GetCookies,
            "set_cookies" => Operation::SetCookies,
            "get_content" => Operation::GetContent,
            "get_fields" => Operation::GetFields,
            "evaluate" => Operation::Evaluate,
            "screenshot" => Operation::Screenshot,
            "download" => Operation::Download,
            "extract_text" => Operation::ExtractText,
            "respond" => Operation::Respond,
            "done" => Operation::Done,
            _ => return Err(()),
        })
    }
}

/// Optional per-step retry configuration (§3, §4.3).
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub alternate_selector: Option<String>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, alternate_selector: Option<String>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            alternate_selector,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            alternate_selector: None,
        }
    }
}

/// A planned action, as produced by the Planner and consumed by the ActionExecutor.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub operation: Operation,
    pub selector: String,
    pub value: String,
    pub description: String,
    pub retry_policy: Option<RetryPolicy>,
}

impl Step {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            selector: String::new(),
            value: String::new(),
            description: String::new(),
            retry_policy: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `(operation, selector, value)`, used for stall/repeat-failure comparisons.
    pub fn signature(&self) -> (Operation, String, String) {
        (self.operation, self.selector.clone(), self.value.clone())
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry_policy
            .as_ref()
            .map(|r| r.max_attempts.max(1))
            .unwrap_or(1)
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// Result of executing one `Step` (§3).
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub status: OutcomeStatus,
    pub message: String,
    pub before_url: String,
    pub after_url: String,
    pub before_screenshot: Option<String>,
    pub after_screenshot: Option<String>,
    pub page_changed: bool,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn success(message: impl Into<String>, before_url: impl Into<String>, after_url: impl Into<String>) -> Self {
        let before_url = before_url.into();
        let after_url = after_url.into();
        let page_changed = before_url != after_url;
        Self {
            status: OutcomeStatus::Success,
            message: message.into(),
            before_url,
            after_url,
            before_screenshot: None,
            after_screenshot: None,
            page_changed,
        }
    }

    pub fn failure(message: impl Into<String>, before_url: impl Into<String>, after_url: impl Into<String>) -> Self {
        let before_url = before_url.into();
        let after_url = after_url.into();
        let page_changed = before_url != after_url;
        Self {
            status: OutcomeStatus::Failure,
            message: message.into(),
            before_url,
            after_url,
            before_screenshot: None,
            after_screenshot: None,
            page_changed,
        }
    }

    pub fn with_screenshots(mut self, before: Option<String>, after: Option<String>) -> Self {
        self.before_screenshot = before;
        self.after_screenshot = after;
        self
    }

    /// Recompute `page_changed` given a digest observed before/after the action,
    /// folding in the URL comparison already captured at construction time.
    pub fn with_digests(mut self, before_digest: &str, after_digest: &str) -> Self {
        self.page_changed = self.page_changed || before_digest != after_digest;
        self
    }
}

/// Tag attached to one `AttemptRecord` (§3), driving the stall/repeat-failure heuristics.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttemptOutcome {
    Success,
    Failure,
    Exception,
    Stalled,
    Timeout,
}

impl AttemptOutcome {
    pub fn is_failure_like(self) -> bool {
        matches!(
            self,
            AttemptOutcome::Failure | AttemptOutcome::Exception | AttemptOutcome::Timeout
        )
    }
}

/// One line of history consumed by the Planner prompt and the termination heuristics (§3).
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptRecord {
    pub iteration: u32,
    pub signature: (Operation, String, String),
    pub outcome: AttemptOutcome,
    pub detail: String,
}

impl AttemptRecord {
    pub fn new(
        iteration: u32,
        signature: (Operation, String, String),
        outcome: AttemptOutcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            iteration,
            signature,
            outcome,
            detail: detail.into(),
        }
    }

    /// Rendered for the Planner prompt's "last N history entries" section.
    pub fn summary_line(&self) -> String {
        let (op, selector, value) = &self.signature;
        format!(
            "[{}] {} selector={:?} value={:?} -> {:?}: {}",
            self.iteration, op, selector, value, self.outcome, self.detail
        )
    }
}
