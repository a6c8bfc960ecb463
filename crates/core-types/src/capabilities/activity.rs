//! §6.5 ActivityLog sink contract and the event payload it carries.

use crate::ActivityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityRole {
    Intent,
    Outcome,
    Warning,
    Stall,
    Timeout,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One append-only ActivityLog entry (§4.5).
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub activity_id: ActivityId,
    pub role: ActivityRole,
    pub severity: Severity,
    pub message: String,
    pub attachments: Vec<String>,
}

impl ActivityEvent {
    pub fn new(
        activity_id: ActivityId,
        role: ActivityRole,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            activity_id,
            role,
            severity,
            message: message.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachments.push(attachment.into());
        self
    }
}

/// Fire-and-forget sink: `emit` must never block the interaction loop.
pub trait ActivitySink: Send + Sync {
    fn emit(&self, event: ActivityEvent);
}
