//! §6.2 LLM capability: an abstraction over vendor backends, grounded in the
//! same shape as the planner/decider trait the agent loop is built on, but
//! returning raw text since the wire format here is untrusted XML the caller
//! must parse (§6.6), not a pre-structured type.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LlmError {
    #[error("LLM call timed out")]
    Timeout,
    #[error("LLM call failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Issue one prompt and return the model's raw text response.
    ///
    /// `template_name` identifies which prompt family the caller is invoking
    /// (e.g. `"plan"`, `"replan"`, `"visual_analysis"`); `args` are the
    /// rendered prompt body. Latency is arbitrary and the call cannot be
    /// remotely cancelled — callers enforce their own timeout (§5).
    async fn prompt(&self, template_name: &str, args: &str) -> Result<String, LlmError>;

    /// Variant used by visual analysis: `args` is accompanied by an opaque
    /// image reference (e.g. a base64 screenshot).
    async fn prompt_with_image(
        &self,
        template_name: &str,
        args: &str,
        image_ref: &str,
    ) -> Result<String, LlmError> {
        let _ = image_ref;
        self.prompt(template_name, args).await
    }
}
