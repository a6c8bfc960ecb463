//! §4.4 Planner: one LLM call per iteration, hard timeout, corrective retry.

use std::sync::Arc;
use std::time::Duration;

use webagent_core_types::{LlmError, LlmProvider, Step};

use crate::errors::PlannerError;
use crate::prompt::PlanningContext;
use crate::xml::{extract_xml_block, parse_step};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_SLEEP: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub planning_timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            planning_timeout: Duration::from_secs(90),
        }
    }
}

pub struct Planner {
    llm: Arc<dyn LlmProvider>,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(llm: Arc<dyn LlmProvider>, config: PlannerConfig) -> Self {
        Self { llm, config }
    }

    /// §4.4: build the prompt, call the LLM under a hard timeout, extract and
    /// validate the XML plan, retrying with a corrective prompt up to 3 total
    /// attempts on `malformed` or `planner_timeout`. `LlmError::Failed` is not
    /// retried and escalates immediately.
    pub async fn next_step(&self, context: &PlanningContext) -> Result<Step, PlannerError> {
        let mut previous_error: Option<String> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let prompt = match &previous_error {
                Some(err) => context.render_corrective(err),
                None => context.render(),
            };

            let raw = match tokio::time::timeout(self.config.planning_timeout, self.llm.prompt("plan", &prompt)).await
            {
                Ok(Ok(text)) => text,
                Ok(Err(LlmError::Timeout)) => {
                    if attempt == MAX_ATTEMPTS {
                        return Err(PlannerError::Timeout);
                    }
                    tokio::time::sleep(RETRY_SLEEP).await;
                    previous_error = Some("the previous planning call timed out".to_string());
                    continue;
                }
                Ok(Err(LlmError::Failed(detail))) => return Err(PlannerError::LlmFailed(detail)),
                Err(_elapsed) => {
                    if attempt == MAX_ATTEMPTS {
                        return Err(PlannerError::Timeout);
                    }
                    tokio::time::sleep(RETRY_SLEEP).await;
                    previous_error = Some("the previous planning call timed out".to_string());
                    continue;
                }
            };

            match extract_xml_block(&raw).and_then(|block| parse_step(&block)) {
                Ok(step) => return Ok(step),
                Err(err) => {
                    if attempt == MAX_ATTEMPTS {
                        return Err(PlannerError::Malformed {
                            attempts: attempt,
                            detail: err.to_string(),
                        });
                    }
                    previous_error = Some(err.to_string());
                }
            }
        }

        Err(PlannerError::Malformed {
            attempts: MAX_ATTEMPTS,
            detail: "exhausted retries".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use webagent_core_types::AttemptRecord;

    use super::*;

    fn context() -> PlanningContext {
        PlanningContext {
            task: "log in and search for rust".into(),
            iteration: 1,
            max_iterations: 50,
            current_url: "https://example.test".into(),
            url_changed: false,
            stable_selectors: vec!["#q".into()],
            clickable_texts: vec!["Search".into()],
            field_inventory_rendered: "input: selector=#q label=Search".into(),
            history: Vec::<AttemptRecord>::new(),
        }
    }

    struct ScriptedLlm {
        responses: Vec<Result<String, LlmError>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn prompt(&self, _template_name: &str, _args: &str) -> Result<String, LlmError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(idx)
                .cloned()
                .unwrap_or_else(|| Err(LlmError::Failed("no more scripted responses".into())))
        }
    }

    fn valid_click_xml() -> String {
        "<answer><interaction><step><operation>click</operation><selector>#go</selector>\
         <value></value><description>go</description></step></interaction></answer>"
            .to_string()
    }

    #[tokio::test]
    async fn returns_step_on_first_clean_response() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(valid_click_xml())]));
        let planner = Planner::new(llm);
        let step = planner.next_step(&context()).await.unwrap();
        assert_eq!(step.selector, "#go");
    }

    #[tokio::test]
    async fn retries_after_malformed_response_then_succeeds() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("not xml at all".to_string()),
            Ok(valid_click_xml()),
        ]));
        let planner = Planner::new(llm);
        let step = planner.next_step(&context()).await.unwrap();
        assert_eq!(step.selector, "#go");
    }

    #[tokio::test]
    async fn exhausts_retries_and_reports_malformed() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("nope".to_string()),
            Ok("still nope".to_string()),
            Ok("nope again".to_string()),
        ]));
        let planner = Planner::new(llm);
        let err = planner.next_step(&context()).await.unwrap_err();
        assert!(matches!(err, PlannerError::Malformed { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn llm_failed_escalates_without_retry() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(LlmError::Failed("vendor outage".into()))]));
        let planner = Planner::new(llm);
        let err = planner.next_step(&context()).await.unwrap_err();
        assert!(matches!(err, PlannerError::LlmFailed(detail) if detail == "vendor outage"));
    }

    #[tokio::test]
    async fn llm_timeout_retries_then_succeeds() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(LlmError::Timeout), Ok(valid_click_xml())]));
        let planner = Planner::with_config(
            llm,
            PlannerConfig {
                planning_timeout: Duration::from_secs(90),
            },
        );
        let step = planner.next_step(&context()).await.unwrap();
        assert_eq!(step.selector, "#go");
    }
}
