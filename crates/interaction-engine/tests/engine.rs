//! End-to-end scenarios over `InteractionEngine` with hand-written
//! `Browser`/`LlmProvider` doubles, matching the §8 concrete scenarios.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use webagent_core_types::{
    Browser, BrowserContextOptions, BrowserError, Cookie, LlmError, LlmProvider, LoadState, Locator, WaitState,
};
use webagent_interaction_engine::{ActivityLog, Config, InteractionEngine, TerminationReason};

#[derive(Clone)]
struct PageState {
    url: String,
    html: String,
    cookies: Vec<Cookie>,
}

struct SelectorLocator {
    input_value: Mutex<String>,
}

#[async_trait]
impl Locator for SelectorLocator {
    async fn wait_for(&self, _state: WaitState, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn click(&self, _timeout: std::time::Duration, _force: bool) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn fill(&self, value: &str, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        *self.input_value.lock().unwrap() = value.to_string();
        Ok(())
    }
    async fn input_value(&self) -> Result<String, BrowserError> {
        Ok(self.input_value.lock().unwrap().clone())
    }
    async fn select_option(&self, _value_or_label: &str, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn text_content(&self, _timeout: std::time::Duration) -> Result<String, BrowserError> {
        Ok(String::new())
    }
    async fn is_enabled(&self) -> Result<bool, BrowserError> {
        Ok(true)
    }
    async fn scroll_into_view_if_needed(&self, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn count(&self) -> Result<usize, BrowserError> {
        Ok(1)
    }
}

struct TextLocator {
    text: String,
    state: Arc<Mutex<PageState>>,
    transitions: Arc<HashMap<String, (String, String)>>,
}

#[async_trait]
impl Locator for TextLocator {
    async fn wait_for(&self, _state: WaitState, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn click(&self, _timeout: std::time::Duration, _force: bool) -> Result<(), BrowserError> {
        if let Some((url, html)) = self.transitions.get(&self.text) {
            let mut state = self.state.lock().unwrap();
            state.url = url.clone();
            state.html = html.clone();
        }
        Ok(())
    }
    async fn fill(&self, _value: &str, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn input_value(&self) -> Result<String, BrowserError> {
        Ok(String::new())
    }
    async fn select_option(&self, _value_or_label: &str, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn text_content(&self, _timeout: std::time::Duration) -> Result<String, BrowserError> {
        Ok(self.text.clone())
    }
    async fn is_enabled(&self) -> Result<bool, BrowserError> {
        Ok(true)
    }
    async fn scroll_into_view_if_needed(&self, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn count(&self) -> Result<usize, BrowserError> {
        let state = self.state.lock().unwrap();
        Ok(if state.html.contains(&self.text) { 1 } else { 0 })
    }
}

/// A browser double whose `html`/`url` only move in response to a scripted
/// `press_key("Enter")` transition or a scripted click-by-text transition,
/// so tests can steer page-change detection deterministically.
struct MockBrowser {
    state: Arc<Mutex<PageState>>,
    text_transitions: Arc<HashMap<String, (String, String)>>,
    enter_transition: Mutex<Option<(String, String)>>,
}

impl MockBrowser {
    fn new(url: &str, html: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(PageState {
                url: url.to_string(),
                html: html.to_string(),
                cookies: Vec::new(),
            })),
            text_transitions: Arc::new(HashMap::new()),
            enter_transition: Mutex::new(None),
        }
    }

    fn with_enter_transition(self, url: &str, html: &str) -> Self {
        *self.enter_transition.lock().unwrap() = Some((url.to_string(), html.to_string()));
        self
    }

    fn with_text_transition(mut self, text: &str, url: &str, html: &str) -> Self {
        Arc::get_mut(&mut self.text_transitions)
            .expect("no clones taken yet")
            .insert(text.to_string(), (url.to_string(), html.to_string()));
        self
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn goto(&self, url: &str, _wait_until: LoadState, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        self.state.lock().unwrap().url = url.to_string();
        Ok(())
    }
    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.state.lock().unwrap().url.clone())
    }
    async fn content(&self, _timeout: std::time::Duration) -> Result<String, BrowserError> {
        Ok(self.state.lock().unwrap().html.clone())
    }
    async fn evaluate(&self, _js: &str) -> Result<serde_json::Value, BrowserError> {
        Ok(serde_json::Value::String(self.state.lock().unwrap().html.clone()))
    }
    fn locator(&self, _selector: &str) -> Box<dyn Locator> {
        Box::new(SelectorLocator {
            input_value: Mutex::new(String::new()),
        })
    }
    fn get_by_text(&self, text: &str, _exact: bool) -> Box<dyn Locator> {
        Box::new(TextLocator {
            text: text.to_string(),
            state: self.state.clone(),
            transitions: self.text_transitions.clone(),
        })
    }
    async fn wait_for_load_state(&self, _state: LoadState, _timeout: std::time::Duration) -> Result<(), BrowserError> {
        Ok(())
    }
    async fn press_key(&self, key: &str) -> Result<(), BrowserError> {
        if key.eq_ignore_ascii_case("enter") {
            if let Some((url, html)) = self.enter_transition.lock().unwrap().take() {
                let mut state = self.state.lock().unwrap();
                state.url = url;
                state.html = html;
            }
        }
        Ok(())
    }
    async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>, BrowserError> {
        Ok(Vec::new())
    }
    async fn cookies(&self) -> Result<Vec<Cookie>, BrowserError> {
        Ok(self.state.lock().unwrap().cookies.clone())
    }
    async fn add_cookies(&self, cookies: &[Cookie]) -> Result<(), BrowserError> {
        self.state.lock().unwrap().cookies.extend(cookies.iter().cloned());
        Ok(())
    }
    async fn expect_download(
        &self,
        _timeout: std::time::Duration,
        _action: std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), BrowserError>> + Send + 'static>>,
    ) -> Result<String, BrowserError> {
        Ok(String::new())
    }
    async fn apply_identity_hardening(&self, _options: &BrowserContextOptions) -> Result<(), BrowserError> {
        Ok(())
    }
}

/// Returns one scripted response per call, recording the rendered prompt
/// it was given, in call order.
struct ScriptedLlm {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    prompts_seen: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn prompt(&self, _template_name: &str, args: &str) -> Result<String, LlmError> {
        self.prompts_seen.lock().unwrap().push(args.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::Failed("no more scripted responses".into()));
        }
        responses.remove(0)
    }
}

/// Always returns the same response, however many times it's called.
struct EchoLlm(String);

#[async_trait]
impl LlmProvider for EchoLlm {
    async fn prompt(&self, _template_name: &str, _args: &str) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

fn step_xml(operation: &str, selector: &str, value: &str) -> String {
    format!(
        "<answer><interaction><step><operation>{operation}</operation><selector>{selector}</selector>\
         <value>{value}</value><description>test</description></step></interaction></answer>"
    )
}

fn engine(browser: Arc<dyn Browser>, llm: Arc<dyn LlmProvider>, config: Config) -> InteractionEngine {
    InteractionEngine::new(browser, llm, None, None, ActivityLog::new(16), "conv-1", config)
}

#[tokio::test]
async fn happy_path_search_terminates_with_done() {
    let browser = Arc::new(
        MockBrowser::new(
            "https://duckduckgo.com",
            r#"<html><body><input id="q" name="q" /></body></html>"#,
        )
        .with_enter_transition(
            "https://duckduckgo.com/?q=AGiXT",
            r#"<html><body><a href="https://github.com/Josh-XT/AGiXT">AGiXT - GitHub</a></body></html>"#,
        )
        .with_text_transition(
            "AGiXT - GitHub",
            "https://github.com/Josh-XT/AGiXT",
            "<html><body><h1>AGiXT</h1></body></html>",
        ),
    );
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok(step_xml("fill", "#q", "AGiXT")),
        Ok(step_xml("press", "", "Enter")),
        Ok(step_xml("click", "", "AGiXT - GitHub")),
        Ok(step_xml("done", "", "")),
    ]));

    let engine = engine(browser, llm, Config::minimal());
    let report = engine
        .run("Search DuckDuckGo for AGiXT and click the top result", "https://duckduckgo.com")
        .await;

    assert_eq!(report.termination_reason, TerminationReason::Done);
    assert!(report.is_success());
    assert_eq!(report.iteration_count, 4);
}

#[tokio::test]
async fn fill_without_submit_reminder_is_rendered_on_the_next_plan() {
    let browser = Arc::new(MockBrowser::new(
        "https://duckduckgo.com",
        r#"<html><body><input id="q" name="q" /></body></html>"#,
    ));
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok(step_xml("fill", "#q", "rust")),
        Ok(step_xml("respond", "", "done searching")),
    ]));

    let engine = engine(browser, llm.clone(), Config::minimal());
    let report = engine.run("search for rust", "https://duckduckgo.com").await;

    assert_eq!(report.termination_reason, TerminationReason::Respond);
    let prompts = llm.prompts_seen.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("REMINDER:"));
    assert!(prompts[1].contains("press Enter"));
}

#[tokio::test]
async fn stall_detection_terminates_after_five_non_changing_presses() {
    // press never transitions the page: url and content digest stay constant,
    // yet each individual press succeeds. Scenario 3: non-extended threshold (5).
    let browser = Arc::new(MockBrowser::new(
        "https://example.test",
        "<html><body><h1>static</h1></body></html>",
    ));
    let llm = Arc::new(EchoLlm(step_xml("press", "", "Enter")));

    let engine = engine(browser, llm, Config::minimal().stalled_plan_threshold(5));
    let report = engine.run("press enter repeatedly", "https://example.test").await;

    assert_eq!(report.termination_reason, TerminationReason::Stalled);
    assert_eq!(report.iteration_count, 5);
}

#[tokio::test]
async fn iteration_cap_never_reports_more_than_max_iterations() {
    // A distinct, successful, non-terminating `fill` each iteration, so
    // neither the stall nor the repeat-failure checks can fire first:
    // the run must exhaust the iteration cap instead.
    let browser = Arc::new(MockBrowser::new(
        "https://example.test",
        "<html><body><h1>static</h1></body></html>",
    ));
    let responses: Vec<Result<String, LlmError>> = (0..25)
        .map(|i| Ok(step_xml("fill", &format!("#f{i}"), "x")))
        .collect();
    let llm = Arc::new(ScriptedLlm::new(responses));

    let engine = engine(browser, llm, Config::minimal());
    let report = engine.run("click the button", "https://example.test").await;

    assert_eq!(report.termination_reason, TerminationReason::IterationCapReached);
    assert!(report.iteration_count <= 25);
    assert_eq!(report.iteration_count, 25);
}

#[tokio::test]
async fn planner_xml_repair_executes_without_a_retry() {
    let browser = Arc::new(MockBrowser::new(
        "https://example.test",
        "<html><body><h1>hi</h1></body></html>",
    ));
    let fenced = format!("Sure, here you go:\n```xml\n{}\n```\nLet me know if that works.", step_xml("done", "", ""));
    let llm = Arc::new(ScriptedLlm::new(vec![Ok(fenced)]));

    let engine = engine(browser, llm.clone(), Config::minimal());
    let report = engine.run("finish immediately", "https://example.test").await;

    assert_eq!(report.termination_reason, TerminationReason::Done);
    assert_eq!(llm.prompts_seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn planner_three_strike_timeout_terminates_fatally_after_one_iteration() {
    let browser = Arc::new(MockBrowser::new(
        "https://example.test",
        "<html><body><h1>hi</h1></body></html>",
    ));
    let never_responds = Arc::new(HangingLlm);

    let config = Config::minimal().planning_timeout(std::time::Duration::from_millis(20));
    let engine = engine(browser, never_responds, config);
    let report = engine.run("do something slow", "https://example.test").await;

    assert_eq!(report.termination_reason, TerminationReason::Fatal);
    assert_eq!(report.iteration_count, 1);
    assert!(report.fatal_detail.as_deref().unwrap_or("").contains("timed out"));
}

#[tokio::test]
async fn caller_initiated_cancellation_unblocks_a_hanging_planner_call() {
    // `planning_timeout` is generous so only the cancellation, not the
    // planner's own timeout, can explain an early `Cancelled` result.
    let browser = Arc::new(MockBrowser::new(
        "https://example.test",
        "<html><body><h1>hi</h1></body></html>",
    ));
    let never_responds = Arc::new(HangingLlm);
    let config = Config::minimal().planning_timeout(std::time::Duration::from_secs(60));
    let engine = Arc::new(engine(browser, never_responds, config));
    let token = engine.cancellation_token();

    let run_engine = engine.clone();
    let handle = tokio::spawn(async move { run_engine.run("do something slow", "https://example.test").await });

    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    token.cancel();

    let report = handle.await.unwrap();
    assert_eq!(report.termination_reason, TerminationReason::Cancelled);
}

struct HangingLlm;

#[async_trait]
impl LlmProvider for HangingLlm {
    async fn prompt(&self, _template_name: &str, _args: &str) -> Result<String, LlmError> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

#[tokio::test]
async fn cookie_round_trip_through_set_then_get() {
    let browser = Arc::new(MockBrowser::new(
        "https://x.test",
        "<html><body><h1>hi</h1></body></html>",
    ));
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok(step_xml(
            "set_cookies",
            "",
            "[{\"name\":\"sid\",\"value\":\"abc\",\"domain\":\".x.test\",\"path\":\"/\"}]",
        )),
        Ok(step_xml("get_cookies", "", "sid")),
        Ok(step_xml("done", "", "")),
    ]));

    let engine = engine(browser, llm, Config::minimal());
    let report = engine.run("set and read a cookie", "https://x.test").await;

    assert_eq!(report.termination_reason, TerminationReason::Done);
    let get_record = &report.history[1];
    assert!(get_record.detail.contains("abc"));
}
