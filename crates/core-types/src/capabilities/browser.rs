//! §6.1 Browser capability.
//!
//! Expressed as one `Browser` trait plus a `Locator` handle returned by
//! `Browser::locator`, the way `perceiver-structural`/`action-locator` split a
//! resolver trait from the handle it hands back.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BrowserError {
    #[error("navigation failed: {0}")]
    NavigationFailed(String),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("element not found: {0}")]
    NotFound(String),
    #[error("element not enabled: {0}")]
    NotEnabled(String),
    #[error("browser or page is closed")]
    Closed,
    #[error("browser error: {0}")]
    Other(String),
}

impl BrowserError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BrowserError::Timeout(_) | BrowserError::NotFound(_))
    }
}

/// DOM/visibility state a `WaitFor` call can block on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl std::str::FromStr for WaitState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "visible" => WaitState::Visible,
            "hidden" => WaitState::Hidden,
            "attached" => WaitState::Attached,
            "detached" => WaitState::Detached,
            _ => return Err(()),
        })
    }
}

/// Page load-state strategies the navigation cascade walks through (§4.3, §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    DomContentLoaded,
    Load,
    NetworkIdle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

/// Identity-hardening options applied at context creation (§6.1).
#[derive(Debug, Clone)]
pub struct BrowserContextOptions {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub locale: String,
    pub timezone: String,
}

impl Default for BrowserContextOptions {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            viewport: (1920, 1080),
            locale: "en-US".to_string(),
            timezone: "America/New_York".to_string(),
        }
    }
}

/// A handle bound to one selector (or text query), mirroring Playwright's
/// `Locator` object as the spec's §6.1 contract describes it.
#[async_trait]
pub trait Locator: Send + Sync {
    async fn wait_for(&self, state: WaitState, timeout: Duration) -> Result<(), BrowserError>;
    async fn click(&self, timeout: Duration, force: bool) -> Result<(), BrowserError>;
    async fn fill(&self, value: &str, timeout: Duration) -> Result<(), BrowserError>;
    async fn input_value(&self) -> Result<String, BrowserError>;
    async fn select_option(&self, value_or_label: &str, timeout: Duration) -> Result<(), BrowserError>;
    async fn text_content(&self, timeout: Duration) -> Result<String, BrowserError>;
    async fn is_enabled(&self) -> Result<bool, BrowserError>;
    async fn scroll_into_view_if_needed(&self, timeout: Duration) -> Result<(), BrowserError>;
    async fn count(&self) -> Result<usize, BrowserError>;
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn goto(&self, url: &str, wait_until: LoadState, timeout: Duration) -> Result<(), BrowserError>;
    async fn current_url(&self) -> Result<String, BrowserError>;
    async fn content(&self, timeout: Duration) -> Result<String, BrowserError>;
    async fn evaluate(&self, js: &str) -> Result<serde_json::Value, BrowserError>;
    fn locator(&self, selector: &str) -> Box<dyn Locator>;
    /// `GetByText` variant: matches visible text, `exact` disables substring matching.
    fn get_by_text(&self, text: &str, exact: bool) -> Box<dyn Locator>;
    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> Result<(), BrowserError>;
    async fn press_key(&self, key: &str) -> Result<(), BrowserError>;
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, BrowserError>;
    async fn cookies(&self) -> Result<Vec<Cookie>, BrowserError>;
    async fn add_cookies(&self, cookies: &[Cookie]) -> Result<(), BrowserError>;
    /// Runs `action` while awaiting a download triggered by it; returns the saved path.
    async fn expect_download(
        &self,
        timeout: Duration,
        action: Pin<Box<dyn Future<Output = Result<(), BrowserError>> + Send + 'static>>,
    ) -> Result<String, BrowserError>;
    async fn apply_identity_hardening(&self, options: &BrowserContextOptions) -> Result<(), BrowserError>;
}
