//! One module per §4.3 operation. Each function takes an [`OpContext`] (the
//! capability handles) and a [`Step`], and returns a short human-readable
//! success message or an [`ExecutorError`]. Screenshot bracketing, digest
//! comparison and retry are all handled by the caller in `executor.rs`.

pub mod content;
pub mod cookies;
pub mod download;
pub mod evaluate;
pub mod extract_text;
pub mod fill_select;
pub mod mfa;
pub mod navigate_click;
pub mod press;
pub mod respond_done;
pub mod screenshot;
pub mod scrape;
pub mod verify_wait;

use std::sync::Arc;

use webagent_core_types::{Browser, MemoryIngest, QrOcr};
use webagent_page_observer::PageObserver;

/// Capability bundle every operation function receives. `qr_ocr` and
/// `memory_ingest` are optional (§6.3, §6.4): absence degrades the
/// operations that need them to a `MissingCapability` failure rather than
/// a panic.
pub struct OpContext {
    pub browser: Arc<dyn Browser>,
    pub qr_ocr: Option<Arc<dyn QrOcr>>,
    pub memory_ingest: Option<Arc<dyn MemoryIngest>>,
    pub page_observer: PageObserver,
    /// Identifies the run for `scrape_to_memory`'s ingest call; the engine
    /// passes its `activity_id` rendered as a string.
    pub conversation_id: String,
}
