//! §6 external capability contracts: the boundary between this engine and the
//! headless browser, the LLM service, optional QR/OCR, and memory ingestion.

mod activity;
mod browser;
mod llm;
mod memory;
mod qr_ocr;

pub use activity::*;
pub use browser::*;
pub use llm::*;
pub use memory::*;
pub use qr_ocr::*;
