//! §6.4 Memory-ingest capability (optional). Used only by `scrape_to_memory`;
//! if absent, the operation fails with `missing_capability`.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum MemoryIngestError {
    #[error("ingest failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait MemoryIngest: Send + Sync {
    async fn ingest_current_page(&self, url: &str, conversation_id: &str) -> Result<(), MemoryIngestError>;
}
