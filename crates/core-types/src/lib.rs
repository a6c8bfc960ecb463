#![allow(dead_code)]

//! Shared identifiers, the §3 data model, and the §6 capability contracts.
//!
//! This crate is the leaf of the workspace: `page-observer`, `action-executor`
//! and `planner` all depend on it but never on each other.

pub mod capabilities;
pub mod ids;
pub mod model;

pub use capabilities::*;
pub use ids::*;
pub use model::*;

use thiserror::Error;

/// Catch-all error used only at glue points that don't own a richer enum.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("{message}")]
    Message { message: String },
}

impl CoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}
