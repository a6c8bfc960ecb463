//! §4.2 PageObserver: page-state extraction feeding the Planner.

pub mod digest;
pub mod errors;
pub mod extract;
pub mod observer;
pub mod selector;
pub mod snapshot;

pub use digest::content_digest;
pub use errors::ObserveError;
pub use observer::PageObserver;
pub use selector::{build_stable_selector, is_stable_selector};
pub use snapshot::{FieldDescriptor, FieldInventory, FieldKind, PageSnapshot};
