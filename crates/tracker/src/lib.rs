// crates/tracker/src/lib.rs
//! Job tracking for asynchronous exam generation.
//!
//! Provides:
//! - `JobTracker` — central manager owning the active job set and event bus
//! - `RegistryStore` / `FileStore` — durable bookkeeping across restarts
//! - `StatusSource` / `HttpSource` — backend job API access
//! - `presenter` — pure rendering of the active set as notification cards

pub mod error;
pub mod events;
pub mod poller;
pub mod presenter;
pub mod registry;
pub mod source;
pub mod tracker;

pub use error::{ClientError, RegistryError};
pub use events::JobEvent;
pub use presenter::{render, CardKind, NotificationCard};
pub use registry::{FileStore, MemoryStore, RegistryStore, StoredJob};
pub use source::{GenerateRequest, HttpSource, StatusSource, UploadFile};
pub use tracker::{JobTracker, TrackerConfig};
