//! Asynchronous avatar loading for list rows that get recycled.
//!
//! A small pool of render slots shows an arbitrarily long list. For every
//! visible row the render loop calls [`AvatarLoader::request_avatar`]; the
//! loader probes the [`AvatarSource`] cache inline, falls back to a
//! placeholder color plus a background computation, and guarantees that a
//! result computed for an item a slot no longer shows is never painted.

pub mod color;
mod config;
mod error;
pub mod guard;
mod loader;
pub mod registry;
mod source;
mod stats;
mod task;

pub use color::{PlaceholderColor, color_for};
pub use config::LoaderConfig;
pub use error::{ConfigError, Result};
pub use loader::{AvatarLoader, RequestOutcome};
pub use registry::SlotRegistry;
pub use roster_worker::{CancelFlag, PoolError, TaskId, WorkerPool};
pub use source::{AvatarSource, Fetch, Key, RenderSink};
pub use stats::LoaderStats;
pub use task::{AvatarTask, TaskState};
