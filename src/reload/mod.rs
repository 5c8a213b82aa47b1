//! Browser reload notification subsystem.
//!
//! # Data Flow
//! ```text
//! filesystem change (notify)
//!     → watcher.rs (ignore filter + debounce)
//!     → hub.rs broadcast
//!     → ws.rs, one JSON frame per connected browser session
//!     → session re-fetches, hitting the override middleware again
//! ```
//!
//! # Design Decisions
//! - Best-effort delivery only: sessions connecting after an event do not
//!   receive a replay, and a lagging session skips ahead
//! - No coalescing beyond the watcher's per-file debounce window

pub mod hub;
pub mod watcher;
pub mod ws;

pub use hub::{ReloadEvent, ReloadHub};
pub use watcher::start_watcher;
