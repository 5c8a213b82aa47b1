//! The override-resolution pipeline.
//!
//! # Data Flow
//! ```text
//! inbound request path
//!     → middleware.rs decide() (pure: pattern match + path resolution)
//!     → Resolution { matched, candidate }
//!     → middleware.rs serve() (single disk read)
//!     → ServeOutcome::{Served, Fallback, PassThrough}
//!     → caller acts: respond with local bytes, or forward upstream
//! ```
//!
//! # Design Decisions
//! - Matching and resolution are pure and deterministic; the only I/O in
//!   the request path is the one candidate read
//! - A resolution escaping the override root is treated as unmatched,
//!   never as a request-visible error
//! - The startup enumeration is reporting-only; serving always re-reads
//!   disk, so the file list going stale cannot produce wrong bytes

pub mod enumerate;
pub mod middleware;
pub mod mirror;
pub mod pattern;
pub mod resolve;

pub use enumerate::enumerate_files;
pub use middleware::{OverrideEngine, Resolution, ServeOutcome};
pub use pattern::{CompiledMatcher, MatchSpec, PatternError};
