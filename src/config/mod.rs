//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI arguments (clap)  ─┐
//! config file (TOML)    ─┼─→ merge.rs (explicit precedence: CLI > file > default)
//! built-in defaults     ─┘        │
//!                                 ▼
//!                         Settings (validated, immutable)
//!                                 │
//!                          shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once merged; there is no hot reload of the
//!   proxy configuration (restart to pick up changes)
//! - Every option has a built-in default except `target`, which is required
//! - Merging is a pure function tested independently of the network layer

pub mod cli;
pub mod loader;
pub mod merge;
pub mod schema;

pub use cli::Options;
pub use loader::{load_file_config, ConfigError};
pub use merge::merge;
pub use schema::{FileConfig, Settings};
