//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace layer)
//!     → override_handler: OverrideEngine::decide + serve
//!     → Served: respond with local bytes
//!     → Fallback / PassThrough: forward to the origin unchanged
//! ```

pub mod server;

pub use server::{AppState, ProxyServer};
