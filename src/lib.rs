//! Local-override development proxy.
//!
//! Point it at a remote site and edit that site's static assets locally:
//! requests whose paths match the configured glob are answered with bytes
//! from a local directory, everything else is reverse-proxied to the
//! origin, and connected browser sessions are told to reload when a local
//! file changes.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────┐
//!                       │                OVERRIDE PROXY                  │
//!                       │                                                │
//!   Request ────────────┼─▶ http/server ──▶ overrides/middleware         │
//!                       │                     │ decide(): pattern match  │
//!                       │                     │           + path resolve │
//!                       │          ┌──────────┴──────────┐               │
//!   Local bytes ◀───────┼── Served │                     │ Fallback /    │
//!                       │          │                     │ PassThrough   │
//!   Origin bytes ◀──────┼──────────┼───── hyper client ◀─┘───────────────┼──▶ Origin
//!                       │                                                │
//!                       │  reload/watcher ──▶ reload/hub ──▶ reload/ws ──┼──▶ Browser
//!                       │  (notify events)    (broadcast)   (WebSocket)  │    sessions
//!                       └───────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod overrides;
pub mod reload;
