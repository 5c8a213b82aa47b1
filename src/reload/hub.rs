//! Reload broadcast channel.

use std::path::Path;

use serde::Serialize;
use tokio::sync::broadcast;

/// A single reload instruction, naming the changed file.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadEvent {
    /// Changed path, relative to the override root where possible.
    pub path: String,
}

/// Fan-out point between the file watcher and connected browser sessions.
///
/// Wraps a broadcast channel: sessions subscribe on WebSocket connect,
/// emission is best-effort to whatever sessions are connected at that
/// moment.
#[derive(Debug)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadEvent>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe a browser session to reload events.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    /// Emit one reload instruction for a changed path. No sessions
    /// connected is not an error.
    pub fn notify_change(&self, path: &Path) {
        let event = ReloadEvent {
            path: path.display().to_string(),
        };
        match self.tx.send(event) {
            Ok(sessions) => {
                tracing::info!(path = %path.display(), sessions, "reload broadcast");
            }
            Err(_) => {
                tracing::debug!(path = %path.display(), "file changed, no browser sessions connected");
            }
        }
    }

    /// Number of currently connected sessions.
    pub fn session_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}
