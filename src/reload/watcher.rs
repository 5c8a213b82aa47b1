//! File watcher bridging filesystem changes into the reload hub.
//!
//! # Responsibilities
//! - Watch the override root recursively via `notify`
//! - Filter to files matching the configured glob, minus ignored paths
//! - Debounce per-file bursts (editors fire several events per save)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::overrides::pattern::CompiledMatcher;
use crate::reload::hub::ReloadHub;

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Start watching `root`, forwarding qualifying changes into the hub.
///
/// The returned watcher must be kept alive for the process lifetime;
/// dropping it stops change delivery.
pub fn start_watcher(
    root: &Path,
    matcher: CompiledMatcher,
    hub: Arc<ReloadHub>,
) -> Result<RecommendedWatcher, notify::Error> {
    let root_owned = root.to_path_buf();
    let mut last_event: Option<(PathBuf, Instant)> = None;

    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| match result {
            Ok(event) => {
                if !is_change(&event) {
                    return;
                }
                for path in &event.paths {
                    let Some(relative) = qualify(path, &root_owned, &matcher) else {
                        continue;
                    };

                    let now = Instant::now();
                    if let Some((last_path, last_time)) = &last_event {
                        if last_path == path && now.duration_since(*last_time) < DEBOUNCE_WINDOW {
                            continue;
                        }
                    }
                    last_event = Some((path.clone(), now));

                    hub.notify_change(&relative);
                }
            }
            Err(error) => tracing::error!(%error, "file watch error"),
        },
        Config::default().with_poll_interval(POLL_INTERVAL),
    )?;

    watcher.watch(root, RecursiveMode::Recursive)?;
    tracing::info!(root = %root.display(), "file watcher started");
    Ok(watcher)
}

fn is_change(event: &Event) -> bool {
    event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()
}

/// Return the root-relative path when the change should trigger a reload.
fn qualify(path: &Path, root: &Path, matcher: &CompiledMatcher) -> Option<PathBuf> {
    let relative = path.strip_prefix(root).ok()?;
    if matcher.is_ignored(relative) || is_hidden(relative) {
        return None;
    }
    if !matcher.matches_file(relative) {
        return None;
    }
    Some(relative.to_path_buf())
}

/// Hidden files and directories (editor swap files, `.git`) never trigger
/// a reload, independent of the configured ignore globs.
fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
    })
}
