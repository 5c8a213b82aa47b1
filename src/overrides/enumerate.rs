//! Startup file enumeration.
//!
//! Walks the override root once so the operator can see which files the
//! configured glob picks up. The per-request path never consults this list;
//! serving always re-reads disk, so there is no staleness window between
//! enumeration and request time.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::overrides::pattern::CompiledMatcher;

/// Unreadable override root. Fatal at startup.
#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("cannot read override directory {path}: {source}")]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List files under `root` matching the files glob, minus ignored paths,
/// in discovery order. Relative to `root`.
pub fn enumerate_files(
    root: &Path,
    matcher: &CompiledMatcher,
) -> Result<Vec<PathBuf>, EnumerateError> {
    // surface the unreadable-root case eagerly; walkdir reports it lazily
    std::fs::read_dir(root).map_err(|source| EnumerateError::UnreadableRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    let walker = WalkDir::new(root).follow_links(false).into_iter();
    for entry in walker.filter_entry(|e| {
        e.path()
            .strip_prefix(root)
            .map(|rel| rel.as_os_str().is_empty() || !matcher.is_ignored(rel))
            .unwrap_or(false)
    }) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(%error, "skipping unreadable entry during enumeration");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if matcher.matches_file(relative) {
            found.push(relative.to_path_buf());
        }
    }

    Ok(found)
}
