//! The per-request override decision engine.
//!
//! # Responsibilities
//! - Compose the compiled matcher and the path resolver into one pure
//!   `decide()` step
//! - Perform the single candidate read in `serve()`
//! - Report the outcome as an explicit three-way value; the HTTP layer acts
//!   on it, keeping this module free of any middleware convention
//!
//! # State machine
//! ```text
//! Start ──(no glob match, excluded suffix, or escape)──→ PassThrough
//! Start ──(match + resolution inside root)──→ Matched
//! Matched ──(candidate readable)──→ Served(bytes, content type)
//! Matched ──(candidate missing/unreadable)──→ Fallback
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;

use crate::config::Settings;
use crate::overrides::pattern::CompiledMatcher;
use crate::overrides::resolve::{clean_path, resolve};

/// Outcome of mapping one request path to a local candidate.
///
/// Computed fresh per request from immutable configuration; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The raw request path as received.
    pub request_path: String,
    /// Path component only, query stripped.
    pub cleaned_path: String,
    /// Candidate local path, present only when matched.
    pub candidate: Option<PathBuf>,
    /// Whether the request qualifies for an override attempt. A resolution
    /// escaping the root is reported as unmatched, not as an error.
    pub matched: bool,
}

/// Result of attempting to honor a [`Resolution`].
#[derive(Debug)]
pub enum ServeOutcome {
    /// Local bytes to write to the client, short-circuiting the proxy.
    Served {
        body: Bytes,
        content_type: String,
    },
    /// Matched but no qualifying local file; the origin response is used.
    /// Carries the candidate path so mirror mode knows where to persist.
    Fallback { local_path: PathBuf },
    /// The request did not qualify; forward unchanged.
    PassThrough,
}

/// Per-request decision engine. Holds only read-only state shared across
/// requests; the decision path takes no lock.
#[derive(Debug)]
pub struct OverrideEngine {
    matcher: CompiledMatcher,
    prefix: String,
    root: PathBuf,
}

impl OverrideEngine {
    pub fn new(settings: &Settings, matcher: CompiledMatcher) -> Arc<Self> {
        Arc::new(Self {
            matcher,
            prefix: settings.prefix.clone(),
            root: settings.directory.clone(),
        })
    }

    /// Pure decision: same path in, same resolution out, no I/O.
    pub fn decide(&self, request_path: &str) -> Resolution {
        let cleaned = clean_path(request_path).to_string();

        if !self.matcher.matches(&cleaned) {
            return Resolution {
                request_path: request_path.to_string(),
                cleaned_path: cleaned,
                candidate: None,
                matched: false,
            };
        }

        let candidate = resolve(&cleaned, &self.prefix, &self.root);
        let matched = candidate.is_some();
        if !matched {
            tracing::debug!(path = %cleaned, "resolution escaped the override root, passing through");
        }

        Resolution {
            request_path: request_path.to_string(),
            cleaned_path: cleaned,
            candidate,
            matched,
        }
    }

    /// Attempt to honor a resolution. The one disk read in the request path.
    pub async fn serve(&self, resolution: &Resolution) -> ServeOutcome {
        let Some(candidate) = resolution.candidate.as_ref().filter(|_| resolution.matched) else {
            return ServeOutcome::PassThrough;
        };

        match tokio::fs::read(candidate).await {
            Ok(bytes) => {
                let content_type = mime_guess::from_path(candidate)
                    .first_or_octet_stream()
                    .to_string();
                tracing::info!(path = %candidate.display(), "Proxying local file");
                ServeOutcome::Served {
                    body: Bytes::from(bytes),
                    content_type,
                }
            }
            Err(error) => {
                tracing::info!(
                    path = %candidate.display(),
                    %error,
                    "local file not found, serving original"
                );
                ServeOutcome::Fallback {
                    local_path: candidate.clone(),
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::pattern::MatchSpec;

    fn engine(root: &std::path::Path, files: &str, prefix: &str) -> OverrideEngine {
        let spec = MatchSpec {
            files_glob: files.to_string(),
            prefix: prefix.to_string(),
            ignore: Vec::new(),
        };
        OverrideEngine {
            matcher: CompiledMatcher::compile(&spec).unwrap(),
            prefix: prefix.to_string(),
            root: root.to_path_buf(),
        }
    }

    #[test]
    fn unmatched_paths_carry_no_candidate() {
        let engine = engine(std::path::Path::new("/srv/local"), "**/*.css", "");
        let resolution = engine.decide("/index.html");
        assert!(!resolution.matched);
        assert!(resolution.candidate.is_none());
    }

    #[test]
    fn queries_do_not_affect_the_resolution() {
        let engine = engine(std::path::Path::new("/srv/local"), "**/*.css", "");
        let plain = engine.decide("/a/b.css");
        let mut busted = engine.decide("/a/b.css?cachebust=123");
        assert!(plain.matched);
        // only the raw request path may differ
        busted.request_path = plain.request_path.clone();
        assert_eq!(plain, busted);
    }

    #[test]
    fn traversal_is_reported_as_unmatched() {
        let engine = engine(std::path::Path::new("/srv/local"), "**/*.css", "");
        let resolution = engine.decide("/../escape.css");
        assert!(!resolution.matched);
        assert!(resolution.candidate.is_none());
    }

    #[tokio::test]
    async fn served_bytes_match_the_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a/b.css"), b"body { color: red }").unwrap();

        let engine = engine(dir.path(), "**/*.css", "");
        let resolution = engine.decide("/a/b.css");
        match engine.serve(&resolution).await {
            ServeOutcome::Served { body, content_type } => {
                assert_eq!(&body[..], b"body { color: red }");
                assert_eq!(content_type, "text/css");
            }
            other => panic!("expected Served, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_candidate_is_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(dir.path(), "**/*.css", "");
        let resolution = engine.decide("/missing.css");
        match engine.serve(&resolution).await {
            ServeOutcome::Fallback { local_path } => {
                assert_eq!(local_path, dir.path().join("missing.css"));
            }
            other => panic!("expected Fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unmatched_never_touches_disk() {
        // root that does not exist: a read attempt would error loudly,
        // pass-through must not try
        let engine = engine(std::path::Path::new("/nonexistent-root"), "**/*.css", "");
        let resolution = engine.decide("/page.html");
        assert!(matches!(
            engine.serve(&resolution).await,
            ServeOutcome::PassThrough
        ));
    }
}
