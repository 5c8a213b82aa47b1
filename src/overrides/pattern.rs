//! Pattern compilation.
//!
//! Turns the configured glob plus path prefix into one request-path matcher,
//! compiled exactly once at startup. An invalid pattern is a fatal
//! configuration error: an unintentionally permissive or empty matcher would
//! intercept requests in a way that is hard to diagnose afterwards.

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use thiserror::Error;

use crate::config::Settings;

/// Suffix excluded from override consideration. Browser tooling requests
/// source maps with cache-busting queries that would otherwise satisfy the
/// main pattern and force needless fallbacks.
const EXCLUDED_SUFFIX: &str = ".map";

/// Immutable description of what to intercept.
#[derive(Debug, Clone)]
pub struct MatchSpec {
    /// Glob selecting eligible files, relative to the override root.
    pub files_glob: String,
    /// Path segment between the domain and the matched files, no
    /// surrounding slashes.
    pub prefix: String,
    /// Globs excluded from enumeration and watching.
    pub ignore: Vec<String>,
}

impl MatchSpec {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            files_glob: settings.files.clone(),
            prefix: settings.prefix.clone(),
            ignore: settings.ignore.clone(),
        }
    }
}

/// Pattern compilation failure. Fatal at startup, before the listener binds.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// The runnable form of a [`MatchSpec`]: one predicate over normalized
/// request paths, plus the compiled file and ignore globs used by the
/// enumerator and watcher.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    request_glob: GlobMatcher,
    file_glob: GlobMatcher,
    ignore: GlobSet,
}

impl CompiledMatcher {
    /// Compile a match spec. Called once at startup.
    pub fn compile(spec: &MatchSpec) -> Result<Self, PatternError> {
        let expr = if spec.prefix.is_empty() {
            format!("/{}", spec.files_glob)
        } else {
            format!("/{}/{}", spec.prefix, spec.files_glob)
        };

        let request_glob = compile_glob(&expr)?;
        let file_glob = compile_glob(&spec.files_glob)?;

        let mut ignore = GlobSetBuilder::new();
        for pattern in &spec.ignore {
            ignore.add(
                GlobBuilder::new(pattern)
                    .build()
                    .map_err(|source| PatternError::InvalidGlob {
                        pattern: pattern.clone(),
                        source,
                    })?,
            );
        }
        let ignore = ignore.build().map_err(|source| PatternError::InvalidGlob {
            pattern: spec.ignore.join(", "),
            source,
        })?;

        Ok(Self {
            request_glob,
            file_glob,
            ignore,
        })
    }

    /// The compiled expression matched against request paths.
    pub fn request_expr(&self) -> &str {
        self.request_glob.glob().glob()
    }

    /// Does a cleaned request path qualify for override consideration?
    ///
    /// Source maps never qualify, regardless of the configured glob.
    pub fn matches(&self, cleaned_path: &str) -> bool {
        if cleaned_path.ends_with(EXCLUDED_SUFFIX) {
            return false;
        }
        self.request_glob.is_match(Path::new(cleaned_path))
    }

    /// Does a path relative to the override root match the files glob?
    pub fn matches_file(&self, relative: &Path) -> bool {
        self.file_glob.is_match(relative)
    }

    /// Is a path relative to the override root on the ignore list?
    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.ignore.is_match(relative)
    }
}

fn compile_glob(expr: &str) -> Result<GlobMatcher, PatternError> {
    Ok(GlobBuilder::new(expr)
        .literal_separator(true)
        .build()
        .map_err(|source| PatternError::InvalidGlob {
            pattern: expr.to_string(),
            source,
        })?
        .compile_matcher())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec(files: &str, prefix: &str) -> MatchSpec {
        MatchSpec {
            files_glob: files.to_string(),
            prefix: prefix.to_string(),
            ignore: vec!["node_modules/**".to_string(), "**/.DS_Store".to_string()],
        }
    }

    #[test]
    fn matches_css_at_any_depth_without_prefix() {
        let matcher = CompiledMatcher::compile(&spec("**/*.css", "")).unwrap();
        assert!(matcher.matches("/style.css"));
        assert!(matcher.matches("/a/b/style.css"));
        assert!(!matcher.matches("/script.js"));
    }

    #[test]
    fn prefix_is_part_of_the_request_expression() {
        let matcher =
            CompiledMatcher::compile(&spec("**/*.css", "wp-content/themes/demo")).unwrap();
        assert!(matcher.matches("/wp-content/themes/demo/style.css"));
        assert!(matcher.matches("/wp-content/themes/demo/css/extra.css"));
        assert!(!matcher.matches("/style.css"));
    }

    #[test]
    fn source_maps_never_match() {
        let matcher = CompiledMatcher::compile(&spec("**/*.css*", "")).unwrap();
        assert!(matcher.matches("/style.css"));
        assert!(!matcher.matches("/style.css.map"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = CompiledMatcher::compile(&spec("dist/[unbalanced", "")).unwrap_err();
        assert!(matches!(err, PatternError::InvalidGlob { .. }));
    }

    #[test]
    fn matching_is_deterministic() {
        let matcher = CompiledMatcher::compile(&spec("**/*.css", "assets")).unwrap();
        for _ in 0..3 {
            assert!(matcher.matches("/assets/style.css"));
            assert!(!matcher.matches("/other/style.css"));
        }
    }

    #[test]
    fn ignore_list_covers_nested_paths() {
        let matcher = CompiledMatcher::compile(&spec("**/*.css", "")).unwrap();
        assert!(matcher.is_ignored(&PathBuf::from("node_modules/pkg/a.css")));
        assert!(matcher.is_ignored(&PathBuf::from(".DS_Store")));
        assert!(!matcher.is_ignored(&PathBuf::from("styles/a.css")));
    }

    #[test]
    fn file_glob_matches_relative_paths() {
        let matcher = CompiledMatcher::compile(&spec("**/*.css", "assets")).unwrap();
        assert!(matcher.matches_file(&PathBuf::from("style.css")));
        assert!(matcher.matches_file(&PathBuf::from("css/deep/style.css")));
        assert!(!matcher.matches_file(&PathBuf::from("script.js")));
    }
}
