//! Path resolution.
//!
//! Maps a cleaned request path onto a candidate file inside the override
//! root. Pure path arithmetic: no filesystem access happens here, so the
//! result is deterministic for a given request path and configuration.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Strip the query (and fragment) from a raw request path.
///
/// Matching and mapping operate on the path component only, so cache-busting
/// queries like `style.css?v=123` cannot affect the outcome. Axum's `Uri`
/// already separates the query; the split here keeps the guarantee even for
/// callers handing in raw strings.
pub fn clean_path(raw: &str) -> &str {
    raw.split(['?', '#']).next().unwrap_or(raw)
}

/// Map a cleaned request path to a candidate local path.
///
/// The first textual occurrence of `prefix` is removed and the remainder is
/// joined onto `root`, normalizing `.` and `..` lexically. Returns `None`
/// when the result would escape the root (crafted `..` sequences) or when a
/// segment percent-decodes to invalid UTF-8; callers treat both as
/// unmatched.
///
/// Known limitation, kept on purpose: if the prefix text also appears
/// earlier in the path than the intended segment (repeated directory
/// names), the earlier occurrence is the one stripped.
pub fn resolve(cleaned_path: &str, prefix: &str, root: &Path) -> Option<PathBuf> {
    let remainder: Cow<'_, str> = if prefix.is_empty() {
        Cow::Borrowed(cleaned_path)
    } else {
        Cow::Owned(cleaned_path.replacen(prefix, "", 1))
    };
    join_confined(root, &remainder)
}

/// Join a request path onto the root, refusing to step above it.
///
/// Segments are percent-decoded individually and decoded segments are split
/// again, so an encoded separator (`%2F..%2F`) cannot smuggle a traversal
/// past the `..` accounting.
fn join_confined(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut depth: usize = 0;

    for raw_segment in request_path.split('/') {
        let decoded = percent_decode_str(raw_segment).decode_utf8().ok()?;
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if depth == 0 {
                        return None;
                    }
                    resolved.pop();
                    depth -= 1;
                }
                other => {
                    resolved.push(other);
                    depth += 1;
                }
            }
        }
    }

    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_strings_are_stripped() {
        assert_eq!(clean_path("/a/b.css?cachebust=123"), "/a/b.css");
        assert_eq!(clean_path("/a/b.css"), "/a/b.css");
        assert_eq!(clean_path("/a/b.css#section"), "/a/b.css");
    }

    #[test]
    fn joins_onto_root_without_prefix() {
        let root = Path::new("/srv/local");
        assert_eq!(
            resolve("/a/b.css", "", root),
            Some(PathBuf::from("/srv/local/a/b.css"))
        );
    }

    #[test]
    fn strips_the_configured_prefix() {
        let root = Path::new("./local");
        assert_eq!(
            resolve("/wp-content/themes/demo/style.css", "wp-content/themes/demo", root),
            Some(PathBuf::from("./local/style.css"))
        );
    }

    #[test]
    fn strips_only_the_first_occurrence() {
        let root = Path::new("/srv/local");
        // "demo" appears twice; the leftmost occurrence is removed
        assert_eq!(
            resolve("/demo/assets/demo/style.css", "demo", root),
            Some(PathBuf::from("/srv/local/assets/demo/style.css"))
        );
    }

    #[test]
    fn traversal_attempts_escape_nothing() {
        let root = Path::new("/srv/local");
        assert_eq!(resolve("/../etc/passwd", "", root), None);
        assert_eq!(resolve("/a/../../etc/passwd", "", root), None);
        assert_eq!(resolve("/%2e%2e/etc/passwd", "", root), None);
        assert_eq!(resolve("/a/%2e%2e%2f%2e%2e/etc/passwd", "", root), None);
    }

    #[test]
    fn dotdot_inside_the_root_is_normalized() {
        let root = Path::new("/srv/local");
        assert_eq!(
            resolve("/a/b/../c.css", "", root),
            Some(PathBuf::from("/srv/local/a/c.css"))
        );
    }

    #[test]
    fn percent_encoded_segments_are_decoded() {
        let root = Path::new("/srv/local");
        assert_eq!(
            resolve("/my%20theme/style.css", "", root),
            Some(PathBuf::from("/srv/local/my theme/style.css"))
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let root = Path::new("/srv/local");
        let first = resolve("/a/b.css", "", root);
        for _ in 0..3 {
            assert_eq!(resolve("/a/b.css", "", root), first);
        }
    }

    #[test]
    fn empty_segments_are_collapsed() {
        let root = Path::new("/srv/local");
        // prefix stripping leaves a double slash behind
        assert_eq!(
            resolve("//style.css", "", root),
            Some(PathBuf::from("/srv/local/style.css"))
        );
    }
}
