//! Configuration schema definitions.
//!
//! `FileConfig` is the on-disk shape (every field optional, so a config file
//! can set just the keys it cares about). `Settings` is the merged runtime
//! configuration handed to the rest of the process.

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

/// Default glob when neither the CLI nor the config file selects one.
pub const DEFAULT_FILES: &str = "**/*.css";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".override-proxyrc.toml";

/// Paths never considered for overriding or watching.
pub fn default_ignore() -> Vec<String> {
    vec![
        "node_modules/**".to_string(),
        "bower_components/**".to_string(),
        ".git/**".to_string(),
        "**/.DS_Store".to_string(),
    ]
}

/// Raw configuration read from a TOML file.
///
/// All fields are optional; missing keys fall through to the CLI value or
/// the built-in default during merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Origin site to proxy, e.g. `example.com`.
    pub target: Option<String>,

    /// Root of the local override tree.
    pub directory: Option<PathBuf>,

    /// Glob selecting which request paths are eligible for override.
    pub files: Option<String>,

    /// Path segment between the domain and the matched files.
    pub prefix: Option<String>,

    /// Listening port.
    pub port: Option<u16>,

    /// Auto-open a browser session pointed at the proxy.
    pub open: Option<bool>,

    /// Persist origin responses for matched-but-missing local files.
    pub mirror: Option<bool>,

    /// Diagnostic verbosity (0-3).
    pub verbose: Option<u8>,

    /// Extra ignore globs, replacing the built-in list when set.
    pub ignore: Option<Vec<String>>,
}

/// Merged, immutable runtime configuration.
///
/// Built once at startup by [`crate::config::merge`]; no component reads
/// ambient process-wide state after that.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Origin URL proxied when a request is not overridden.
    pub target: Url,

    /// Root of the local override tree.
    pub directory: PathBuf,

    /// Glob selecting which request paths are eligible for override.
    pub files: String,

    /// Path segment stripped from the request path before joining onto
    /// `directory`. Empty means requests map directly onto the root.
    pub prefix: String,

    /// Listening port.
    pub port: u16,

    /// Auto-open a browser session on startup.
    pub open: bool,

    /// Persist origin responses on fallback.
    pub mirror: bool,

    /// Diagnostic verbosity (0 = quiet, 1 = debug, 2 = chatty, 3+ = spam).
    pub verbosity: u8,

    /// Globs excluded from enumeration and watching.
    pub ignore: Vec<String>,
}
