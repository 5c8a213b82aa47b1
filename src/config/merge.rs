//! Layered configuration merging.
//!
//! # Responsibilities
//! - Combine CLI arguments, config file values, and built-in defaults
//! - One documented precedence rule: CLI > config file > default
//! - Validate and normalize the target URL
//!
//! # Design Decisions
//! - Merging is a pure function: (Options, FileConfig) → Result<Settings>
//! - Boolean flags are additive: a flag the CLI did not set cannot switch
//!   off a `true` in the config file; `--no-open` exists for that
//! - `prefix` defaults to empty rather than guessing from the working
//!   directory

use std::path::PathBuf;

use url::Url;

use crate::config::cli::Options;
use crate::config::loader::ConfigError;
use crate::config::schema::{default_ignore, FileConfig, Settings, DEFAULT_FILES, DEFAULT_PORT};

/// Merge CLI options over file config over built-in defaults.
pub fn merge(cli: &Options, file: &FileConfig) -> Result<Settings, ConfigError> {
    let target_raw = cli
        .target
        .clone()
        .or_else(|| file.target.clone())
        .ok_or(ConfigError::MissingTarget)?;
    let target = parse_target(&target_raw)?;

    let directory = cli
        .directory
        .clone()
        .or_else(|| file.directory.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let files = cli
        .files
        .clone()
        .or_else(|| file.files.clone())
        .unwrap_or_else(|| DEFAULT_FILES.to_string());

    let prefix = cli
        .prefix
        .clone()
        .or_else(|| file.prefix.clone())
        .unwrap_or_default()
        .trim_matches('/')
        .to_string();

    let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);

    // --no-open wins when both are given
    let open = if cli.no_open {
        false
    } else {
        cli.open || file.open.unwrap_or(false)
    };

    let mirror = cli.mirror || file.mirror.unwrap_or(false);

    let verbosity = if cli.verbose > 0 {
        cli.verbose
    } else {
        file.verbose.unwrap_or(0)
    };

    let ignore = file.ignore.clone().unwrap_or_else(default_ignore);

    Ok(Settings {
        target,
        directory,
        files,
        prefix,
        port,
        open,
        mirror,
        verbosity,
        ignore,
    })
}

/// Accept anything that looks like a hostname (`a.b`) or `localhost`,
/// normalized to an `http://` URL when no scheme is given.
///
/// TLS origins are out of scope for the upstream client, so an explicit
/// `https://` target is rejected up front rather than failing per request.
fn parse_target(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingTarget);
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url =
        Url::parse(&with_scheme).map_err(|_| ConfigError::InvalidTarget(raw.to_string()))?;

    if url.scheme() != "http" {
        return Err(ConfigError::InvalidTarget(raw.to_string()));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::InvalidTarget(raw.to_string()))?;
    let looks_like_host = host == "localhost"
        || host.parse::<std::net::IpAddr>().is_ok()
        || host.trim_matches('.').contains('.');
    if !looks_like_host {
        return Err(ConfigError::InvalidTarget(raw.to_string()));
    }

    Ok(url)
}
