//! Configuration file loading.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::cli::Options;
use crate::config::schema::{FileConfig, DEFAULT_CONFIG_FILE};

/// Errors raised while assembling the runtime configuration.
///
/// All of these are fatal: they are reported to the operator and the process
/// exits with a non-zero status before the listener is bound.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No target was given on the CLI or in the config file.
    #[error("no target given; pass the site to proxy, e.g. `override-proxy example.com`")]
    MissingTarget,

    /// Target does not look like a hostname or localhost.
    #[error("target {0:?} does not look like a hostname or localhost")]
    InvalidTarget(String),
}

/// Load the config file named on the CLI, or the default one if present.
///
/// A missing default file yields an empty config; a missing explicitly named
/// file is an error, since the operator asked for it.
pub fn load_file_config(options: &Options) -> Result<FileConfig, ConfigError> {
    match &options.config_file {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            match read_config(path) {
                Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    Ok(FileConfig::default())
                }
                other => other,
            }
        }
    }
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_default_config_is_empty() {
        let options = Options::default();
        let config = load_file_config(&options).unwrap();
        assert!(config.target.is_none());
        assert!(config.port.is_none());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let options = Options {
            config_file: Some(PathBuf::from("/nonexistent/override-proxyrc.toml")),
            ..Options::default()
        };
        assert!(matches!(
            load_file_config(&options),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn parses_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rc.toml");
        std::fs::write(
            &path,
            "target = \"example.com\"\nport = 3001\nmirror = true\n",
        )
        .unwrap();

        let options = Options {
            config_file: Some(path),
            ..Options::default()
        };
        let config = load_file_config(&options).unwrap();
        assert_eq!(config.target.as_deref(), Some("example.com"));
        assert_eq!(config.port, Some(3001));
        assert_eq!(config.mirror, Some(true));
    }

    #[test]
    fn rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rc.toml");
        std::fs::write(&path, "target = [unclosed").unwrap();

        let options = Options {
            config_file: Some(path),
            ..Options::default()
        };
        assert!(matches!(
            load_file_config(&options),
            Err(ConfigError::Parse { .. })
        ));
    }
}
