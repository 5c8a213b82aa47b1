//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

/// Serve local files in place of a remote site's assets while you edit them.
#[derive(Debug, Default, Parser)]
#[command(name = "override-proxy", version)]
#[command(after_help = "EXAMPLE:\n  override-proxy --prefix wp-content/themes/my-theme example.com")]
pub struct Options {
    /// Origin site to proxy, e.g. example.com or localhost:8000
    pub target: Option<String>,

    /// Path to a TOML config file (.override-proxyrc.toml is found automatically)
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Directory where local override files are stored
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Serve (and watch) files matching this glob, e.g. '**/*.css' or 'dist/*.js'
    #[arg(short, long, value_name = "GLOB")]
    pub files: Option<String>,

    /// Path components between the domain and the files you want to match.
    ///
    /// If your target file is example.com/wp-content/themes/my-theme/styles.css,
    /// the prefix is "wp-content/themes/my-theme".
    #[arg(short, long, value_name = "PATH")]
    pub prefix: Option<String>,

    /// Download origin files matching the pattern when no local copy exists yet
    #[arg(short, long)]
    pub mirror: bool,

    /// Auto-open the proxied site in the browser
    #[arg(short, long)]
    pub open: bool,

    /// Don't auto-open the browser (wins over --open and the config file)
    #[arg(short = 'n', long)]
    pub no_open: bool,

    /// Port to serve the proxied site on
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Print extra detail in the console (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
