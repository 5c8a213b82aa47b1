//! Startup: parse and merge configuration, compile the override pattern,
//! enumerate local files, then serve.
//!
//! Exit codes: 0 on normal shutdown, 1 on any startup configuration error
//! (invalid pattern, missing or invalid target, unreadable override root) —
//! reported before the listener is bound.

use std::process::Command;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use override_proxy::config::{self, Options, Settings};
use override_proxy::http::ProxyServer;
use override_proxy::overrides::{
    enumerate_files, CompiledMatcher, MatchSpec, OverrideEngine,
};
use override_proxy::reload::{start_watcher, ReloadHub};

#[tokio::main]
async fn main() {
    let options = Options::parse();

    let file_config = match config::load_file_config(&options) {
        Ok(file_config) => file_config,
        Err(error) => fail(&error.to_string()),
    };
    let settings = match config::merge(&options, &file_config) {
        Ok(settings) => settings,
        Err(error) => fail(&error.to_string()),
    };

    init_tracing(settings.verbosity);

    tracing::info!("Target: {}", settings.target);
    tracing::info!("Directory: {}", settings.directory.display());
    tracing::info!("Path prefix: {}", settings.prefix);
    tracing::info!("Files to inject: {}", settings.files);
    tracing::info!("Mirror matching files: {}", settings.mirror);

    let spec = MatchSpec::from_settings(&settings);
    let matcher = match CompiledMatcher::compile(&spec) {
        Ok(matcher) => matcher,
        Err(error) => fail(&error.to_string()),
    };
    tracing::debug!(expr = matcher.request_expr(), "compiled override pattern");

    let found = match enumerate_files(&settings.directory, &matcher) {
        Ok(found) => found,
        Err(error) => fail(&error.to_string()),
    };
    tracing::info!("Found {} files to serve:", found.len());
    for file in &found {
        tracing::info!("  {}", file.display());
    }

    let settings = Arc::new(settings);
    let hub = Arc::new(ReloadHub::new());
    let engine = OverrideEngine::new(&settings, matcher.clone());

    // must stay alive for the process lifetime
    let _watcher = match start_watcher(&settings.directory, matcher, hub.clone()) {
        Ok(watcher) => Some(watcher),
        Err(error) => {
            tracing::warn!(%error, "file watcher unavailable, reload notifications disabled");
            None
        }
    };

    let listener = match TcpListener::bind(("127.0.0.1", settings.port)).await {
        Ok(listener) => listener,
        Err(error) => fail(&format!("failed to bind port {}: {error}", settings.port)),
    };

    if settings.open {
        open_browser(&format!("http://localhost:{}", settings.port));
    }

    let server = ProxyServer::new(settings.clone(), engine, hub);
    if let Err(error) = server.run(listener).await {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }
}

/// Report a fatal startup error and exit before any listener is bound.
fn fail(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

/// Map the verbosity tiers onto a tracing filter, unless RUST_LOG is set.
fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "override_proxy=info",
        1 => "override_proxy=debug",
        2 => "override_proxy=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Open the proxied site in the default browser.
///
/// Platform-specific: `open` on macOS, `start` on Windows, `xdg-open`
/// elsewhere.
fn open_browser(url: &str) {
    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => tracing::info!(url, "opened browser"),
        Err(error) => tracing::warn!(%error, "failed to open browser"),
    }
}
