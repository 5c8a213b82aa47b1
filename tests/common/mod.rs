//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use override_proxy::config::Settings;
use override_proxy::http::ProxyServer;
use override_proxy::overrides::{CompiledMatcher, MatchSpec, OverrideEngine};
use override_proxy::reload::ReloadHub;

/// Start a mock origin that answers every request with a fixed body.
/// Returns the bound address.
pub async fn start_mock_origin(response: &'static str) -> SocketAddr {
    start_mock_origin_with_body(response.as_bytes().to_vec()).await
}

/// Start a mock origin serving an arbitrary byte body with a Content-Length.
pub async fn start_mock_origin_with_body(body: Vec<u8>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = Arc::new(body);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let body = body.clone();
                    tokio::spawn(async move {
                        let header = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        );
                        let _ = socket.write_all(header.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                        // drain the request until the peer closes; dropping
                        // the socket with unread bytes sends an RST that can
                        // truncate large responses still in flight
                        let mut sink = [0u8; 4096];
                        while matches!(socket.read(&mut sink).await, Ok(n) if n > 0) {}
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Settings pointing at a mock origin, overriding from `directory`.
pub fn test_settings(origin: SocketAddr, directory: &Path) -> Settings {
    Settings {
        target: Url::parse(&format!("http://{origin}")).unwrap(),
        directory: directory.to_path_buf(),
        files: "**/*.css".to_string(),
        prefix: String::new(),
        port: 0,
        open: false,
        mirror: false,
        verbosity: 0,
        ignore: Vec::new(),
    }
}

/// Spawn the proxy on an ephemeral port and return its address.
pub async fn spawn_proxy(settings: Settings) -> SocketAddr {
    let settings = Arc::new(settings);
    let matcher = CompiledMatcher::compile(&MatchSpec::from_settings(&settings)).unwrap();
    let engine = OverrideEngine::new(&settings, matcher);
    let hub = Arc::new(ReloadHub::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = ProxyServer::new(settings, engine, hub);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    addr
}
