//! HTTP server setup and the request path.
//!
//! # Responsibilities
//! - Create the Axum router: reload WebSocket endpoint + catch-all handler
//! - Run the override decision per request
//! - Forward undecided requests to the origin via a shared hyper client
//! - Serve with graceful shutdown
//!
//! The override core never produces a request-visible error: the worst case
//! a client sees is the unmodified origin response, or a 502 when the
//! origin itself is unreachable.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{header, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::overrides::{mirror, OverrideEngine, ServeOutcome};
use crate::reload::hub::ReloadHub;
use crate::reload::ws::reload_socket;

/// Path of the reload WebSocket endpoint.
pub const RELOAD_ENDPOINT: &str = "/__overrides__/reload";

/// Largest origin body mirror mode will buffer. Responses that are bigger,
/// or whose length is unknown (chunked), are streamed through unmirrored.
const MIRROR_BUFFER_LIMIT: usize = 16 * 1024 * 1024;

/// Application state injected into handlers. Everything here is read-only
/// after startup; the request path holds no lock.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub engine: Arc<OverrideEngine>,
    pub hub: Arc<ReloadHub>,
    pub client: Client<HttpConnector, Body>,
}

/// The proxy/dev server.
pub struct ProxyServer {
    router: Router,
}

impl ProxyServer {
    pub fn new(settings: Arc<Settings>, engine: Arc<OverrideEngine>, hub: Arc<ReloadHub>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            settings,
            engine,
            hub,
            client,
        };

        let router = Router::new()
            .route(RELOAD_ENDPOINT, get(reload_socket))
            .fallback(override_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Serve until ctrl-c.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let address = listener.local_addr()?;
        tracing::info!(%address, "override proxy listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

/// Catch-all handler: decide serve / fallback / pass-through.
async fn override_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();
    let resolution = state.engine.decide(&path);
    tracing::trace!(path = %resolution.cleaned_path, matched = resolution.matched, "override decision");

    match state.engine.serve(&resolution).await {
        ServeOutcome::Served { body, content_type } => {
            let mut response = (StatusCode::OK, body).into_response();
            if let Ok(value) = HeaderValue::from_str(&content_type) {
                response.headers_mut().insert(header::CONTENT_TYPE, value);
            }
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            response
        }
        ServeOutcome::Fallback { local_path } => {
            let mirror_to = state.settings.mirror.then_some(local_path);
            forward_upstream(&state, request, mirror_to).await
        }
        ServeOutcome::PassThrough => forward_upstream(&state, request, None).await,
    }
}

/// Forward a request to the origin, rewriting scheme and authority.
///
/// With `mirror_to` set, a successful origin body of known, bounded length
/// is buffered, handed to a detached mirror write, and delivered to the
/// client unchanged. Bodies that cannot be buffered are streamed through
/// and simply not mirrored; mirroring never fails the response.
async fn forward_upstream(
    state: &AppState,
    request: Request<Body>,
    mirror_to: Option<std::path::PathBuf>,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let authority = state.settings.target.authority();
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = match Authority::from_str(authority) {
        Ok(authority) => Some(authority),
        Err(error) => {
            tracing::error!(%error, target = %state.settings.target, "invalid origin authority");
            return (StatusCode::BAD_GATEWAY, "Invalid origin authority").into_response();
        }
    };
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(error) => {
            tracing::error!(%error, "failed to rewrite upstream uri");
            return (StatusCode::BAD_GATEWAY, "Invalid upstream request").into_response();
        }
    };

    // virtual-hosted origins route on Host
    if let Ok(host) = HeaderValue::from_str(authority) {
        parts.headers.insert(header::HOST, host);
    }

    let request = Request::from_parts(parts, body);
    match state.client.request(request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();

            if let Some(local_path) = mirror_to {
                // buffering is decided up front: a miss here must never turn
                // a healthy origin response into an error
                if mirrorable(&parts) {
                    return match axum::body::to_bytes(Body::new(body), MIRROR_BUFFER_LIMIT).await {
                        Ok(bytes) => {
                            mirror::spawn_persist(local_path, bytes.clone());
                            Response::from_parts(parts, Body::from(bytes))
                        }
                        // the origin connection died mid-body
                        Err(error) => {
                            tracing::error!(%error, "origin body failed while buffering for mirror");
                            (StatusCode::BAD_GATEWAY, "Upstream body failed").into_response()
                        }
                    };
                }
                tracing::debug!(status = %parts.status, "origin response not mirrorable, streaming through");
            }

            Response::from_parts(parts, Body::new(body))
        }
        Err(error) => {
            tracing::error!(%error, target = %state.settings.target, "upstream request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Only successful origin responses with a known length inside the buffer
/// limit are worth persisting; everything else streams through unchanged.
fn mirrorable(parts: &axum::http::response::Parts) -> bool {
    if !parts.status.is_success() {
        return false;
    }
    parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .is_some_and(|length| length <= MIRROR_BUFFER_LIMIT)
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
