//! HTTP presentation layer.
//!
//! Thin plumbing over the core: a start endpoint that kicks off one scan
//! run and returns immediately, a long-lived SSE endpoint that registers
//! the caller as a log subscriber for the lifetime of its connection, and
//! static assets for the bundled UI.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{stream, Stream, StreamExt};
use serde_json::json;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{RunConfig, ServerConfig};
use crate::services::{LogBroadcaster, ScanService};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    scanner: Arc<ScanService>,
    log: LogBroadcaster,
}

impl AppState {
    /// Creates state with a scanner publishing into `log`.
    pub fn new(log: LogBroadcaster) -> Self {
        Self {
            scanner: Arc::new(ScanService::new(log.clone())),
            log,
        }
    }
}

/// Builds the application router.
pub fn router(config: &ServerConfig, state: AppState) -> Router {
    Router::new()
        .route("/api/start", post(start))
        .route("/logs", get(logs))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves the application until the process exits.
pub async fn serve(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = router(&config, state);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Server starting on http://{}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Starts one scan run in the background and acknowledges immediately.
///
/// A run that later fails publishes an `Error: ...` line to the log
/// stream; it is not reported on this response.
async fn start(State(state): State<AppState>, Json(config): Json<RunConfig>) -> impl IntoResponse {
    if let Err(e) = config.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    let scanner = Arc::clone(&state.scanner);
    let log = state.log.clone();
    tokio::spawn(async move {
        if let Err(e) = scanner.run(&config).await {
            log.publish(format!("Error: {}", e));
        }
    });

    Json(json!({ "status": "started" })).into_response()
}

/// Streams log events to the caller for the lifetime of the connection.
///
/// Dropping the connection drops the subscription; it does not cancel any
/// run in progress.
async fn logs(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.log.subscribe();

    let greeting =
        stream::once(async { Ok::<_, Infallible>(log_event("Connected to log stream")) });
    let updates = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(message) => return Some((Ok(log_event(&message)), rx)),
                // A lagged subscriber lost old entries; keep streaming.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(greeting.chain(updates)).keep_alive(KeepAlive::default())
}

fn log_event(message: &str) -> Event {
    Event::default().data(json!({ "type": "log", "message": message }).to_string())
}
