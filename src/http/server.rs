//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Serve the bundled assets under `/assets/`
//! - Wire up middleware (tracing, compression, timeout, request ID)
//! - Serve on an already-bound listener until told to drain

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::assets;
use crate::{APP_DESCRIPTION, APP_DISPLAY_NAME};

/// Per-request deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// HTTP server for the file browser.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server bound to the resolved configuration.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let state = AppState { config };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/health", get(health))
            .merge(assets::routes())
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(CompressionLayer::new())
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        REQUEST_TIMEOUT,
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Accept connections on `listener` until `drain` is cancelled, then stop
    /// accepting and wait for in-flight requests.
    pub async fn serve(self, listener: TcpListener, drain: CancellationToken) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(drain.cancelled_owned())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
struct IndexResponse {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    paths: Vec<String>,
}

async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        name: APP_DISPLAY_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: APP_DESCRIPTION,
        paths: state.config.enabled_paths().map(|p| p.name.clone()).collect(),
    })
}

async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "healthy" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathEntry;

    #[tokio::test]
    async fn serves_health_and_index_until_drained() {
        let mut config = AppConfig::default();
        config.paths.push(PathEntry {
            name: "docs".into(),
            path: "/srv/docs".into(),
            disabled: false,
        });
        config.paths.push(PathEntry {
            name: "hidden".into(),
            path: "/srv/hidden".into(),
            disabled: true,
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let drain = CancellationToken::new();
        let server = HttpServer::new(Arc::new(config));
        let handle = tokio::spawn(server.serve(listener, drain.clone()));

        let client = reqwest::Client::builder().no_proxy().build().unwrap();

        let health = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(health.status(), 200);
        assert!(health.headers().contains_key("x-request-id"));

        let index: serde_json::Value = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(index["name"], "Viewr");
        assert_eq!(index["paths"], serde_json::json!(["docs"]));

        drain.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn assets_are_cached_and_compressed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let drain = CancellationToken::new();
        let server = HttpServer::new(Arc::new(AppConfig::default()));
        let handle = tokio::spawn(server.serve(listener, drain.clone()));

        let client = reqwest::Client::builder().no_proxy().build().unwrap();

        let css = client
            .get(format!("http://{}/assets/css/viewr.css", addr))
            .header("accept-encoding", "gzip")
            .send()
            .await
            .unwrap();
        assert_eq!(css.status(), 200);
        assert_eq!(css.headers()["cache-control"], assets::CACHE_CONTROL);
        assert_eq!(css.headers()["content-encoding"], "gzip");
        assert!(css.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/css"));

        let plain = client
            .get(format!("http://{}/assets/css/viewr.css", addr))
            .send()
            .await
            .unwrap();
        assert!(!plain.headers().contains_key("content-encoding"));
        assert!(plain.text().await.unwrap().contains("--accent"));

        let missing = client
            .get(format!("http://{}/assets/nope.js", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 404);

        drain.cancel();
        handle.await.unwrap().unwrap();
    }
}
