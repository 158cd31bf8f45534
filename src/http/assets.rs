//! Static assets compiled into the binary, served under `/assets/`.

use axum::{
    extract::Path,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Browsers may keep assets for a day.
pub const CACHE_CONTROL: &str = "public, max-age=86400";

struct Asset {
    path: &'static str,
    content_type: &'static str,
    body: &'static [u8],
}

const ASSETS: &[Asset] = &[
    Asset {
        path: "css/viewr.css",
        content_type: "text/css; charset=utf-8",
        body: include_bytes!("../../assets/web/css/viewr.css"),
    },
    Asset {
        path: "icons/logo.svg",
        content_type: "image/svg+xml",
        body: include_bytes!("../../assets/web/icons/logo.svg"),
    },
    Asset {
        path: "robots.txt",
        content_type: "text/plain; charset=utf-8",
        body: include_bytes!("../../assets/web/robots.txt"),
    },
];

fn lookup(path: &str) -> Option<&'static Asset> {
    let path = path.trim_start_matches('/');
    ASSETS.iter().find(|asset| asset.path == path)
}

/// Routes for the bundled assets, with caching headers on every response.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/assets/{*path}", get(serve_asset))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL),
        ))
        .layer(SetResponseHeaderLayer::appending(
            header::VARY,
            HeaderValue::from_static("accept-encoding"),
        ))
}

async fn serve_asset(Path(path): Path<String>) -> Response {
    match lookup(&path) {
        Some(asset) => (
            [(header::CONTENT_TYPE, asset.content_type)],
            asset.body,
        )
            .into_response(),
        None => {
            tracing::debug!(path = %path, "Unknown asset requested");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
