use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{header, Request, Response, StatusCode},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Span;

use crate::session::SESSION_COOKIE;
use crate::state::AppState;
use crate::{analysis, session};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(session::router())
        .merge(analysis::router(state.clone()))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(log_response),
        )
}

/// Span per request. The query string is left out: `/?token=` carries a key.
fn request_span(req: &Request<Body>) -> Span {
    let has_session = req
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(SESSION_COOKIE));
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        path = req.uri().path(),
        has_session,
        status = tracing::field::Empty,
    )
}

fn log_response(res: &Response<Body>, latency: Duration, span: &Span) {
    let status = res.status();
    span.record("status", status.as_u16());
    let ms = latency.as_millis() as u64;
    match status {
        s if s.is_server_error() => tracing::error!(%status, ms, "request failed"),
        StatusCode::TOO_MANY_REQUESTS => tracing::info!(ms, "request throttled"),
        s if s.is_client_error() => tracing::warn!(%status, ms, "request rejected"),
        _ => tracing::debug!(%status, ms, "request done"),
    }
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
