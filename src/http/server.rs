use crate::app::App;
use crate::config::BridgeMode;
use crate::constants::network::JSON_CONTENT_TYPE;
use crate::errors::BridgeError;
use crate::services::request::IncomingRequest;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

fn json_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", any(bridge_handler))
        .route("/bridge", any(bridge_handler))
        .route("/health", get(health_handler))
        .route("/actions", get(actions_handler))
        .with_state(app)
}

/// Always 200: the outcome lives in the JSON `ok` field.
async fn bridge_handler(
    State(app): State<Arc<App>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let parsed = IncomingRequest::from_http_parts(query.as_deref(), content_type, &body);
    let response = app.bridge.respond(parsed).await;
    json_response(response.to_json_pretty())
}

async fn health_handler(State(app): State<Arc<App>>) -> Response {
    let body = serde_json::json!({
        "ok": true,
        "mode": app.config.mode.as_str(),
        "actions": app.registry.len(),
        "log": app.logger.stats(),
    });
    json_response(serde_json::to_string_pretty(&body).unwrap_or_default())
}

async fn actions_handler(State(app): State<Arc<App>>) -> Response {
    json_response(serde_json::to_string_pretty(&app.registry.to_json()).unwrap_or_default())
}

/// Diagnostic mode discloses internals, so it only listens on loopback.
pub fn resolve_bind_address(raw: &str, mode: BridgeMode) -> Result<SocketAddr, BridgeError> {
    let parsed: SocketAddr = raw
        .trim()
        .parse()
        .map_err(|err| BridgeError::config(format!("invalid listen address '{}': {}", raw, err)))?;
    if mode == BridgeMode::Diagnostic && !parsed.ip().is_loopback() {
        return Err(BridgeError::config(
            "diagnostic mode must bind to a loopback address",
        ));
    }
    Ok(parsed)
}

pub async fn serve<F>(app: Arc<App>, listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let logger = app.logger.child("http");
    if let Ok(addr) = listener.local_addr() {
        logger.info("listening", Some(&serde_json::json!({ "addr": addr.to_string() })));
    }
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown)
        .await?;
    logger.info("stopped", None);
    Ok(())
}
