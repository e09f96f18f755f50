use crate::env;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use rollcall_common::api::envelope::Envelope;
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

pub(crate) fn build_cors(state: &AppState) -> CorsLayer {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if !state.env.mode.is_production() {
        cors = cors.allow_origin(Any);
    } else if let Some(origin) = state
        .env
        .access_control_allowed_origin
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| HeaderValue::from_str(s).ok())
    {
        cors = cors.allow_origin(origin);
    }

    cors
}

pub(crate) fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope::ok(data))
}

pub(crate) fn reject(
    status: StatusCode,
    msg: impl Into<String>,
) -> (StatusCode, Json<Envelope<serde_json::Value>>) {
    (status, Json(Envelope::failure(msg)))
}

pub(crate) async fn get_version() -> impl IntoResponse {
    Json(json!({
        "version": env::version(),
    }))
}

pub(crate) async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.registry.read().await;
    Json(json!({
        "stats": registry.stats(),
    }))
}
