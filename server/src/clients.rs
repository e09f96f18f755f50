use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_client_ip::ClientIp;
use chrono::Utc;
use log::{debug, info};
use rollcall_common::api::StatusAck;
use rollcall_common::api::clients::{HeartbeatRequest, ListClientsParams, RemoveOfflineResult};

use crate::http::{ok, reject};
use crate::state::AppState;

pub(crate) async fn heartbeat(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Json(req): Json<HeartbeatRequest>,
) -> Response {
    let ip = rollcall_common::ip::extract_ip_from_headers(&headers).unwrap_or(ip);

    let mut registry = state.registry.write().await;
    registry.heartbeat(&req.client_id, ip, Utc::now());
    debug!("heartbeat from {} ({ip})", req.client_id);

    ok(StatusAck::success()).into_response()
}

pub(crate) async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListClientsParams>,
) -> Response {
    let mut registry = state.registry.write().await;

    // Statuses are derived from heartbeat recency at read time.
    let marked = registry.sweep_offline(state.env.heartbeat_timeout(), Utc::now());
    if marked > 0 {
        info!("marked {marked} clients offline");
    }

    ok(registry.page_clients(params.page, params.page_size)).into_response()
}

pub(crate) async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Response {
    let registry = state.registry.read().await;
    match registry.get_client(&client_id) {
        Some(record) => ok(record).into_response(),
        None => reject(StatusCode::NOT_FOUND, "client not found").into_response(),
    }
}

pub(crate) async fn remove_offline_clients(State(state): State<AppState>) -> Response {
    let mut registry = state.registry.write().await;
    let deleted_count = registry.remove_offline();
    info!("removed {deleted_count} offline clients");

    ok(RemoveOfflineResult {
        status: "success".to_string(),
        deleted_count,
    })
    .into_response()
}
