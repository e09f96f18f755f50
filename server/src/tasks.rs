use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use log::debug;
use rollcall_common::api::StatusAck;
use rollcall_common::api::envelope::Envelope;
use rollcall_common::api::tasks::{
    Assignment, CreateTaskRequest, FailureReport, ListTasksParams, ProgressReport,
};

use crate::http::{ok, reject};
use crate::state::AppState;

pub(crate) async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.create_task(&req, Utc::now()) {
        Ok(result) => ok(result).into_response(),
        // Business failures keep HTTP 200 and surface through the envelope.
        Err(err) => reject(StatusCode::OK, err.to_string()).into_response(),
    }
}

pub(crate) async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListTasksParams>,
) -> Response {
    let registry = state.registry.read().await;
    ok(registry.page_tasks(params.page, params.page_size, params.status)).into_response()
}

pub(crate) async fn poll_assignment(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Response {
    let mut registry = state.registry.write().await;
    let assignment = registry.poll_assignment(&client_id, Utc::now());

    if let Some(assignment) = &assignment {
        debug!("assignment {} handed to {client_id}", assignment.id);
    }

    // `data` stays null when the client has nothing open.
    Json(Envelope::<Assignment> {
        code: 0,
        data: assignment,
        msg: None,
    })
    .into_response()
}

pub(crate) async fn report_progress(
    State(state): State<AppState>,
    Json(report): Json<ProgressReport>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.report_progress(&report, Utc::now()) {
        Ok(()) => ok(StatusAck::success()).into_response(),
        Err(err) => reject(StatusCode::OK, err.to_string()).into_response(),
    }
}

pub(crate) async fn report_failure(
    State(state): State<AppState>,
    Json(report): Json<FailureReport>,
) -> Response {
    let mut registry = state.registry.write().await;
    match registry.report_failure(&report, Utc::now()) {
        Ok(()) => ok(StatusAck::success()).into_response(),
        Err(err) => reject(StatusCode::OK, err.to_string()).into_response(),
    }
}
