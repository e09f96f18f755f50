use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::clients;
use crate::env::Env;
use crate::http::{build_cors, get_stats, get_version};
use crate::maintenance;
use crate::state::AppState;
use crate::tasks;
use axum::Router;
use axum::routing::{delete, get, post};
use log::{info, warn};
use tokio::signal;
use tokio::sync::broadcast;

pub async fn start(config: Env) -> anyhow::Result<()> {
    info!("running server on {} mode", config.mode);

    let state = AppState::new(Arc::new(config));
    let (shutdown_tx, _) = broadcast::channel(1);

    let http_task = start_http_server(state.clone(), shutdown_tx.subscribe());
    let sweep_task = spawn_sweeper(state, shutdown_tx.subscribe());

    let shutdown_signal = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("failed to listen for shutdown signal: {}", err);
        } else {
            info!("ctrl+c pressed, shutting down");
        }
    };

    tokio::select! {
        _ = http_task => warn!("http task ended"),
        _ = sweep_task => warn!("sweep task ended"),
        _ = shutdown_signal => info!("shutdown signal received"),
    }

    // Tell all tasks to shut down if they have not already received the signal.
    let _ = shutdown_tx.send(());

    Ok(())
}

pub(crate) fn build_router(state: AppState) -> Router {
    let cors = build_cors(&state);
    let ip_source = state.env.ip_source.clone();

    Router::new()
        .route("/api/heartbeat", post(clients::heartbeat))
        .route("/api/clients", get(clients::list_clients))
        .route(
            "/api/clients/offline",
            delete(clients::remove_offline_clients),
        )
        .route("/api/client/{client_id}", get(clients::get_client))
        .route("/api/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/api/tasks/client/{client_id}", get(tasks::poll_assignment))
        .route("/api/tasks/progress", post(tasks::report_progress))
        .route("/api/tasks/error", post(tasks::report_failure))
        .route("/version", get(get_version))
        .route("/stats", get(get_stats))
        .layer(ip_source.into_extension())
        .layer(cors)
        .with_state(state)
}

fn start_http_server(
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let host = format!("{}:{}", state.env.host, state.env.port);

    tokio::spawn(async move {
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(host).await.unwrap();
        info!("listening on: {}", listener.local_addr().unwrap());

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
        .unwrap();
    })
}

fn spawn_sweeper(
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(state.env.sweep_interval_secs));
        loop {
            tokio::select! {
                _ = interval.tick() => maintenance::sweep_stale_clients(&state).await,
                _ = shutdown.recv() => {
                    info!("sweeper shutting down");
                    break;
                }
            }
        }
    })
}
