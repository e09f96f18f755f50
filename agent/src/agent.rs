use crate::env::Env;
use crate::worker;
use log::{info, warn};
use rollcall_client::ControlClient;
use rollcall_common::stats::Stats;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;

pub(crate) async fn start(config: Env) -> anyhow::Result<()> {
    info!("running agent on {} mode", config.mode);

    let client_id = config.resolve_client_id();
    let api = ControlClient::new(config.api_base_url())?;
    info!("agent {client_id} reporting to {}", api.base_url());

    let config = Arc::new(config);
    let (shutdown_tx, _) = broadcast::channel(1);

    let heartbeat_task = spawn_heartbeat(
        api.clone(),
        client_id.clone(),
        config.heartbeat_interval_secs,
        shutdown_tx.subscribe(),
    );
    let worker_task = worker::spawn(
        api,
        client_id,
        Arc::clone(&config),
        shutdown_tx.subscribe(),
    );
    let stats_task = spawn_stats_logger(config.stats_refresh_interval_secs, shutdown_tx.subscribe());

    let shutdown_signal = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("failed to listen for shutdown signal: {}", err);
        } else {
            info!("ctrl+c pressed, shutting down");
        }
    };

    tokio::select! {
        _ = heartbeat_task => warn!("heartbeat task ended"),
        _ = worker_task => warn!("worker task ended"),
        _ = stats_task => warn!("stats logger task ended"),
        _ = shutdown_signal => info!("shutdown signal received"),
    }

    let _ = shutdown_tx.send(());

    info!("waiting for tasks to shut down gracefully...");
    tokio::time::sleep(Duration::from_millis(500)).await;

    Ok(())
}

fn spawn_heartbeat(
    api: ControlClient,
    client_id: String,
    interval_secs: u64,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut failures: u32 = 0;

        loop {
            match api.send_heartbeat(&client_id).await {
                Ok(_) => {
                    if failures > 0 {
                        info!("heartbeat recovered after {failures} failures");
                    }
                    failures = 0;
                }
                Err(err) => {
                    failures = failures.saturating_add(1);
                    warn!("heartbeat failed: {err}");
                }
            }

            // Failed heartbeats retry on a short capped backoff instead of
            // waiting out the full interval.
            let delay = if failures == 0 {
                Duration::from_secs(interval_secs)
            } else {
                Duration::from_secs(2u64.saturating_pow(failures.min(4)))
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.recv() => {
                    info!("heartbeat shutting down");
                    break;
                }
            }
        }
    })
}

fn spawn_stats_logger(
    stats_refresh_interval: u64,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(stats_refresh_interval));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match Stats::gather() {
                        Some(stats) => info!("agent stats\n{}", stats.log_line()),
                        None => warn!("stats: unable to read process metrics"),
                    }
                }
                _ = shutdown.recv() => {
                    info!("stats logger shutting down");
                    break;
                }
            }
        }
    })
}
