use crate::env::Env;
use log::{debug, info, warn};
use rollcall_client::{ApiError, Assignment, ControlClient, ProgressReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Poll for assignments and serve them out, one at a time.
pub(crate) fn spawn(
    api: ControlClient,
    client_id: String,
    config: Arc<Env>,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match api.poll_assignment(&client_id).await {
                Ok(Some(assignment)) => {
                    info!(
                        "assignment {} received: {}s on {}",
                        assignment.id, assignment.total_duration_secs, assignment.target
                    );
                    if serve_assignment(&api, &assignment, &config, &mut shutdown).await {
                        info!("worker shutting down");
                        return;
                    }
                }
                Ok(None) => debug!("no open assignment"),
                Err(err) => warn!("assignment poll failed: {err}"),
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(config.poll_interval_secs)) => {}
                _ = shutdown.recv() => {
                    info!("worker shutting down");
                    return;
                }
            }
        }
    })
}

/// Serve the assignment's duration, reporting progress on the report
/// interval. Returns true when interrupted by shutdown.
async fn serve_assignment(
    api: &ControlClient,
    assignment: &Assignment,
    config: &Arc<Env>,
    shutdown: &mut broadcast::Receiver<()>,
) -> bool {
    let mut elapsed = assignment.elapsed_secs;

    while elapsed < assignment.total_duration_secs {
        let step = config
            .report_interval_secs
            .min(assignment.total_duration_secs - elapsed);

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(step)) => {}
            _ = shutdown.recv() => return true,
        }

        elapsed += step;

        let report = ProgressReport {
            assignment_id: assignment.id,
            elapsed_secs: elapsed,
        };
        match api.report_progress(&report).await {
            Ok(_) => debug!("reported {elapsed}/{}s", assignment.total_duration_secs),
            Err(ApiError::Api { message, .. }) => {
                // The server no longer tracks this assignment; stop serving it.
                warn!("progress rejected: {message}");
                return false;
            }
            Err(err) => warn!("progress report failed: {err}"),
        }
    }

    info!("assignment {} served", assignment.id);
    false
}
