use crate::state::AppState;
use chrono::Utc;
use log::{debug, info};

/// Periodic offline sweep so statuses stay fresh even when nobody lists.
pub(crate) async fn sweep_stale_clients(state: &AppState) {
    let timeout = state.env.heartbeat_timeout();

    let mut registry = state.registry.write().await;
    let marked = registry.sweep_offline(timeout, Utc::now());

    if marked > 0 {
        info!("maintenance: marked {marked} clients offline");
    } else {
        debug!("maintenance: all clients fresh");
    }
}
