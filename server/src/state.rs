use crate::env::Env;
use crate::registry::Registry;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) env: Arc<Env>,
    pub(crate) registry: Arc<RwLock<Registry>>,
}

impl AppState {
    pub(crate) fn new(env: Arc<Env>) -> Self {
        Self {
            env,
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }
}
