use envconfig::Envconfig;
use rollcall_common::env::Mode;
use uuid::Uuid;

#[derive(Envconfig)]
pub(crate) struct Env {
    #[cfg_attr(
        debug_assertions,
        envconfig(from = "APP_MODE", default = "development")
    )]
    #[cfg_attr(
        not(debug_assertions),
        envconfig(from = "APP_MODE", default = "production")
    )]
    pub mode: Mode,

    /// Stable identifier reported to the server. Generated when unset.
    #[envconfig(from = "CLIENT_ID", default = "")]
    pub client_id: String,

    #[envconfig(from = "SERVER_HOST", default = "127.0.0.1")]
    pub server_host: String,

    #[envconfig(from = "SERVER_PORT", default = "8080")]
    pub server_port: u16,

    #[envconfig(from = "HEARTBEAT_INTERVAL", default = "30")]
    pub heartbeat_interval_secs: u64,

    #[envconfig(from = "POLL_INTERVAL", default = "10")]
    pub poll_interval_secs: u64,

    #[envconfig(from = "REPORT_INTERVAL", default = "15")]
    pub report_interval_secs: u64,

    #[envconfig(from = "STATS_REFRESH_INTERVAL", default = "60")]
    pub stats_refresh_interval_secs: u64,
}

impl Env {
    /// Well-known TLS ports get the https scheme, matching deployments that
    /// terminate TLS in front of the server.
    pub fn api_base_url(&self) -> String {
        match self.server_port {
            443 | 8443 => format!("https://{}/api", self.server_host),
            port => format!("http://{}:{}/api", self.server_host, port),
        }
    }

    pub fn resolve_client_id(&self) -> String {
        if self.client_id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            self.client_id.trim().to_string()
        }
    }
}

pub(crate) fn init() -> anyhow::Result<Env> {
    let config = Env::init_from_env()?;
    Ok(config)
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
