use axum_client_ip::ClientIpSource;
use envconfig::Envconfig;
use rollcall_common::env::Mode;

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

    #[envconfig(from = "IP_SOURCE", default = "ConnectInfo")]
    pub(crate) ip_source: ClientIpSource,

    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,

    /// Seconds without a heartbeat before a client counts as offline.
    #[envconfig(from = "HEARTBEAT_TIMEOUT", default = "60")]
    pub heartbeat_timeout_secs: u64,

    #[envconfig(from = "SWEEP_INTERVAL", default = "30")]
    pub sweep_interval_secs: u64,

    #[envconfig(from = "ACCESS_CONTROL_ALLOW_ORIGIN")]
    pub access_control_allowed_origin: Option<String>,
}

impl Env {
    pub fn heartbeat_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.heartbeat_timeout_secs as i64)
    }
}

pub fn init() -> anyhow::Result<Env> {
    let config = Env::init_from_env()?;
    Ok(config)
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
