#[cfg(feature = "api")]
pub mod api;

#[cfg(feature = "env")]
pub mod env;

#[cfg(feature = "ip")]
pub mod ip;

#[cfg(feature = "logger")]
pub mod logger;

#[cfg(feature = "stats")]
pub mod stats;
