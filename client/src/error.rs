use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or payload decoding failure, passed through from the transport.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("server returned {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
    },

    /// The server answered with a failure envelope.
    #[error("api error (code {code}): {message}")]
    Api { code: i32, message: String },

    #[error("success envelope carried no data")]
    MissingData,

    #[error("invalid base url")]
    InvalidBaseUrl,
}
