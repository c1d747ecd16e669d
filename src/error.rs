use crate::api_error::ApiError;

/// Errors returned by API calls.
///
/// Every failure surfaces immediately; nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity does not exist (HTTP 404).
    #[error("not found")]
    NotFound,
    /// The server answered with a status code the client was not expecting.
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
    /// Business-rule errors reported inside a successful response body.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The HTTP request itself failed.
    #[error("http request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The response body was not the expected JSON.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    /// A successful response was missing its expected payload.
    #[error("response missing {0} payload")]
    MissingPayload(&'static str),
}
