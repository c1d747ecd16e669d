//! OAuth2 credential acquisition and caching.
//!
//! [`AuthCodeFlow`] drives the interactive authorization-code flow: it hands
//! an authorization URL to the caller, receives the redirect on a local
//! listener, and exchanges the code for a token. [`CachingTokenSource`]
//! wraps any token source with a JSON file cache so a human is only prompted
//! when no cached token exists.

mod callback;
mod flow;
mod token;

pub use flow::{AuthCodeFlow, AuthConfig};
pub use token::{CachingTokenSource, Token, TokenSource};

/// Authorization endpoint of the hosted service.
pub const AUTHORIZE_URL: &str = "https://secure.splitwise.com/oauth/authorize";
/// Token endpoint of the hosted service.
pub const TOKEN_URL: &str = "https://secure.splitwise.com/oauth/token";
/// Redirect URL registered for the local callback listener.
pub const REDIRECT_URL: &str = "http://localhost:4000/auth_redirect";

/// Errors from token acquisition.
///
/// Each condition is fatal for that attempt; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("could not generate CSRF state: {0}")]
    StateGeneration(String),
    #[error("callback listener failed to start: {0}")]
    ListenerBind(#[source] std::io::Error),
    #[error("callback failed: {0}")]
    Callback(String),
    #[error("callback state mismatch")]
    StateMismatch,
    #[error("timed out waiting for the authorization redirect")]
    Timeout,
    #[error("code exchange failed: {0}")]
    Exchange(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("token cache read failed: {0}")]
    CacheRead(#[source] std::io::Error),
    #[error("token cache write failed: {0}")]
    CacheWrite(#[source] std::io::Error),
    #[error("token cache JSON invalid: {0}")]
    CacheDecode(#[source] serde_json::Error),
    #[error("token could not be encoded for the cache: {0}")]
    CacheEncode(#[source] serde_json::Error),
    #[error("no config directory available for the token cache")]
    NoConfigDir,
}
