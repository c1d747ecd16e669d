//! Interactive OAuth2 authorization-code flow.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use rand::RngCore;
use serde::Deserialize;

use super::callback::CallbackServer;
use super::token::{Token, TokenSource};
use super::{AuthError, AUTHORIZE_URL, REDIRECT_URL, TOKEN_URL};

/// OAuth2 client configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_url: String,
    /// Local address the callback listener binds.
    pub callback_addr: SocketAddr,
}

impl AuthConfig {
    /// Configuration for the hosted service endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: AUTHORIZE_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            redirect_url: REDIRECT_URL.to_string(),
            callback_addr: SocketAddr::from(([127, 0, 0, 1], 4000)),
        }
    }
}

/// Obtains a token by driving a human through the authorization-code flow.
///
/// One invocation generates a fresh anti-CSRF state, presents the
/// authorization URL, consumes exactly one redirect on a local listener and
/// exchanges the code. Usually wrapped in a
/// [`CachingTokenSource`](super::CachingTokenSource) so the browser round
/// trip only happens when no cached token exists.
pub struct AuthCodeFlow {
    config: AuthConfig,
    timeout: Option<Duration>,
    http: reqwest::Client,
    on_url: Box<dyn Fn(&str) + Send + Sync>,
}

impl AuthCodeFlow {
    /// Creates a flow that opens the authorization URL in the default
    /// browser.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            timeout: None,
            http: reqwest::Client::new(),
            on_url: Box::new(|url| {
                tracing::info!(%url, "open this URL in the browser to authenticate");
                if let Err(err) = open::that(url) {
                    tracing::warn!(%err, "could not open browser");
                }
            }),
        }
    }

    /// Replaces how the authorization URL is presented to the human.
    pub fn on_url(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_url = Box::new(f);
        self
    }

    /// Bounds the wait for the browser redirect.
    ///
    /// The default is to block indefinitely, matching the reference
    /// behavior; setting a timeout is a documented deviation that keeps the
    /// process from hanging on a redirect that never arrives.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Runs the flow once and returns the exchanged token.
    pub async fn authorize(&self) -> Result<Token, AuthError> {
        let state = new_state()?;
        let url = self.authorization_url(&state);

        let server = CallbackServer::bind(self.config.callback_addr).await?;
        (self.on_url)(&url);

        let callback = server.recv(self.timeout).await?;
        if callback.state != state {
            tracing::warn!("authorization redirect carried a mismatched state");
            return Err(AuthError::StateMismatch);
        }

        self.exchange(&callback.code).await
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}&access_type=offline",
            self.config.auth_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(state),
        )
    }

    async fn exchange(&self, code: &str) -> Result<Token, AuthError> {
        let mut form = crate::form::FormBody::new();
        {
            use crate::form::FieldWriter;
            form.set_str("grant_type", "authorization_code");
            form.set_str("code", code);
            form.set_str("client_id", &self.config.client_id);
            form.set_str("client_secret", &self.config.client_secret);
            form.set_str("redirect_uri", &self.config.redirect_url);
        }

        let response = self
            .http
            .post(&self.config.token_url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(form.encode())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let tr: TokenResponse = response.json().await?;
        // The v1 token endpoint omits expires_in for non-expiring tokens;
        // fall back to an hour.
        let ttl = tr.expires_in.unwrap_or(3600);
        Ok(Token {
            access_token: tr.access_token,
            token_type: tr.token_type,
            refresh_token: tr.refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(ttl),
        })
    }
}

#[async_trait]
impl TokenSource for AuthCodeFlow {
    async fn token(&self) -> Result<Token, AuthError> {
        self.authorize().await
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Generates the anti-CSRF state: 24 OS-random bytes, URL-safe encoded.
fn new_state() -> Result<String, AuthError> {
    let mut buf = [0u8; 24];
    rand::rngs::OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|err| AuthError::StateGeneration(err.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}
