//! HTTP transport abstraction.
//!
//! The client is generic over a trait-based transport so API calls can be
//! exercised against canned responses in tests.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::form::FormBody;

/// HTTP method for an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Trait for sending API requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request, optionally carrying a form-encoded body, and returns
    /// the raw response for status handling by the caller.
    async fn send(
        &self,
        method: Method,
        url: &str,
        form: Option<&FormBody>,
    ) -> Result<HttpResponse, Error>;
}

/// Response from an HTTP request.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Returns true for the statuses the API uses for success (200 and 201).
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// Returns true if status is 404.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Production transport using reqwest.
///
/// Authenticates every request with a bearer access token, which the HTTP
/// layer consumes from the credential provider (see [`crate::auth`]).
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    access_token: String,
}

impl ReqwestTransport {
    /// Creates a transport authenticating with `access_token`.
    pub fn new(access_token: String) -> Self {
        Self {
            inner: reqwest::Client::new(),
            access_token,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        form: Option<&FormBody>,
    ) -> Result<HttpResponse, Error> {
        let mut request = match method {
            Method::Get => self.inner.get(url),
            Method::Post => self.inner.post(url),
        };
        request = request.bearer_auth(&self.access_token);
        if let Some(form) = form {
            request = request
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(form.encode());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    /// Mock transport for testing.
    ///
    /// Serves canned responses keyed by URL and records every request so
    /// tests can assert on the encoded form fields.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct MockTransport {
        responses: Arc<RwLock<HashMap<String, (u16, String)>>>,
        requests: Arc<RwLock<Vec<RecordedRequest>>>,
    }

    /// A recorded API request.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordedRequest {
        pub(crate) method: Method,
        pub(crate) url: String,
        pub(crate) form: Option<FormBody>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Configures a response for a URL.
        pub(crate) fn on(self, url: &str, status: u16, body: impl Into<String>) -> Self {
            self.responses
                .write()
                .unwrap()
                .insert(url.to_string(), (status, body.into()));
            self
        }

        /// Returns all recorded requests.
        pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.read().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(
            &self,
            method: Method,
            url: &str,
            form: Option<&FormBody>,
        ) -> Result<HttpResponse, Error> {
            self.requests.write().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                form: form.cloned(),
            });

            let responses = self.responses.read().unwrap();
            let (status, body) = responses
                .get(url)
                .unwrap_or_else(|| panic!("no mock response configured for {url}"))
                .clone();

            Ok(HttpResponse { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_200_and_201_only() {
        for (status, success) in [(200, true), (201, true), (204, false), (404, false), (500, false)]
        {
            let response = HttpResponse {
                status,
                body: String::new(),
            };
            assert_eq!(response.is_success(), success, "status {status}");
        }
    }

    #[test]
    fn json_decodes_body() {
        let response = HttpResponse {
            status: 200,
            body: r#"{"id": 7}"#.to_string(),
        };

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn json_surfaces_decode_errors() {
        let response = HttpResponse {
            status: 200,
            body: "not json".to_string(),
        };

        let result: Result<serde_json::Value, _> = response.json();
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}
