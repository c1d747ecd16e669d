//! The API client: URL construction, status mapping, envelope decoding.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api_error::ApiError;
use crate::auth::{AuthError, TokenSource};
use crate::error::Error;
use crate::form::{FieldWriter, FormBody};
use crate::http::{HttpTransport, Method, ReqwestTransport};
use crate::types::{Category, User};

/// Base URL of the hosted API.
pub const BASE_URL: &str = "https://secure.splitwise.com/api/v3.0";

/// Client to the Splitwise API.
///
/// Generic over the HTTP transport implementation for testability.
pub struct Client<H: HttpTransport = ReqwestTransport> {
    http: H,
    base_url: String,
}

impl Client<ReqwestTransport> {
    /// Creates a client authenticating with an existing access token.
    pub fn new(access_token: String) -> Self {
        Self {
            http: ReqwestTransport::new(access_token),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Acquires a token from `source` and builds an authenticated client.
    pub async fn authenticate<S: TokenSource>(source: &S) -> Result<Self, AuthError> {
        let token = source.token().await?;
        Ok(Self::new(token.access_token))
    }
}

impl<H: HttpTransport> Client<H> {
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::Get, path, None).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &FormBody,
    ) -> Result<T, Error> {
        self.request(Method::Post, path, Some(form)).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::Post, path, None).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Option<&FormBody>,
    ) -> Result<T, Error> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, ?method, "api request");

        let response = self.http.send(method, &url, form).await?;

        if response.is_not_found() {
            return Err(Error::NotFound);
        }
        if !response.is_success() {
            tracing::warn!(%url, status = response.status, "unexpected api status");
            return Err(Error::UnexpectedStatus(response.status));
        }
        response.json()
    }
}

/// Envelope for endpoints that answer with a `success` flag.
#[derive(Debug, Deserialize)]
pub(crate) struct SuccessResponse {
    #[serde(default)]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) errors: ApiError,
}

impl SuccessResponse {
    /// Maps `success: false` to the normalized error collection.
    pub(crate) fn into_result(self) -> Result<(), Error> {
        if self.success {
            Ok(())
        } else {
            Err(self.errors.into())
        }
    }
}

/// Response from the natural-language expense parser.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseSentenceResponse {
    #[serde(default)]
    pub expense: Option<crate::expenses::Expense>,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub error: String,
}

// User- and category-related endpoints
impl<H: HttpTransport> Client<H> {
    /// Fetches the authenticated user.
    pub async fn get_current_user(&self) -> Result<User, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            user: User,
        }
        let res: Envelope = self.get("get_current_user").await?;
        Ok(res.user)
    }

    /// Fetches a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<User, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            user: User,
        }
        let res: Envelope = self.get(&format!("get_user/{id}")).await?;
        Ok(res.user)
    }

    /// Fetches the full category tree.
    pub async fn get_categories(&self) -> Result<Vec<Category>, Error> {
        #[derive(Deserialize)]
        struct Envelope {
            categories: Vec<Category>,
        }
        let res: Envelope = self.get("get_categories").await?;
        Ok(res.categories)
    }

    /// Parses a natural-language sentence into a candidate expense.
    pub async fn parse_sentence(
        &self,
        input: &str,
        group_id: Option<i64>,
        friend_id: Option<i64>,
        autosave: bool,
    ) -> Result<ParseSentenceResponse, Error> {
        let mut form = FormBody::new();
        form.set_str("input", input);
        if let Some(id) = group_id {
            form.set_int("group_id", id);
        }
        if let Some(id) = friend_id {
            form.set_int("friend_id", id);
        }
        form.set_bool("autosave", autosave);
        self.post("parse_sentence", &form).await
    }
}

#[cfg(test)]
impl<H: HttpTransport> Client<H> {
    /// Test-only constructor injecting a transport and base URL.
    pub(crate) fn with_transport(http: H, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[cfg(test)]
pub(crate) const TEST_BASE_URL: &str = "https://api.test/v3.0";
