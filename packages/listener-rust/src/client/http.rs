//! `reqwest` implementation of [`RecordClient`].
//!
//! Every create call first exchanges the app token for a short-lived auth
//! token, then posts the record. Tokens are not cached.

use async_trait::async_trait;
use indexmessenger_core::{DataGroup, WorkOrder};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::config::{with_trailing_slash, ClientConfig, REDACTED};
use crate::traits::RecordClient;

/// Media type of record documents on the records API.
pub const RECORD_CONTENT_TYPE: &str = "application/vnd.uub.record+json";

/// Header carrying the auth token on record requests.
pub const AUTH_TOKEN_HEADER: &str = "authToken";

/// Errors from talking to the records API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid {name} url '{url}': {reason}")]
    InvalidUrl {
        name: &'static str,
        url: String,
        reason: String,
    },
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}: {body}")]
    UnexpectedStatus {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("app token verifier response has no auth token id")]
    MissingAuthToken,
}

/// Body of a successful app token exchange.
#[derive(Debug, Deserialize)]
struct AuthTokenResponse {
    data: DataGroup,
}

/// HTTP client for the records API.
#[derive(Clone)]
pub struct HttpRecordClient {
    http: Client,
    record_base: Url,
    app_token_url: Url,
    app_token: String,
}

impl HttpRecordClient {
    /// Validates the configured URLs and builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` when a URL does not parse and
    /// `ClientError::Build` when the HTTP client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let record_base = parse_url("base", &with_trailing_slash(&config.base_url))?;
        let verifier_base = parse_url(
            "app token verifier",
            &with_trailing_slash(&config.app_token_verifier_url),
        )?;
        let app_token_url = app_token_url(&verifier_base, &config.user_id)?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            record_base,
            app_token_url,
            app_token: config.app_token.clone(),
        })
    }

    /// URL records of `record_type` are created at.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `record_type` cannot be joined.
    pub fn record_url(&self, record_type: &str) -> Result<Url, ClientError> {
        join("record", &self.record_base, record_type)
    }

    /// Exchanges the app token for an auth token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx answer, or a body
    /// without an `id` atomic.
    pub async fn fetch_auth_token(&self) -> Result<String, ClientError> {
        let url = self.app_token_url.clone();
        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(self.app_token.clone())
            .send()
            .await
            .map_err(|source| request_error(&url, source))?;
        let response = ensure_success(&url, response).await?;
        let parsed: AuthTokenResponse = response
            .json()
            .await
            .map_err(|source| request_error(&url, source))?;
        parsed
            .data
            .first_atomic_value("id")
            .map(str::to_string)
            .ok_or(ClientError::MissingAuthToken)
    }

    async fn create_record(&self, record_type: &str, document: &DataGroup) -> Result<(), ClientError> {
        let token = self.fetch_auth_token().await?;
        let url = self.record_url(record_type)?;
        debug!(%url, "posting record");

        let response = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, RECORD_CONTENT_TYPE)
            .header(ACCEPT, RECORD_CONTENT_TYPE)
            .header(AUTH_TOKEN_HEADER, token)
            .json(document)
            .send()
            .await
            .map_err(|source| request_error(&url, source))?;
        ensure_success(&url, response).await?;
        Ok(())
    }
}

impl std::fmt::Debug for HttpRecordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRecordClient")
            .field("record_base", &self.record_base.as_str())
            .field("app_token_url", &self.app_token_url.as_str())
            .field("app_token", &REDACTED)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordClient for HttpRecordClient {
    async fn create(&self, record_type: &str, document: WorkOrder) -> anyhow::Result<()> {
        self.create_record(record_type, &document.to_data_group())
            .await?;
        Ok(())
    }
}

fn parse_url(name: &'static str, url: &str) -> Result<Url, ClientError> {
    Url::parse(url).map_err(|e| ClientError::InvalidUrl {
        name,
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// `{verifier}rest/apptoken/{user_id}` with `user_id` encoded as one segment.
fn app_token_url(verifier_base: &Url, user_id: &str) -> Result<Url, ClientError> {
    let mut url = verifier_base.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::InvalidUrl {
            name: "app token verifier",
            url: verifier_base.to_string(),
            reason: "url cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(["rest", "apptoken", user_id]);
    Ok(url)
}

fn join(name: &'static str, base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path).map_err(|e| ClientError::InvalidUrl {
        name,
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })
}

fn request_error(url: &Url, source: reqwest::Error) -> ClientError {
    ClientError::Request {
        url: url.to_string(),
        source,
    }
}

async fn ensure_success(
    url: &Url,
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::UnexpectedStatus {
        url: url.to_string(),
        status,
        body,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
