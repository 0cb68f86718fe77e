//! REST client for the Refractor backend
//!
//! Successful responses are wrapped as `{"payload": ...}`; failures as
//! `{"message": ..., "errors": {field: message}}`. Both shapes are decoded
//! here so nothing above this module inspects raw JSON.

mod auth;
mod chat;
mod games;
mod groups;
mod infractions;
mod players;
mod search;
mod servers;
mod stats;
mod supersede;
mod users;

pub use supersede::InFlight;

use crate::config::EnvConfig;
use crate::error::{ApiError, ApiResult, FieldErrors, RefractorError};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    payload: T,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<HashMap<String, serde_json::Value>>,
}

/// HTTP client bound to one Refractor installation
///
/// Cheaply cloneable; clones share the connection pool, cookie jar and
/// in-flight request table.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_root: String,
    kratos_root: String,
    inflight: InFlight,
}

impl ApiClient {
    pub fn new(config: &EnvConfig) -> Result<Self, RefractorError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| RefractorError::Http(format!("invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RefractorError::Http(e.to_string()))?;

        Ok(Self::with_client(
            http,
            config.api_root.clone(),
            config.kratos_root.clone(),
        ))
    }

    /// Build around a pre-configured HTTP client
    pub fn with_client(http: reqwest::Client, api_root: String, kratos_root: String) -> Self {
        Self {
            http,
            api_root: api_root.trim_end_matches('/').to_string(),
            kratos_root: kratos_root.trim_end_matches('/').to_string(),
            inflight: InFlight::new(),
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn inflight(&self) -> &InFlight {
        &self.inflight
    }

    /// Run a fetch that supersedes any earlier fetch for the same key
    pub async fn latest<T, F>(&self, key: &str, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        self.inflight.run(key, fut).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    fn kratos_url(&self, path: &str) -> String {
        format!("{}{}", self.kratos_root, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.payload(self.http.get(self.url(path))).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.payload(self.http.post(self.url(path)).json(body)).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.payload(self.http.patch(self.url(path)).json(body)).await
    }

    /// PATCH without a body, for state toggles like deactivation
    pub(crate) async fn patch_unit(&self, path: &str) -> ApiResult<()> {
        self.unit(self.http.patch(self.url(path))).await
    }

    pub(crate) async fn put_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        self.unit(self.http.put(self.url(path)).json(body)).await
    }

    pub(crate) async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        self.unit(self.http.post(self.url(path)).json(body)).await
    }

    /// DELETE; any payload is discarded
    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        self.unit(self.http.delete(self.url(path))).await
    }

    /// GET against the identity provider; its responses are not enveloped
    pub(crate) async fn kratos_get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.raw(self.http.get(self.kratos_url(path))).await
    }

    /// GET an absolute URL handed out by the identity provider
    pub(crate) async fn get_absolute(&self, url: &str) -> ApiResult<()> {
        self.unit(self.http.get(url)).await
    }

    async fn unit(&self, request: RequestBuilder) -> ApiResult<()> {
        let response = self.execute(request).await?;
        check(response).await.map(|_| ())
    }

    async fn execute(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            ApiError::from(e)
        })?;
        debug!(status = %response.status(), url = %response.url(), "response");
        Ok(response)
    }

    async fn payload<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.execute(request).await?;
        let body = check(response).await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        Ok(envelope.payload)
    }

    async fn raw<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.execute(request).await?;
        let body = check(response).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Return the body of a successful response, or classify the failure
async fn check(response: Response) -> ApiResult<Vec<u8>> {
    let status = response.status();
    let body = response.bytes().await.map_err(ApiError::from)?;

    if status.is_success() {
        return Ok(body.to_vec());
    }

    let error: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
    Err(classify(status, error))
}

fn classify(status: StatusCode, body: ErrorBody) -> ApiError {
    let message = body.message.unwrap_or_default();

    if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
        return ApiError::Validation {
            message,
            errors: flatten_errors(errors),
        };
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

fn flatten_errors(errors: HashMap<String, serde_json::Value>) -> FieldErrors {
    errors
        .into_iter()
        .map(|(field, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            (field, text)
        })
        .collect()
}
