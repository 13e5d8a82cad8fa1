use std::time::Duration;

use forge_logging::forge_warn;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::{FailureKind, ServiceError};

/// Transport settings shared by both backend clients.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub analyze_path: String,
    pub run_path: String,
    pub connect_timeout: Duration,
    /// `None` leaves the request unbounded; the backend caps its own work.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            analyze_path: "analyze".to_string(),
            run_path: "run-scraper".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn analyze_url(&self) -> Result<url::Url, ServiceError> {
        self.endpoint(&self.analyze_path)
    }

    pub fn run_url(&self) -> Result<url::Url, ServiceError> {
        self.endpoint(&self.run_path)
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, ServiceError> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        url::Url::parse(&base)
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .map_err(|err| ServiceError::new(FailureKind::InvalidUrl, Some(err.to_string())))
    }
}

pub(crate) fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, ServiceError> {
    let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|err| {
        forge_warn!("could not build http client: {}", err);
        ServiceError::new(FailureKind::Network, None)
    })
}

/// POSTs `body` as JSON and returns the raw response, successful or not.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: url::Url,
    body: &T,
) -> Result<reqwest::Response, ServiceError> {
    let payload = serde_json::to_vec(body).map_err(|err| {
        forge_warn!("could not encode request body: {}", err);
        ServiceError::decode(None)
    })?;
    client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json, application/x-json-stream, text/csv")
        .body(payload)
        .send()
        .await
        .map_err(map_reqwest_error)
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    traceback: Option<String>,
    #[serde(default)]
    errors: Option<String>,
}

/// Builds the error for a non-success response from its structured body.
pub(crate) async fn failure_from_response(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => {
            forge_warn!("could not read error body (status {}): {}", status, err);
            return ServiceError::new(FailureKind::HttpStatus(status), None);
        }
    };
    failure_from_body(status, &body)
}

pub(crate) fn failure_from_body(status: u16, body: &[u8]) -> ServiceError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    ServiceError {
        kind: FailureKind::HttpStatus(status),
        message: parsed.error,
        traceback: parsed.traceback,
        errors: parsed.errors,
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    forge_warn!("backend request failed: {}", err);
    if err.is_timeout() {
        return ServiceError::new(FailureKind::Timeout, None);
    }
    ServiceError::new(FailureKind::Network, None)
}
