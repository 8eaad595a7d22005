//! HTTP client for the allocation endpoint

use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::logger::truncate_for_log;
use crate::models::AllocationRequest;

pub const PATH_ALLOCATE: &str = "/api/allocate";

const LOGGED_BODY_CHARS: usize = 256;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("failed sending allocation request to {url}: {source}")]
    Send {
        url: String,
        timed_out: bool,
        #[source]
        source: reqwest::Error,
    },
    #[error("allocation request rejected by {url} with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed reading allocation response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid allocation response payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Send { timed_out: true, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Submits allocation requests and hands back the raw JSON body.
#[derive(Debug, Clone)]
pub struct AllocationClient {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl AllocationClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/allocate`. Any transport problem is returned, never swallowed.
    pub async fn allocate(&self, request: &AllocationRequest) -> Result<Value, ClientError> {
        let url = self.url_for(PATH_ALLOCATE);
        info!(station = %request.station_id, %url, "submitting allocation request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| {
                warn!(%url, error = %source, "allocation request failed");
                ClientError::Send {
                    url: url.clone(),
                    timed_out: source.is_timeout(),
                    source,
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| {
            warn!(%url, error = %source, "failed reading allocation response");
            ClientError::Body {
                url: url.clone(),
                source,
            }
        })?;

        if !status.is_success() {
            let body = truncate_for_log(&text, LOGGED_BODY_CHARS);
            warn!(%url, status = status.as_u16(), %body, "allocation request rejected");
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            %url,
            body = %truncate_for_log(&text, LOGGED_BODY_CHARS),
            "allocation response received"
        );
        serde_json::from_str(&text).map_err(|source| {
            warn!(%url, error = %source, "allocation response is not valid JSON");
            ClientError::Decode { url, source }
        })
    }
}
