//! reqwest-backed transport for the AuroraX API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;

use super::{SearchTransport, TransportError, TransportResponse, TransportResult};
use crate::config::ClientConfig;
use crate::models::{JobStatusReport, JobStatusResponse, JobType, RawPayload};

const API_KEY_HEADER: &str = "x-aurorax-api-key";

/// HTTP transport talking to the AuroraX REST API.
///
/// Connect and request timeouts apply per call; nothing here retries.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    ///
    /// The configured `client_version` is sent as the `User-Agent` of every request.
    pub fn new(config: &ClientConfig) -> TransportResult<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = HeaderValue::from_str(&config.client_version).map_err(|e| {
            TransportError::http(format!("Invalid client version header: {}", e))
                .with_operation("build_client")
        })?;
        headers.insert(USER_AGENT, user_agent);

        let mut builder = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            TransportError::http(format!("Failed to build HTTP client: {}", e))
                .with_operation("build_client")
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self, job_type: JobType) -> String {
        format!("{}/api/v1/{}/search", self.base_url, job_type)
    }

    pub fn request_url(&self, job_type: JobType, job_id: &str) -> String {
        format!("{}/api/v1/{}/requests/{}", self.base_url, job_type, job_id)
    }

    pub fn data_url(&self, job_type: JobType, job_id: &str) -> String {
        format!("{}/data", self.request_url(job_type, job_id))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// GET `url`, failing on any non-2xx status.
    ///
    /// Errors carry the request line as details.
    async fn get_text(&self, url: &str) -> TransportResult<String> {
        debug!("GET {}", url);
        let details = format!("GET {}", url);
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| TransportError::from(e).with_details(&details))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::decode(e.to_string()).with_details(&details))?;
        if !status.is_success() {
            return Err(
                TransportError::unexpected_status(status.as_u16(), body.trim()).with_details(details)
            );
        }
        Ok(body)
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn submit(&self, job_type: JobType, payload: &str) -> TransportResult<TransportResponse> {
        let url = self.search_url(job_type);
        debug!("POST {} ({} bytes)", url, payload.len());
        let details = format!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| {
                TransportError::from(e)
                    .with_operation("submit")
                    .with_details(&details)
            })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|e| {
            TransportError::decode(format!("Could not read submission response: {}", e))
                .with_operation("submit")
                .with_details(&details)
        })?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    async fn job_status(&self, job_type: JobType, job_id: &str) -> TransportResult<JobStatusReport> {
        let body = self
            .get_text(&self.request_url(job_type, job_id))
            .await
            .map_err(|e| e.with_operation("job_status").with_job(job_type.as_str(), job_id))?;

        let response: JobStatusResponse = serde_json::from_str(&body).map_err(|e| {
            TransportError::decode(format!("Invalid job status document: {}", e))
                .with_operation("job_status")
                .with_job(job_type.as_str(), job_id)
                .with_details(format!("GET {}", self.request_url(job_type, job_id)))
        })?;
        Ok(response.into())
    }

    async fn download_result(&self, job_type: JobType, job_id: &str) -> TransportResult<RawPayload> {
        self.get_text(&self.data_url(job_type, job_id))
            .await
            .map(RawPayload::from)
            .map_err(|e| {
                e.with_operation("download_result")
                    .with_job(job_type.as_str(), job_id)
            })
    }

    async fn cancel_job(&self, job_type: JobType, job_id: &str) -> TransportResult<()> {
        let url = self.request_url(job_type, job_id);
        debug!("DELETE {}", url);
        let details = format!("DELETE {}", url);
        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| {
                TransportError::from(e)
                    .with_operation("cancel_job")
                    .with_job(job_type.as_str(), job_id)
                    .with_details(&details)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Could not read cancellation response body: {}", e);
                    String::new()
                }
            };
            return Err(TransportError::unexpected_status(status.as_u16(), body.trim())
                .with_operation("cancel_job")
                .with_job(job_type.as_str(), job_id)
                .with_details(details));
        }
        Ok(())
    }
}
