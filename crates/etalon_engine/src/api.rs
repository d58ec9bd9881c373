use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;

use crate::{ApiError, ArtifactEntry, FailureKind};

/// Status sentinel the device sends when a test run completed.
pub const STATUS_OK: &str = "ok";

#[derive(Debug, Clone)]
pub struct DeviceSettings {
    /// Base URL of the device API.
    pub base_url: String,
    /// Opt-in connect timeout; `None` leaves a hung request to the transport.
    pub connect_timeout: Option<Duration>,
    /// Opt-in whole-request timeout; `None` by default, per the device's
    /// operator-paced usage model.
    pub request_timeout: Option<Duration>,
    /// Byte cap for downloaded artifact content.
    pub max_download_bytes: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            // The rig's soft-AP address when no infrastructure network is up.
            base_url: "http://192.168.4.1".to_string(),
            connect_timeout: None,
            request_timeout: None,
            max_download_bytes: 8 * 1024 * 1024,
        }
    }
}

/// The device API as consumed by the console, one method per operation.
///
/// Every method is a single request/response exchange with no intermediate
/// progress reporting; callers learn only the settlement.
#[async_trait::async_trait]
pub trait DeviceApi: Send + Sync {
    /// GET `/api/list`: the full reference collection, in device order.
    async fn fetch_list(&self) -> Result<Vec<ArtifactEntry>, ApiError>;
    /// POST `/api/reference`: capture a new reference under `name`.
    async fn create_reference(&self, name: &str) -> Result<(), ApiError>;
    /// POST `/api/upload`: store a reference file under its original name.
    async fn upload_artifact(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ApiError>;
    /// POST `/api/test`: run a comparison against the named reference.
    async fn run_test(&self, name: &str) -> Result<(), ApiError>;
    /// GET `/api/download`: the named artifact's JSON content.
    async fn download_artifact(&self, name: &str) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct TestReport {
    status: String,
}

#[derive(Debug, Clone)]
pub struct HttpDeviceClient {
    base: reqwest::Url,
    client: reqwest::Client,
    max_download_bytes: u64,
}

impl HttpDeviceClient {
    pub fn new(settings: &DeviceSettings) -> Result<Self, ApiError> {
        let base = reqwest::Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            base,
            client,
            max_download_bytes: settings.max_download_bytes,
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn download_endpoint(&self, name: &str) -> Result<reqwest::Url, ApiError> {
        let mut url = self.endpoint("/api/download")?;
        // append_pair escapes the name for the query parameter.
        url.query_pairs_mut().append_pair("file", name);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl DeviceApi for HttpDeviceClient {
    async fn fetch_list(&self) -> Result<Vec<ArtifactEntry>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/api/list")?)
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(&response)?;

        let body = response.bytes().await.map_err(map_transport_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::MalformedPayload, err.to_string()))
    }

    async fn create_reference(&self, name: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/reference")?)
            .form(&[("name", name)])
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(&response)
    }

    async fn upload_artifact(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("/api/upload")?)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(&response)
    }

    async fn run_test(&self, name: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/test")?)
            .form(&[("file", name)])
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(&response)?;

        let body = response.bytes().await.map_err(map_transport_error)?;
        let report: TestReport = serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::MalformedPayload, err.to_string()))?;

        if report.status == STATUS_OK {
            Ok(())
        } else {
            Err(ApiError::new(
                FailureKind::TestRejected {
                    status: report.status,
                },
                "device reported a non-ok test status",
            ))
        }
    }

    async fn download_artifact(&self, name: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(self.download_endpoint(name)?)
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(&response)?;

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_download_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.max_download_bytes,
                        actual: Some(content_len),
                    },
                    "artifact too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_transport_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_download_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.max_download_bytes,
                        actual: Some(next_len),
                    },
                    "artifact too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }
}

fn ensure_success(response: &reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
