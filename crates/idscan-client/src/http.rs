//! HTTP implementation of [`RecordBackend`].
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation | Request |
//! |---|---|
//! | upload | `POST /upload`, multipart field `image` |
//! | list | `GET /idcards` |
//! | update | `PUT /idcards/{id}`, full record JSON |
//! | delete | `DELETE /idcards/{id}` |

use crate::backend::RecordBackend;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use idscan_core::{BackendConfig, ImageFile, Record, RecordId};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Multipart field carrying the image bytes.
const IMAGE_FIELD: &str = "image";

/// Recognition backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend client with the default timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a backend client with a custom timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn with_timeout(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a backend client from the `[backend]` config section.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::with_timeout(config.base_url.as_str(), config.timeout_secs)
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    fn records_url(&self) -> String {
        format!("{}/idcards", self.base_url)
    }

    fn record_url(&self, id: &RecordId) -> String {
        format!(
            "{}/idcards/{}",
            self.base_url,
            urlencoding::encode(id.as_str())
        )
    }

    /// Build the multipart body for an image upload.
    fn upload_form(image: &ImageFile) -> Result<Form> {
        let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        if let Some(mime) = guess_mime(&image.file_name) {
            part = part.mime_str(mime)?;
        }
        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

#[async_trait]
impl RecordBackend for HttpBackend {
    async fn upload_image(&self, image: &ImageFile) -> Result<Record> {
        let url = self.upload_url();
        info!(url = %url, file = %image.file_name, size = image.size(), "uploading image");

        let response = self
            .client
            .post(&url)
            .multipart(Self::upload_form(image)?)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let record: Record = response.json().await.map_err(|e| ClientError::ParseError {
            message: format!("invalid upload response: {e}"),
        })?;
        info!(id = %record.id, "image recognized");
        Ok(record)
    }

    async fn list_records(&self) -> Result<Vec<Record>> {
        let url = self.records_url();
        debug!(url = %url, "listing records");

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response).await?;

        let records: Vec<Record> = response.json().await.map_err(|e| ClientError::ParseError {
            message: format!("invalid record list: {e}"),
        })?;
        info!(count = records.len(), "listed records");
        Ok(records)
    }

    async fn update_record(&self, record: &Record) -> Result<()> {
        let url = self.record_url(&record.id);
        debug!(url = %url, "updating record");

        let response = self.client.put(&url).json(record).send().await?;
        let response = ensure_success(response).await?;

        // Only a plain 200 counts as a completed update.
        if response.status() != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn delete_record(&self, id: &RecordId) -> Result<()> {
        let url = self.record_url(id);
        debug!(url = %url, "deleting record");

        let response = self.client.delete(&url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    fn backend_id(&self) -> &str {
        "http"
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Pass success responses through; turn anything else into a [`ClientError`].
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(failure_from_body(status, &body))
}

/// Classify a failed response.
///
/// A 400 whose JSON body has a non-empty string `error` member becomes
/// [`ClientError::Rejected`]; everything else is [`ClientError::Api`].
fn failure_from_body(status: StatusCode, body: &str) -> ClientError {
    if status == StatusCode::BAD_REQUEST {
        if let Ok(ErrorBody {
            error: Some(message),
        }) = serde_json::from_str(body)
        {
            if !message.is_empty() {
                return ClientError::Rejected { message };
            }
        }
    }
    ClientError::Api {
        status: status.as_u16(),
        message: body.to_string(),
    }
}

fn guess_mime(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
