//! HTTP client for the extraction service.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::{model::ExtractionResult, validate::UploadCandidate};

/// Shown when the service fails without a usable response body.
pub const EXTRACTION_FALLBACK: &str = "Extraction failed.";

/// Shown when the spreadsheet export fails for any reason.
pub const EXPORT_FAILED: &str = "Could not generate Excel.";

/// Failures raised by the extraction service calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Extraction rejected; carries the server's body text when present,
    /// otherwise the fixed fallback.
    #[error("{0}")]
    Extraction(String),
    #[error("{EXPORT_FAILED}")]
    Export,
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// The two service operations, behind a trait so the worker can be
/// exercised without a live backend.
#[async_trait]
pub trait ExtractionApi: Send + Sync {
    async fn extract(&self, candidate: &UploadCandidate) -> Result<ExtractionResult, ApiError>;
    async fn export_xlsx(&self, result: &ExtractionResult) -> Result<Vec<u8>, ApiError>;
}

/// Reqwest-backed client against a configurable base URL.
///
/// Both operations are fire-once with no retry and no client-side timeout;
/// the transport's defaults apply.
#[derive(Clone, Debug)]
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ExtractionApi for HttpApi {
    async fn extract(&self, candidate: &UploadCandidate) -> Result<ExtractionResult, ApiError> {
        let part = reqwest::multipart::Part::bytes(candidate.bytes.clone())
            .file_name(candidate.file_name.clone())
            .mime_str(&candidate.mime_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::info!(
            "extract request: {} ({} bytes)",
            candidate.file_name,
            candidate.byte_len()
        );
        let resp = self
            .http
            .post(self.endpoint("/api/extract"))
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                EXTRACTION_FALLBACK.to_string()
            } else {
                body
            };
            tracing::warn!("extract failed: {status}: {message}");
            return Err(ApiError::Extraction(message));
        }

        Ok(resp.json::<ExtractionResult>().await?)
    }

    async fn export_xlsx(&self, result: &ExtractionResult) -> Result<Vec<u8>, ApiError> {
        let resp = self
            .http
            .post(self.endpoint("/api/export"))
            .json(result)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("export failed: {status}");
            return Err(ApiError::Export);
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped() {
        let api = HttpApi::new(Client::new(), "http://localhost:8000//");
        assert_eq!(
            api.endpoint("/api/extract"),
            "http://localhost:8000/api/extract"
        );
    }
}
