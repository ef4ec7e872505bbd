//! HTTP access to the remote analysis service.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use shared::{
    error::AnalysisError,
    protocol::{AnalysisResult, HealthResponse, ServiceErrorBody},
};
use tracing::{info, warn};
use url::Url;

use crate::{config::ApiConfig, selection::SelectedFile};

// Plain-text error bodies longer than this are replaced by the status line.
const MAX_PLAIN_ERROR_LEN: usize = 300;

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    fn config(&self) -> &ApiConfig;

    /// `POST {api_base}/upload` with one multipart part per file.
    async fn analyze(&self, files: &[SelectedFile]) -> Result<AnalysisResult, AnalysisError>;

    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, AnalysisError>;

    async fn health(&self) -> Result<String, AnalysisError>;
}

#[async_trait]
impl<T: AnalysisApi + ?Sized> AnalysisApi for Arc<T> {
    fn config(&self) -> &ApiConfig {
        (**self).config()
    }

    async fn analyze(&self, files: &[SelectedFile]) -> Result<AnalysisResult, AnalysisError> {
        (**self).analyze(files).await
    }

    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, AnalysisError> {
        (**self).fetch_image(url).await
    }

    async fn health(&self) -> Result<String, AnalysisError> {
        (**self).health().await
    }
}

pub struct HttpAnalysisClient {
    http: Client,
    config: ApiConfig,
}

impl HttpAnalysisClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build HTTP client for analysis service")?;
        Ok(Self { http, config })
    }

    fn build_form(&self, files: &[SelectedFile]) -> Form {
        files.iter().fold(Form::new(), |form, file| {
            form.part(self.config.upload_field().to_string(), file_part(file))
        })
    }
}

fn file_part(file: &SelectedFile) -> Part {
    let part = || Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    part().mime_str(&file.mime_type).unwrap_or_else(|_| part())
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn analyze(&self, files: &[SelectedFile]) -> Result<AnalysisResult, AnalysisError> {
        let url = self.config.upload_url();
        info!(files = files.len(), %url, "submitting files for analysis");

        let response = self
            .http
            .post(url)
            .multipart(self.build_form(files))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = server_error_message(status, &body);
            warn!(status = status.as_u16(), %message, "analysis request rejected");
            return Err(AnalysisError::server(status.as_u16(), message));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let result = decode_analysis(&body)?;
        info!(
            tumor_type = %result.tumor_type,
            images = result.processed_images.len(),
            "analysis response received"
        );
        Ok(result)
    }

    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, AnalysisError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "processed image unavailable");
            return Err(AnalysisError::server(status.as_u16(), status_line(status)));
        }
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    async fn health(&self) -> Result<String, AnalysisError> {
        let response = self
            .http
            .get(self.config.health_url())
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::server(status.as_u16(), status_line(status)));
        }
        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice::<HealthResponse>(&body)
            .map(|health| health.status)
            .map_err(|err| AnalysisError::malformed(err.to_string()))
    }
}

pub fn decode_analysis(body: &[u8]) -> Result<AnalysisResult, AnalysisError> {
    serde_json::from_slice::<AnalysisResult>(body).map_err(|err| {
        warn!("analysis response did not match the expected shape: {err}");
        AnalysisError::malformed(err.to_string())
    })
}

/// Picks the message for a non-2xx response: the JSON `error` field, then a
/// short plain-text body, then the status line.
pub fn server_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ServiceErrorBody {
        error: Some(message),
    }) = serde_json::from_str::<ServiceErrorBody>(body)
    {
        let message = message.trim();
        if !message.is_empty() {
            return message.to_string();
        }
    }

    let text = body.trim();
    let looks_structured = text.starts_with('{') || text.starts_with('[') || text.starts_with('<');
    if !text.is_empty() && !looks_structured && text.len() <= MAX_PLAIN_ERROR_LEN {
        return text.to_string();
    }

    status_line(status)
}

fn status_line(status: StatusCode) -> String {
    format!(
        "Server error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    )
}

fn transport_error(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        return AnalysisError::transport("The analysis service did not respond in time.");
    }
    if err.is_decode() {
        return AnalysisError::malformed(err.to_string());
    }
    AnalysisError::transport(err.to_string())
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
