use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::core::interfaces::adapters::{RemoteVisionClient, RemoteVisionConnector};
use crate::core::models::{
    AnalysisResult, OperationHandle, OperationSnapshot, ServiceCredentials, TextRecognitionMode,
    TextSubmission, UserSettings, VisualFeature,
};
use crate::global_constants;

/// Paths and header names used to reach the vision service.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRoutes {
    pub analyze_path: String,
    pub recognize_text_path: String,
    pub operation_status_path: String,
    pub api_key_header: String,
    pub operation_location_header: String,
}

impl RestRoutes {
    pub fn from_settings(settings: &UserSettings) -> Self {
        Self {
            analyze_path: settings.analyze_path.clone(),
            recognize_text_path: settings.recognize_text_path.clone(),
            operation_status_path: settings.operation_status_path.clone(),
            api_key_header: settings.api_key_header.clone(),
            operation_location_header: settings.operation_location_header.clone(),
        }
    }
}

pub struct RestVisionClient {
    http: reqwest::Client,
    credentials: ServiceCredentials,
    routes: RestRoutes,
}

impl RestVisionClient {
    pub fn build(credentials: ServiceCredentials, routes: RestRoutes) -> Result<Self> {
        log::info!("[REST_CLIENT] Creating client for {}", credentials.endpoint);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(global_constants::HTTP_TIMEOUT_SECONDS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            credentials,
            routes,
        })
    }

    fn construct_analyze_url(&self, features: &[VisualFeature]) -> String {
        let feature_list = features
            .iter()
            .map(|feature| feature.as_query_value())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}{}?features={}",
            self.credentials.endpoint,
            self.routes.analyze_path,
            urlencoding::encode(&feature_list)
        )
    }

    fn construct_recognize_text_url(&self, mode: TextRecognitionMode) -> String {
        format!(
            "{}{}?mode={}",
            self.credentials.endpoint,
            self.routes.recognize_text_path,
            urlencoding::encode(&mode.to_string())
        )
    }

    fn construct_operation_status_url(&self, handle: &OperationHandle) -> String {
        format!(
            "{}{}/{}",
            self.credentials.endpoint,
            self.routes.operation_status_path.trim_end_matches('/'),
            urlencoding::encode(handle.as_str())
        )
    }

    async fn post_image(&self, url: &str, image_bytes: &[u8]) -> Result<reqwest::Response> {
        log::debug!("[REST_CLIENT] POST {} ({} bytes)", url, image_bytes.len());

        let response = self
            .http
            .post(url)
            .header(self.routes.api_key_header.as_str(), self.credentials.api_key.as_str())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image_bytes.to_vec())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        ensure_success(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    log::debug!("[REST_CLIENT] error body from {}: {}", url, body);

    anyhow::bail!("{} returned {}: {}", url, status, body.trim())
}

#[async_trait]
impl RemoteVisionClient for RestVisionClient {
    async fn analyze(
        &self,
        image_bytes: &[u8],
        features: &[VisualFeature],
    ) -> Result<AnalysisResult> {
        let url = self.construct_analyze_url(features);
        log::info!("[REST_CLIENT] Requesting analysis");

        let response = self.post_image(&url, image_bytes).await?;
        let result: AnalysisResult = response
            .json()
            .await
            .context("Failed to parse analysis response")?;

        Ok(result)
    }

    async fn submit_text_recognition(
        &self,
        image_bytes: &[u8],
        mode: TextRecognitionMode,
    ) -> Result<TextSubmission> {
        let url = self.construct_recognize_text_url(mode);
        log::info!("[REST_CLIENT] Submitting text recognition ({})", mode);

        let response = self.post_image(&url, image_bytes).await?;
        let operation_location = response
            .headers()
            .get(self.routes.operation_location_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        log::debug!(
            "[REST_CLIENT] {} header: {:?}",
            self.routes.operation_location_header,
            operation_location
        );

        Ok(TextSubmission { operation_location })
    }

    async fn get_operation_status(&self, handle: &OperationHandle) -> Result<OperationSnapshot> {
        let url = self.construct_operation_status_url(handle);
        log::debug!("[REST_CLIENT] GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(self.routes.api_key_header.as_str(), self.credentials.api_key.as_str())
            .send()
            .await
            .with_context(|| format!("Failed to query operation {}", handle))?;

        let snapshot: OperationSnapshot = ensure_success(response)
            .await?
            .json()
            .await
            .context("Failed to parse operation status")?;

        Ok(snapshot)
    }
}

pub struct RestVisionConnector {
    routes: RestRoutes,
}

impl RestVisionConnector {
    pub fn new(routes: RestRoutes) -> Self {
        Self { routes }
    }
}

impl RemoteVisionConnector for RestVisionConnector {
    fn connect(&self, credentials: &ServiceCredentials) -> Result<Arc<dyn RemoteVisionClient>> {
        let client = RestVisionClient::build(credentials.clone(), self.routes.clone())?;
        Ok(Arc::new(client))
    }
}
