//! Translation provider for Parley
//!
//! Provides a `TranslationBackend` trait covering the two calls the dispatch
//! protocol needs from a provider:
//! - **detect** — candidate languages for a piece of text, with confidence
//! - **translate** — translation candidates into a target language (the
//!   provider auto-detects the source)
//!
//! `CloudTranslateClient` implements it against the Cloud Translation v2 REST API.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use crate::config::TranslationConfig;
use crate::language::{LanguageCode, LanguageError};

/// Keeps the key out of request URLs, and so out of transport errors.
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

// ============================================================================
// TranslationBackend trait
// ============================================================================

/// One detection candidate as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Provider language code, possibly region-qualified (`zh-CN`) or `und`.
    pub language: String,
    pub confidence: f64,
}

#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Detection candidates, best first. An empty list means the provider had
    /// nothing to say about the text.
    async fn detect(&self, text: &str) -> Result<Vec<Detection>, DetectionError>;

    /// Translation candidates into `target`, best first.
    async fn translate(
        &self,
        text: &str,
        target: LanguageCode,
    ) -> Result<Vec<String>, TranslationError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("No language detected")]
    NoResult,

    #[error("Locale hint unusable: {0}")]
    LocaleHint(#[from] LanguageError),
}

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Could not translate message")]
    NoResult,

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone)]
pub struct CloudTranslateConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl CloudTranslateConfig {
    pub fn from_config(config: &TranslationConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| {
                std::env::var("GOOGLE_API_KEY")
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .map(SecretString::from)
            })
            .unwrap_or_else(|| SecretString::from(String::new()));

        Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        }
    }
}

// ============================================================================
// Cloud Translation v2 API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TranslationsData {
    #[serde(default)]
    translations: Vec<TranslationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationEntry {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct DetectionsData {
    #[serde(default)]
    detections: Vec<Vec<DetectionEntry>>,
}

#[derive(Debug, Deserialize)]
struct DetectionEntry {
    language: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// CloudTranslateClient
// ============================================================================

#[derive(Debug, Clone)]
pub struct CloudTranslateClient {
    client: Client,
    config: CloudTranslateConfig,
}

impl CloudTranslateClient {
    pub fn new(config: CloudTranslateConfig) -> Result<Self, TranslationError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(TranslationError::MissingApiKey);
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/language/translate/v2{}", self.config.base_url, endpoint)
    }

    async fn detect_once(&self, text: &str) -> Result<Vec<Detection>, DetectionError> {
        let response = self
            .client
            .post(self.url("/detect"))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&DetectRequest { q: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let (code, message) = api_error(status, response).await;
            tracing::error!(code = code, message = %message, "Detect API error");
            return Err(DetectionError::Api { code, message });
        }

        let body: ApiEnvelope<DetectionsData> = response.json().await?;
        let mut candidates: Vec<Detection> = body
            .data
            .detections
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|d| Detection {
                language: d.language,
                confidence: d.confidence,
            })
            .collect();
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(candidates)
    }

    async fn translate_once(
        &self,
        text: &str,
        target: LanguageCode,
    ) -> Result<Vec<String>, TranslationError> {
        let response = self
            .client
            .post(self.url(""))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&TranslateRequest {
                q: text,
                target: target.code(),
                format: "text",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let (code, message) = api_error(status, response).await;
            tracing::error!(code = code, message = %message, "Translate API error");
            return Err(TranslationError::Api { code, message });
        }

        let body: ApiEnvelope<TranslationsData> = response.json().await?;
        Ok(body
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> (u16, String) {
    let error_body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiErrorResponse>(&error_body)
        .ok()
        .and_then(|e| e.error)
        .map(|e| (e.code, e.message))
        .unwrap_or((status.as_u16(), error_body))
}

#[async_trait]
impl TranslationBackend for CloudTranslateClient {
    async fn detect(&self, text: &str) -> Result<Vec<Detection>, DetectionError> {
        Retry::spawn(self.retry_strategy(), || self.detect_once(text))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Language detection failed"))
    }

    async fn translate(
        &self,
        text: &str,
        target: LanguageCode,
    ) -> Result<Vec<String>, TranslationError> {
        Retry::spawn(self.retry_strategy(), || self.translate_once(text, target))
            .await
            .inspect_err(|e| tracing::error!(target_language = %target, error = %e, "Translation failed"))
    }

    fn name(&self) -> &str {
        "cloud-translate-v2"
    }
}

// ============================================================================
// TESTS
// ============================================================================
