use config::{Config, ConfigError, File};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::language::LanguageCode;

pub const DEFAULT_BUSINESS_NAME: &str = "Growing Tree Bank";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.9;
pub const DEFAULT_SWITCH_LANGUAGE_MARKER: &str = "SWITCH_LANGUAGE";
pub const BUSINESS_MESSAGES_SCOPE: &str = "https://www.googleapis.com/auth/businessmessages";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParleyConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub negotiation: NegotiationConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BusinessConfig {
    /// Shown as the representative on every outbound message and event.
    pub display_name: String,
    /// The language the canned responses are written in.
    pub server_language: LanguageCode,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_BUSINESS_NAME.to_string(),
            server_language: english(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NegotiationConfig {
    /// Detection results at or below this confidence fall back to the locale hint.
    pub confidence_threshold: f64,
    pub switch_language_marker: String,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            switch_language_marker: DEFAULT_SWITCH_LANGUAGE_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TranslationConfig {
    pub base_url: String,
    /// Falls back to the `GOOGLE_API_KEY` environment variable when unset.
    #[serde(deserialize_with = "secret_value")]
    pub api_key: Option<SecretString>,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translation.googleapis.com".to_string(),
            api_key: None,
            timeout_seconds: 30,
            max_retries: 0,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MessagingConfig {
    pub base_url: String,
    /// Path to the service-account JSON key. `~` and `$VAR` are expanded.
    pub credentials_path: String,
    pub scope: String,
    pub timeout_seconds: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://businessmessages.googleapis.com".to_string(),
            credentials_path: "resources/bm-agent-service-account-credentials.json".to_string(),
            scope: BUSINESS_MESSAGES_SCOPE.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl MessagingConfig {
    pub fn expanded_credentials_path(&self) -> Result<String, ConfigError> {
        shellexpand::full(&self.credentials_path)
            .map(|p| p.into_owned())
            .map_err(|e| ConfigError::Message(format!("credentials_path: {}", e)))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub webhook_path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            webhook_path: "/callback".to_string(),
        }
    }
}

/// Blank keys count as unset.
fn secret_value<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from))
}

fn english() -> LanguageCode {
    LanguageCode::parse("en").unwrap_or_else(|_| unreachable!("en is in the ISO 639-1 table"))
}

impl ParleyConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.negotiation.confidence_threshold) {
            return Err(ConfigError::Message(format!(
                "negotiation.confidence_threshold must be within [0, 1], got {}",
                self.negotiation.confidence_threshold
            )));
        }
        if self.negotiation.switch_language_marker.is_empty() {
            return Err(ConfigError::Message(
                "negotiation.switch_language_marker must not be empty".to_string(),
            ));
        }
        if !self.http.webhook_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "http.webhook_path must start with '/', got {:?}",
                self.http.webhook_path
            )));
        }
        Ok(())
    }
}
