//! Business Messages conversations API client.
//!
//! Two calls: create a message and create an event (typing indicators). Both
//! take a bearer token obtained by the caller for that call alone.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::auth::{AccessToken, AuthError};
use crate::models::{ConversationEvent, OutboundMessage};

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },
}

#[async_trait]
pub trait MessagingBackend: Send + Sync {
    async fn create_event(
        &self,
        token: &AccessToken,
        conversation_id: &str,
        event_id: &str,
        event: &ConversationEvent,
    ) -> Result<(), SendError>;

    async fn create_message(
        &self,
        token: &AccessToken,
        conversation_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), SendError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
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

#[derive(Debug, Clone)]
pub struct BusinessMessagesClient {
    client: Client,
    base_url: String,
}

impl BusinessMessagesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn conversation_url(&self, conversation_id: &str, collection: &str) -> String {
        format!(
            "{}/v1/conversations/{}/{}",
            self.base_url, conversation_id, collection
        )
    }

    async fn check(response: reqwest::Response) -> Result<(), SendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        let (code, message) = serde_json::from_str::<ApiErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .map(|e| (e.code, e.message))
            .unwrap_or((status.as_u16(), error_body));

        tracing::error!(code = code, message = %message, "Business Messages API error");
        Err(SendError::Api { code, message })
    }
}

#[async_trait]
impl MessagingBackend for BusinessMessagesClient {
    async fn create_event(
        &self,
        token: &AccessToken,
        conversation_id: &str,
        event_id: &str,
        event: &ConversationEvent,
    ) -> Result<(), SendError> {
        let response = self
            .client
            .post(self.conversation_url(conversation_id, "events"))
            .query(&[("eventId", event_id)])
            .bearer_auth(token.bearer())
            .json(event)
            .send()
            .await?;
        Self::check(response).await
    }

    async fn create_message(
        &self,
        token: &AccessToken,
        conversation_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), SendError> {
        let response = self
            .client
            .post(self.conversation_url(conversation_id, "messages"))
            .bearer_auth(token.bearer())
            .json(message)
            .send()
            .await?;
        Self::check(response).await
    }

    fn name(&self) -> &str {
        "business-messages-v1"
    }
}
