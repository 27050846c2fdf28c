//! Inbound webhook payloads and the validated events they become.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Raw Business Messages webhook body. Every field is optional here; shape
/// checks happen in [`WebhookPayload::into_envelope`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub conversation_id: Option<String>,
    pub request_id: Option<String>,
    pub agent: Option<String>,
    #[serde(default)]
    pub context: WebhookContext,
    pub message: Option<WebhookMessage>,
    pub suggestion_response: Option<WebhookSuggestionResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookContext {
    pub user_info: Option<UserInfo>,
    pub resolved_locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookMessage {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSuggestionResponse {
    pub postback_data: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// An inbound user action, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    TextMessage {
        conversation_id: String,
        text: String,
        locale_hint: String,
    },
    SuggestionResponse {
        conversation_id: String,
        postback_data: String,
    },
}

impl InboundEvent {
    pub fn conversation_id(&self) -> &str {
        match self {
            Self::TextMessage { conversation_id, .. }
            | Self::SuggestionResponse { conversation_id, .. } => conversation_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextMessage { .. } => "text_message",
            Self::SuggestionResponse { .. } => "suggestion_response",
        }
    }
}

/// An event plus the request metadata worth logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEnvelope {
    pub request_id: Option<String>,
    pub brand_id: Option<String>,
    pub display_name: Option<String>,
    pub event: InboundEvent,
}

impl WebhookPayload {
    /// Validate the payload.
    ///
    /// `Err` means the body is malformed; `Ok(None)` means it is well formed
    /// but carries nothing to act on (receipts, typing signals, media).
    pub fn into_envelope(self) -> Result<Option<InboundEnvelope>, EventError> {
        let conversation_id = self
            .conversation_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(EventError::MissingField("conversationId"))?;
        let agent = self
            .agent
            .filter(|a| !a.trim().is_empty())
            .ok_or(EventError::MissingField("agent"))?;

        let text = self.message.and_then(|m| m.text);
        let postback = self.suggestion_response.and_then(|s| s.postback_data);

        let event = match (text, postback) {
            (Some(text), _) => InboundEvent::TextMessage {
                conversation_id,
                text,
                locale_hint: self.context.resolved_locale.unwrap_or_default(),
            },
            (None, Some(postback_data)) => InboundEvent::SuggestionResponse {
                conversation_id,
                postback_data,
            },
            (None, None) => return Ok(None),
        };

        Ok(Some(InboundEnvelope {
            request_id: self.request_id,
            brand_id: brand_id(&agent),
            display_name: self.context.user_info.and_then(|u| u.display_name),
            event,
        }))
    }
}

/// Brand id from an agent resource name (`brands/<brand>/agents/<agent>`).
pub fn brand_id(agent: &str) -> Option<String> {
    static BRAND: OnceLock<Regex> = OnceLock::new();
    let re = BRAND.get_or_init(|| {
        Regex::new(r"brands/([^/]+)/agents").unwrap_or_else(|e| unreachable!("static regex: {e}"))
    });
    re.captures(agent)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
