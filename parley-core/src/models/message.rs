//! Outbound Business Messages payloads.

use serde::Serialize;
use uuid::Uuid;

use crate::language::LanguageCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepresentativeType {
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Representative {
    pub representative_type: RepresentativeType,
    pub display_name: String,
}

impl Representative {
    pub fn human(display_name: impl Into<String>) -> Self {
        Self {
            representative_type: RepresentativeType::Human,
            display_name: display_name.into(),
        }
    }
}

/// A quick reply offered under a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "SuggestionWire")]
pub struct Suggestion {
    pub display_text: String,
    pub postback_payload: String,
}

impl Suggestion {
    /// Offer to switch the conversation to `language`, labelled in that language.
    pub fn switch_language(language: LanguageCode, marker: &str) -> Self {
        Self {
            display_text: language.native_name().to_string(),
            postback_payload: format!("{}{}", marker, language.code()),
        }
    }
}

/// The language suffix of a switch-language postback, if `payload` is one.
pub fn switch_language_target<'a>(payload: &'a str, marker: &str) -> Option<&'a str> {
    payload.strip_prefix(marker)
}

#[derive(Serialize)]
struct SuggestionWire {
    reply: ReplyWire,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyWire {
    text: String,
    postback_data: String,
}

impl From<Suggestion> for SuggestionWire {
    fn from(s: Suggestion) -> Self {
        Self {
            reply: ReplyWire {
                text: s.display_text,
                postback_data: s.postback_payload,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub message_id: String,
    pub representative: Representative,
    pub text: String,
    pub contains_rich_text: bool,
    pub fallback: String,
    pub suggestions: Vec<Suggestion>,
}

impl OutboundMessage {
    /// A fresh rich-text message whose fallback is the text itself.
    pub fn new(
        representative: Representative,
        text: impl Into<String>,
        suggestions: Vec<Suggestion>,
    ) -> Self {
        let text = text.into();
        Self {
            message_id: Uuid::new_v4().to_string(),
            representative,
            fallback: text.clone(),
            text,
            contains_rich_text: true,
            suggestions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TypingStarted,
    TypingStopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEvent {
    pub event_type: EventType,
    pub representative: Representative,
}
