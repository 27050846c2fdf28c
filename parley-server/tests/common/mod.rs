//! In-process fakes for the translation, auth and messaging providers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_core::models::{ConversationEvent, EventType, OutboundMessage, Representative};
use parley_core::{
    AccessToken, AuthError, AuthProvider, Detection, DetectionError, LanguageCode,
    LanguageDetector, MessagingBackend, SendError, TranslationBackend, TranslationError,
    Translator,
};
use parley_server::subsystems::dispatch::{DispatchSettings, Dispatcher};
use parley_server::subsystems::outbound::Messenger;

pub const MARKER: &str = "SWITCH_LANGUAGE";

pub fn lang(code: &str) -> LanguageCode {
    LanguageCode::parse(code).unwrap()
}

/// Scripted translation provider.
///
/// Detection answers come from `detect_as`; unscripted text is reported as
/// confident English. Translations come from `translate_as`, otherwise the
/// text is tagged with the target code: `[fr] Hello`.
#[derive(Default)]
pub struct FakeTranslation {
    detections: Mutex<HashMap<String, Detection>>,
    translations: Mutex<HashMap<(String, String), String>>,
    pub translate_calls: Mutex<Vec<(String, String)>>,
    pub detect_calls: AtomicUsize,
    pub fail_detect: AtomicBool,
    pub fail_translate: AtomicBool,
}

impl FakeTranslation {
    pub fn detect_as(&self, text: &str, language: &str, confidence: f64) {
        self.detections.lock().unwrap().insert(
            text.to_string(),
            Detection {
                language: language.to_string(),
                confidence,
            },
        );
    }

    pub fn translate_as(&self, text: &str, target: &str, output: &str) {
        self.translations
            .lock()
            .unwrap()
            .insert((text.to_string(), target.to_string()), output.to_string());
    }

    pub fn translate_count(&self) -> usize {
        self.translate_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationBackend for FakeTranslation {
    async fn detect(&self, text: &str) -> Result<Vec<Detection>, DetectionError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detect.load(Ordering::SeqCst) {
            return Err(DetectionError::Api {
                code: 503,
                message: "detect unavailable".to_string(),
            });
        }
        let detection = self
            .detections
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or(Detection {
                language: "en".to_string(),
                confidence: 1.0,
            });
        Ok(vec![detection])
    }

    async fn translate(
        &self,
        text: &str,
        target: LanguageCode,
    ) -> Result<Vec<String>, TranslationError> {
        self.translate_calls
            .lock()
            .unwrap()
            .push((text.to_string(), target.code().to_string()));
        if self.fail_translate.load(Ordering::SeqCst) {
            return Err(TranslationError::Api {
                code: 503,
                message: "translate unavailable".to_string(),
            });
        }
        let scripted = self
            .translations
            .lock()
            .unwrap()
            .get(&(text.to_string(), target.code().to_string()))
            .cloned();
        Ok(vec![scripted.unwrap_or_else(|| format!("[{}] {}", target, text))])
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[derive(Default)]
pub struct FakeAuth {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn authorize(&self) -> Result<AccessToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuthError::Rejected {
                code: 401,
                message: "invalid_grant".to_string(),
            });
        }
        Ok(AccessToken::new(format!("token-{}", n), Some(3600)))
    }
}

/// One call made against the messaging fake, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Event {
        conversation_id: String,
        event_id: String,
        event_type: EventType,
        token: String,
    },
    Message {
        conversation_id: String,
        message: OutboundMessage,
        token: String,
    },
}

#[derive(Default)]
pub struct RecordingMessaging {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_events: AtomicBool,
    pub fail_messages: AtomicBool,
}

impl RecordingMessaging {
    pub fn messages(&self) -> Vec<(String, OutboundMessage)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Sent::Message {
                    conversation_id,
                    message,
                    ..
                } => Some((conversation_id.clone(), message.clone())),
                Sent::Event { .. } => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|(_, m)| m.text).collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessagingBackend for RecordingMessaging {
    async fn create_event(
        &self,
        token: &AccessToken,
        conversation_id: &str,
        event_id: &str,
        event: &ConversationEvent,
    ) -> Result<(), SendError> {
        if self.fail_events.load(Ordering::SeqCst) {
            return Err(SendError::Api {
                code: 500,
                message: "event rejected".to_string(),
            });
        }
        self.sent.lock().unwrap().push(Sent::Event {
            conversation_id: conversation_id.to_string(),
            event_id: event_id.to_string(),
            event_type: event.event_type,
            token: token.bearer().to_string(),
        });
        Ok(())
    }

    async fn create_message(
        &self,
        token: &AccessToken,
        conversation_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), SendError> {
        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(SendError::Api {
                code: 500,
                message: "message rejected".to_string(),
            });
        }
        self.sent.lock().unwrap().push(Sent::Message {
            conversation_id: conversation_id.to_string(),
            message: message.clone(),
            token: token.bearer().to_string(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub struct Harness {
    pub translation: Arc<FakeTranslation>,
    pub auth: Arc<FakeAuth>,
    pub messaging: Arc<RecordingMessaging>,
    pub dispatcher: Arc<Dispatcher>,
}

pub fn representative() -> Representative {
    Representative::human("Growing Tree Bank")
}

pub fn messenger(auth: Arc<FakeAuth>, messaging: Arc<RecordingMessaging>) -> Messenger {
    Messenger::new(auth, messaging, representative())
}

/// A dispatcher wired to fakes, English server language, threshold 0.9.
pub fn harness() -> Harness {
    let translation = Arc::new(FakeTranslation::default());
    let auth = Arc::new(FakeAuth::default());
    let messaging = Arc::new(RecordingMessaging::default());

    let backend: Arc<dyn TranslationBackend> = translation.clone();
    let dispatcher = Dispatcher::new(
        LanguageDetector::new(backend.clone(), 0.9),
        Translator::new(backend),
        messenger(auth.clone(), messaging.clone()),
        DispatchSettings {
            server_language: lang("en"),
            switch_language_marker: MARKER.to_string(),
        },
    );

    Harness {
        translation,
        auth,
        messaging,
        dispatcher: Arc::new(dispatcher),
    }
}
