//! Language negotiation and response dispatch.
//!
//! For every inbound event the dispatcher decides between three outcomes:
//! - the user wrote in a language other than the session language → ask which
//!   language to use, offering quick replies, without changing the session
//! - the user wrote in the session language → normalise into the server
//!   language, pick a canned response, translate it back and send it
//! - the user tapped a switch-language reply → commit the new session language
//!   and acknowledge in it
//!
//! Detection and translation failures abort the event with a `DispatchError`;
//! the webhook has already been acknowledged by then, so the user simply gets
//! no reply. Delivery failures are reported by the messenger and only logged.

use std::sync::Arc;
use std::time::Duration;

use parley_core::models::{
    switch_language_target, InboundEnvelope, InboundEvent, Representative, Suggestion,
};
use parley_core::{
    select_response, BusinessMessagesClient, CloudTranslateClient, CloudTranslateConfig,
    DetectionError, LanguageCode, LanguageDetector, ParleyConfig, ParleyError, ServiceAccountAuth,
    ServiceAccountKey, TranslationBackend, TranslationError, Translator,
};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::subsystems::outbound::{DeliveryReport, Messenger};
use crate::subsystems::session::{SessionGuard, SessionStore};

pub const LANGUAGE_PROMPT: &str = "Which language would you like to use?";

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("language detection failed: {0}")]
    Detection(#[from] DetectionError),

    #[error("translation failed: {0}")]
    Translation(#[from] TranslationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnrecognizedPostback,
    UnknownLanguage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Asked the user to pick a language.
    Prompted {
        detected: LanguageCode,
        offered: Vec<LanguageCode>,
    },
    /// Answered in the session language.
    Replied { language: LanguageCode },
    /// Committed a new session language.
    LanguageSwitched { language: LanguageCode },
    /// Nothing sent.
    Ignored { reason: IgnoreReason },
}

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub server_language: LanguageCode,
    pub switch_language_marker: String,
}

pub struct Dispatcher {
    detector: LanguageDetector,
    translator: Translator,
    messenger: Messenger,
    sessions: SessionStore,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        detector: LanguageDetector,
        translator: Translator,
        messenger: Messenger,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            detector,
            translator,
            messenger,
            sessions: SessionStore::new(settings.server_language),
            settings,
        }
    }

    /// Wire the production providers from the application config.
    ///
    /// Reads the service-account key from `[messaging] credentials_path` and the
    /// translation API key from `[translation] api_key` or `GOOGLE_API_KEY`.
    pub fn from_config(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let translation: Arc<dyn TranslationBackend> = Arc::new(CloudTranslateClient::new(
            CloudTranslateConfig::from_config(&config.translation),
        )?);

        let credentials_path = config.messaging.expanded_credentials_path()?;
        let key = ServiceAccountKey::from_file(&credentials_path).map_err(|source| {
            ParleyError::Credentials {
                path: credentials_path.clone(),
                source,
            }
        })?;
        let timeout = Duration::from_secs(config.messaging.timeout_seconds);
        let auth = Arc::new(ServiceAccountAuth::new(
            key,
            config.messaging.scope.clone(),
            timeout,
        )?);
        let messaging = Arc::new(BusinessMessagesClient::new(
            config.messaging.base_url.clone(),
            timeout,
        )?);

        Ok(Self::new(
            LanguageDetector::new(translation.clone(), config.negotiation.confidence_threshold),
            Translator::new(translation),
            Messenger::new(
                auth,
                messaging,
                Representative::human(config.business.display_name.clone()),
            ),
            DispatchSettings {
                server_language: config.business.server_language,
                switch_language_marker: config.negotiation.switch_language_marker.clone(),
            },
        ))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn handle(&self, event: &InboundEvent) -> Result<DispatchOutcome, DispatchError> {
        let mut session = self.sessions.acquire(event.conversation_id()).await;

        match event {
            InboundEvent::TextMessage {
                conversation_id,
                text,
                locale_hint,
            } => {
                self.on_text(&session, conversation_id, text, locale_hint)
                    .await
            }
            InboundEvent::SuggestionResponse {
                conversation_id,
                postback_data,
            } => {
                self.on_postback(&mut session, conversation_id, postback_data)
                    .await
            }
        }
    }

    async fn on_text(
        &self,
        session: &SessionGuard,
        conversation_id: &str,
        text: &str,
        locale_hint: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let server = self.settings.server_language;
        let current = session.language;
        let detected = self.detector.detect(text, locale_hint).await?;

        if detected != current {
            // The prompt stays in the language the user last agreed on.
            let prompt = self.translator.translate(LANGUAGE_PROMPT, server, current).await?;
            let offered = offered_languages(detected, current, server);
            let suggestions = offered
                .iter()
                .map(|l| Suggestion::switch_language(*l, &self.settings.switch_language_marker))
                .collect();

            let report = self.messenger.send(conversation_id, &prompt, suggestions).await;
            log_delivery(conversation_id, &report);
            return Ok(DispatchOutcome::Prompted { detected, offered });
        }

        let normalized = self.translator.translate(text, current, server).await?;
        let response = select_response(&normalized);
        let localized = self.translator.translate(response, server, current).await?;

        let report = self.messenger.send(conversation_id, &localized, Vec::new()).await;
        log_delivery(conversation_id, &report);
        Ok(DispatchOutcome::Replied { language: current })
    }

    async fn on_postback(
        &self,
        session: &mut SessionGuard,
        conversation_id: &str,
        postback_data: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(code) = switch_language_target(postback_data, &self.settings.switch_language_marker)
        else {
            tracing::debug!(
                conversation_id = conversation_id,
                postback_data = postback_data,
                "Ignoring unrecognized postback"
            );
            return Ok(DispatchOutcome::Ignored {
                reason: IgnoreReason::UnrecognizedPostback,
            });
        };

        let language = match LanguageCode::parse(code) {
            Ok(language) => language,
            Err(e) => {
                tracing::warn!(
                    conversation_id = conversation_id,
                    error = %e,
                    "Ignoring switch-language postback"
                );
                return Ok(DispatchOutcome::Ignored {
                    reason: IgnoreReason::UnknownLanguage,
                });
            }
        };

        let previous = session.language;
        session.language = language;
        tracing::info!(
            conversation_id = conversation_id,
            from = %previous,
            to = %language,
            "Session language switched"
        );

        let acknowledgment = format!(
            "The language was set to {}. Please repeat your request.",
            language.native_name()
        );
        let translated = self
            .translator
            .translate(&acknowledgment, self.settings.server_language, language)
            .await?;

        let report = self.messenger.send(conversation_id, &translated, Vec::new()).await;
        log_delivery(conversation_id, &report);
        Ok(DispatchOutcome::LanguageSwitched { language })
    }
}

/// `[detected, current, server]` with duplicates dropped, first occurrence kept.
pub fn offered_languages(
    detected: LanguageCode,
    current: LanguageCode,
    server: LanguageCode,
) -> Vec<LanguageCode> {
    let mut offered = Vec::with_capacity(3);
    for language in [detected, current, server] {
        if !offered.contains(&language) {
            offered.push(language);
        }
    }
    offered
}

fn log_delivery(conversation_id: &str, report: &DeliveryReport) {
    if report.is_clean() {
        tracing::debug!(
            conversation_id = conversation_id,
            message_id = %report.message_id,
            "Message delivered"
        );
    } else {
        tracing::warn!(
            conversation_id = conversation_id,
            message_id = %report.message_id,
            delivered = report.delivered(),
            failed_steps = report.failures.len(),
            "Message delivery incomplete"
        );
    }
}

/// Handle an event in the background. The caller returns immediately.
pub fn spawn_dispatch(dispatcher: Arc<Dispatcher>, envelope: InboundEnvelope) -> JoinHandle<()> {
    tokio::spawn(async move {
        let conversation_id = envelope.event.conversation_id().to_string();
        match dispatcher.handle(&envelope.event).await {
            Ok(outcome) => tracing::info!(
                conversation_id = %conversation_id,
                request_id = ?envelope.request_id,
                outcome = ?outcome,
                "Event handled"
            ),
            Err(e) => tracing::error!(
                conversation_id = %conversation_id,
                request_id = ?envelope.request_id,
                error = %e,
                "Event dropped, no reply sent"
            ),
        }
    })
}
