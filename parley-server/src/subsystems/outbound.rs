//! Outbound messenger: typing indicator, message, typing indicator.
//!
//! Delivery is best effort: every step gets its own token, each step is
//! attempted even if an earlier one failed, and failures come back in a
//! `DeliveryReport` instead of an error. Nothing here retries.

use std::fmt;
use std::sync::Arc;

use parley_core::models::{
    ConversationEvent, EventType, OutboundMessage, Representative, Suggestion,
};
use parley_core::{AccessToken, AuthProvider, MessagingBackend, SendError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStep {
    TypingStarted,
    Message,
    TypingStopped,
}

impl fmt::Display for DeliveryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TypingStarted => "typing_started",
            Self::Message => "message",
            Self::TypingStopped => "typing_stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct DeliveryReport {
    pub message_id: String,
    pub failures: Vec<(DeliveryStep, SendError)>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        !self
            .failures
            .iter()
            .any(|(step, _)| *step == DeliveryStep::Message)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct Messenger {
    auth: Arc<dyn AuthProvider>,
    backend: Arc<dyn MessagingBackend>,
    representative: Representative,
}

impl Messenger {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        backend: Arc<dyn MessagingBackend>,
        representative: Representative,
    ) -> Self {
        Self {
            auth,
            backend,
            representative,
        }
    }

    pub async fn send(
        &self,
        conversation_id: &str,
        text: &str,
        suggestions: Vec<Suggestion>,
    ) -> DeliveryReport {
        let message = OutboundMessage::new(self.representative.clone(), text, suggestions);
        let mut report = DeliveryReport {
            message_id: message.message_id.clone(),
            failures: Vec::new(),
        };

        let steps = [
            DeliveryStep::TypingStarted,
            DeliveryStep::Message,
            DeliveryStep::TypingStopped,
        ];
        for step in steps {
            if let Err(e) = self.run_step(step, conversation_id, &message).await {
                tracing::warn!(
                    conversation_id = conversation_id,
                    message_id = %message.message_id,
                    step = %step,
                    backend = self.backend.name(),
                    error = %e,
                    "Outbound step failed"
                );
                report.failures.push((step, e));
            }
        }

        report
    }

    async fn run_step(
        &self,
        step: DeliveryStep,
        conversation_id: &str,
        message: &OutboundMessage,
    ) -> Result<(), SendError> {
        let token = self.auth.authorize().await?;
        match step {
            DeliveryStep::TypingStarted => {
                self.typing(&token, conversation_id, EventType::TypingStarted)
                    .await
            }
            DeliveryStep::Message => {
                self.backend
                    .create_message(&token, conversation_id, message)
                    .await
            }
            DeliveryStep::TypingStopped => {
                self.typing(&token, conversation_id, EventType::TypingStopped)
                    .await
            }
        }
    }

    async fn typing(
        &self,
        token: &AccessToken,
        conversation_id: &str,
        event_type: EventType,
    ) -> Result<(), SendError> {
        let event = ConversationEvent {
            event_type,
            representative: self.representative.clone(),
        };
        let event_id = Uuid::new_v4().to_string();
        self.backend
            .create_event(token, conversation_id, &event_id, &event)
            .await
    }
}
