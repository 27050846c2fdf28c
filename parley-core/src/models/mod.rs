pub mod event;
pub mod message;

pub use event::{EventError, InboundEnvelope, InboundEvent, WebhookPayload};
pub use message::{
    switch_language_target, ConversationEvent, EventType, OutboundMessage, Representative,
    RepresentativeType, Suggestion,
};
