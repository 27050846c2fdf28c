pub mod auth;
pub mod config;
pub mod detector;
pub mod error;
pub mod language;
pub mod messaging;
pub mod models;
pub mod responses;
pub mod translate;
pub mod translator;

pub use auth::{AccessToken, AuthError, AuthProvider, ServiceAccountAuth, ServiceAccountKey};
pub use config::ParleyConfig;
pub use detector::LanguageDetector;
pub use error::ParleyError;
pub use language::{LanguageCode, LanguageError};
pub use messaging::{BusinessMessagesClient, MessagingBackend, SendError};
pub use responses::select_response;
pub use translate::{
    CloudTranslateClient, CloudTranslateConfig, Detection, DetectionError, TranslationBackend,
    TranslationError,
};
pub use translator::Translator;
