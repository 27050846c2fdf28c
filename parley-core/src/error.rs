use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Credentials error ({path}): {source}")]
    Credentials {
        path: String,
        source: crate::auth::AuthError,
    },

    #[error("Auth error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    #[error("Translation provider error: {0}")]
    Translation(#[from] crate::translate::TranslationError),

    #[error("Messaging provider error: {0}")]
    Send(#[from] crate::messaging::SendError),
}
