use std::sync::Arc;

use crate::language::LanguageCode;
use crate::translate::{TranslationBackend, TranslationError};

/// Translation with a same-language short circuit.
#[derive(Clone)]
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslationBackend>) -> Self {
        Self { backend }
    }

    /// Translate `text` from `source` into `target`.
    ///
    /// Returns `text` untouched, without calling the provider, when the two
    /// languages are equal. Otherwise only `target` is sent and the first
    /// candidate is returned.
    pub async fn translate(
        &self,
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Result<String, TranslationError> {
        if source == target {
            return Ok(text.to_string());
        }

        let candidates = self.backend.translate(text, target).await?;
        candidates
            .into_iter()
            .next()
            .ok_or(TranslationError::NoResult)
    }
}
