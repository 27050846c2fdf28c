//! Language detection with a confidence gate.
//!
//! The provider's top candidate wins only when its confidence is strictly above
//! the threshold and it names an ISO 639-1 language. Anything else falls back to
//! the primary subtag of the platform's locale hint.

use std::sync::Arc;

use crate::language::LanguageCode;
use crate::translate::{DetectionError, TranslationBackend};

#[derive(Clone)]
pub struct LanguageDetector {
    backend: Arc<dyn TranslationBackend>,
    confidence_threshold: f64,
}

impl LanguageDetector {
    pub fn new(backend: Arc<dyn TranslationBackend>, confidence_threshold: f64) -> Self {
        Self {
            backend,
            confidence_threshold,
        }
    }

    pub async fn detect(
        &self,
        text: &str,
        locale_hint: &str,
    ) -> Result<LanguageCode, DetectionError> {
        let candidates = self.backend.detect(text).await?;
        let top = candidates.first().ok_or(DetectionError::NoResult)?;

        let confident = if top.confidence > self.confidence_threshold {
            LanguageCode::from_provider(&top.language)
                .inspect_err(|e| {
                    tracing::debug!(
                        language = %top.language,
                        error = %e,
                        "Confident detection is not an ISO 639-1 language"
                    )
                })
                .ok()
        } else {
            None
        };

        match confident {
            Some(language) => Ok(language),
            None => {
                let language = LanguageCode::from_locale(locale_hint)?;
                tracing::debug!(
                    locale_hint = locale_hint,
                    confidence = top.confidence,
                    language = %language,
                    "Low-confidence detection, using locale hint"
                );
                Ok(language)
            }
        }
    }
}
