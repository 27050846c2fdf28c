//! Dispatcher wired to the real HTTP provider clients, with `wiremock` standing
//! in for Cloud Translation and Business Messages. Auth stays faked.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{lang, representative, FakeAuth, MARKER};
use parley_core::models::InboundEvent;
use parley_core::{
    BusinessMessagesClient, CloudTranslateClient, CloudTranslateConfig, LanguageDetector,
    TranslationBackend, Translator,
};
use parley_server::subsystems::dispatch::{DispatchOutcome, DispatchSettings, Dispatcher};
use parley_server::subsystems::outbound::Messenger;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn dispatcher(translate_api: &MockServer, messaging_api: &MockServer) -> Dispatcher {
    let translation: Arc<dyn TranslationBackend> = Arc::new(
        CloudTranslateClient::new(CloudTranslateConfig {
            api_key: SecretString::from("test-key".to_string()),
            base_url: translate_api.uri(),
            timeout: Duration::from_secs(5),
            max_retries: 0,
            retry_delay_ms: 10,
        })
        .unwrap(),
    );
    let messaging =
        Arc::new(BusinessMessagesClient::new(messaging_api.uri(), Duration::from_secs(5)).unwrap());

    Dispatcher::new(
        LanguageDetector::new(translation.clone(), 0.9),
        Translator::new(translation),
        Messenger::new(Arc::new(FakeAuth::default()), messaging, representative()),
        DispatchSettings {
            server_language: lang("en"),
            switch_language_marker: MARKER.to_string(),
        },
    )
}

async fn mount_typing_events(messaging_api: &MockServer, conversation_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/conversations/{}/events", conversation_id)))
        .and(header("authorization", "Bearer token-0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(messaging_api)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/conversations/{}/events", conversation_id)))
        .and(header("authorization", "Bearer token-2"))
        .and(body_partial_json(json!({ "eventType": "TYPING_STOPPED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(messaging_api)
        .await;
}

#[tokio::test]
async fn test_foreign_text_prompts_through_live_clients() {
    let translate_api = MockServer::start().await;
    let messaging_api = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/language/translate/v2/detect"))
        .and(header("x-goog-api-key", "test-key"))
        .and(query_param_is_missing("key"))
        .and(body_partial_json(json!({ "q": "quel est mon solde" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "detections": [[
                { "language": "fr", "confidence": 0.98, "isReliable": false }
            ]]}
        })))
        .expect(1)
        .mount(&translate_api)
        .await;
    // prompt goes out in English, so nothing is translated
    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&translate_api)
        .await;

    mount_typing_events(&messaging_api, "conv-1").await;
    Mock::given(method("POST"))
        .and(path("/v1/conversations/conv-1/messages"))
        .and(header("authorization", "Bearer token-1"))
        .and(body_partial_json(json!({
            "text": "Which language would you like to use?",
            "fallback": "Which language would you like to use?",
            "containsRichText": true,
            "representative": {
                "representativeType": "HUMAN",
                "displayName": "Growing Tree Bank"
            },
            "suggestions": [
                { "reply": { "text": "Français", "postbackData": "SWITCH_LANGUAGEfr" } },
                { "reply": { "text": "English", "postbackData": "SWITCH_LANGUAGEen" } }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&messaging_api)
        .await;

    let dispatcher = dispatcher(&translate_api, &messaging_api).await;
    let outcome = dispatcher
        .handle(&InboundEvent::TextMessage {
            conversation_id: "conv-1".to_string(),
            text: "quel est mon solde".to_string(),
            locale_hint: "fr-FR".to_string(),
        })
        .await
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::Prompted { .. }));
}

#[tokio::test]
async fn test_switch_acknowledgment_through_live_clients() {
    let translate_api = MockServer::start().await;
    let messaging_api = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .and(body_partial_json(json!({
            "q": "The language was set to Español. Please repeat your request.",
            "target": "es",
            "format": "text"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "translations": [
                { "translatedText": "El idioma se estableció en Español. Repita su solicitud." }
            ]}
        })))
        .expect(1)
        .mount(&translate_api)
        .await;

    mount_typing_events(&messaging_api, "conv-7").await;
    Mock::given(method("POST"))
        .and(path("/v1/conversations/conv-7/messages"))
        .and(body_partial_json(json!({
            "text": "El idioma se estableció en Español. Repita su solicitud.",
            "suggestions": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&messaging_api)
        .await;

    let dispatcher = dispatcher(&translate_api, &messaging_api).await;
    let outcome = dispatcher
        .handle(&InboundEvent::SuggestionResponse {
            conversation_id: "conv-7".to_string(),
            postback_data: "SWITCH_LANGUAGEes".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::LanguageSwitched { language: lang("es") });
    assert_eq!(dispatcher.sessions().language("conv-7").await, lang("es"));
}
