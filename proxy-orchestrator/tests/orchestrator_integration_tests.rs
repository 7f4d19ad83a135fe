//! End-to-end orchestration tests driven off the shared fixtures: a full
//! extract -> scan -> detect -> resolve -> mask -> reassemble pass for each
//! provider request shape, using a canned `MockPiiDetectorClient` in place
//! of a real analyzer.

use proxy_core::{DispatchMode, Entity, EntitySource, MaskingConfig, PiiDetectionConfig, ProxyConfig};
use proxy_orchestrator::{Dispatch, MaskingOrchestrator};
use proxy_test_utils::{fixtures, MockPiiDetectorClient};
use std::sync::Arc;

fn config(mode: DispatchMode) -> Arc<ProxyConfig> {
    Arc::new(ProxyConfig {
        pii_detection: PiiDetectionConfig {
            enabled: true,
            ..PiiDetectionConfig::default()
        },
        masking: MaskingConfig::default(),
        mode,
        providers: Default::default(),
    })
}

/// Scenario A from the masking design: a chat message naming a person and
/// an email address comes back with both replaced and the context able to
/// reverse the substitution.
#[tokio::test]
async fn chat_request_with_pii_is_masked_and_reversible() {
    let request = fixtures::chat_request_with_pii();
    let pii_text = "Email Dr. Sarah Chen at sarah@hospital.org";
    let detector = MockPiiDetectorClient::keyed([(
        pii_text,
        vec![
            Entity::new("PERSON", 6, 20, 0.85, EntitySource::PiiDetector, pii_text.len()).unwrap(),
            Entity::new(
                "EMAIL_ADDRESS",
                24,
                pii_text.len(),
                0.95,
                EntitySource::PiiDetector,
                pii_text.len(),
            )
            .unwrap(),
        ],
    )]);
    let orchestrator = MaskingOrchestrator::new(detector, config(DispatchMode::Mask));

    let dispatch = orchestrator.process(&request).await.unwrap();
    let Dispatch::Forward { request: masked, context } = dispatch else {
        panic!("expected Forward in mask mode");
    };

    let content = masked["messages"][1]["content"].as_str().unwrap();
    assert_eq!(content, "Email [[PERSON_1]] at [[EMAIL_ADDRESS_1]]");
    assert_eq!(context.lookup("[[PERSON_1]]"), Some("Dr. Sarah Chen"));
    assert_eq!(context.lookup("[[EMAIL_ADDRESS_1]]"), Some("sarah@hospital.org"));

    // The system message, which the detector was never asked about (its
    // span carried no entities), passes through untouched.
    assert_eq!(masked["messages"][0]["content"], "Be concise.");
}

/// Multimodal content: only the "text" part is sent through the pipeline,
/// the image part is reassembled byte-for-byte unchanged.
#[tokio::test]
async fn multimodal_chat_request_only_masks_the_text_part() {
    let request = fixtures::chat_request_multimodal();
    let detector = MockPiiDetectorClient::returning(vec![Entity::new(
        "EMAIL_ADDRESS",
        21,
        37,
        0.9,
        EntitySource::PiiDetector,
        37,
    )
    .unwrap()]);
    let orchestrator = MaskingOrchestrator::new(detector, config(DispatchMode::Mask));

    let dispatch = orchestrator.process(&request).await.unwrap();
    let Dispatch::Forward { request: masked, .. } = dispatch else {
        panic!("expected Forward");
    };

    let parts = masked["messages"][0]["content"].as_array().unwrap();
    assert!(parts[0]["text"].as_str().unwrap().contains("[[EMAIL_ADDRESS_1]]"));
    assert_eq!(
        parts[1]["image_url"]["url"],
        "https://example.com/a.png",
        "non-text parts must reassemble untouched"
    );
}

/// Secret scanning runs even when the analyzer client is never asked
/// (PII detection disabled) - the embedded API key is still masked.
#[tokio::test]
async fn completions_request_secret_is_masked_even_with_pii_detection_disabled() {
    let request = fixtures::completions_request_with_secret();
    let detector = MockPiiDetectorClient::returning(vec![]);
    let mut cfg = (*config(DispatchMode::Mask)).clone();
    cfg.pii_detection.enabled = false;
    let orchestrator = MaskingOrchestrator::new(detector, Arc::new(cfg));

    let dispatch = orchestrator.process(&request).await.unwrap();
    let Dispatch::Forward { request: masked, context } = dispatch else {
        panic!("expected Forward");
    };

    let prompt = masked["prompt"].as_str().unwrap();
    assert!(prompt.contains("[[API_KEY_1]]"));
    assert_eq!(context.lookup("[[API_KEY_1]]"), Some("sk_live_12345"));
}

/// Route mode: a request whose scanner or detector found anything diverts
/// to on-premise dispatch with the ORIGINAL request, never a masked one.
#[tokio::test]
async fn route_mode_sends_the_original_request_on_prem_when_a_secret_is_present() {
    let request = fixtures::completions_request_with_secret();
    let detector = MockPiiDetectorClient::returning(vec![]);
    let orchestrator = MaskingOrchestrator::new(detector, config(DispatchMode::Route));

    let dispatch = orchestrator.process(&request).await.unwrap();
    match dispatch {
        Dispatch::RouteOnPrem { request: routed } => assert_eq!(routed, request),
        Dispatch::Forward { .. } => panic!("expected RouteOnPrem: the prompt contains a secret"),
    }
}
