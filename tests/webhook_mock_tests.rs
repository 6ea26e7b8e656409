//! End-to-end webhook tests
//!
//! Drive the telephony webhook routes against a mocked completion backend
//! and assert on the TwiML documents the gateway returns.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, body::Body, http::Request};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use callflow_gateway::{ServerConfig, routes, state::AppState};

const FORWARD_NUMBER: &str = "+15555550100";

fn create_test_config(completion_api_url: String) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 3000,
        tls: None,
        openai_api_key: Some("test-key".to_string()),
        completion_api_url,
        completion_model: "gpt-4".to_string(),
        forward_number: FORWARD_NUMBER.to_string(),
        greeting: "Thanks for calling Southern Garage Doors. How can I help you today?"
            .to_string(),
        system_prompt: "You are a helpful garage door assistant.".to_string(),
        say_voice: None,
        dev_api_key: "secret".to_string(),
        artifact_path: PathBuf::from("artifact/index.js"),
        backup_dir: PathBuf::from("backups"),
        audit_log_path: PathBuf::from("logs/update-log.jsonl"),
        update_required_markers: vec![],
        deploy_hook_url: None,
        request_timeout_seconds: 5,
        cors_allowed_origins: None,
        rate_limit_requests_per_second: 100000,
        rate_limit_burst_size: 100,
    }
}

fn build_app(completion_api_url: String) -> Router {
    let state: Arc<AppState> = AppState::new(create_test_config(completion_api_url));
    routes::api::create_public_router()
        .merge(routes::api::create_voice_router())
        .with_state(state)
}

async fn post_speech(app: Router, speech: Option<&str>) -> String {
    let body = match speech {
        Some(text) => serde_urlencoded::to_string([("SpeechResult", text)]).unwrap(),
        None => String::new(),
    };

    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn completion_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

#[tokio::test]
async fn test_health_check() {
    let app = build_app("http://127.0.0.1:9/unused".to_string());

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn test_inbound_call_gathers_speech() {
    let app = build_app("http://127.0.0.1:9/unused".to_string());

    let request = Request::builder()
        .method("POST")
        .uri("/voice")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    assert!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/xml")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let xml = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(xml.contains("input=\"speech\""));
    assert!(xml.contains("action=\"/process\""));
    assert!(xml.contains("Thanks for calling Southern Garage Doors"));
}

#[tokio::test]
async fn test_empty_speech_transfers_without_completion_call() {
    // A mock with an expectation of zero calls: any request to the
    // completion endpoint fails the test on drop
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("should never be used"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = build_app(format!("{}/v1/chat/completions", mock_server.uri()));

    for speech in [None, Some(""), Some("   ")] {
        let xml = post_speech(app.clone(), speech).await;
        assert!(xml.contains("I'm sorry, I didn't catch that"), "{xml}");
        assert!(xml.contains(&format!("<Dial>{FORWARD_NUMBER}</Dial>")), "{xml}");
    }
}

#[tokio::test]
async fn test_process_answers_twiml_for_unexpected_content_type() {
    // A webhook must answer in TwiML even when the provider posts something
    // other than an urlencoded form; an unparseable body is a no-speech turn
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("should never be used"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = build_app(format!("{}/v1/chat/completions", mock_server.uri()));

    let request = Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"SpeechResult": "hello"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    assert!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/xml")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let xml = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(xml.contains("I'm sorry, I didn't catch that"), "{xml}");
    assert!(xml.contains(&format!("<Dial>{FORWARD_NUMBER}</Dial>")), "{xml}");
}

#[tokio::test]
async fn test_spring_shortcut_bypasses_completion() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("should never be used"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = build_app(format!("{}/v1/chat/completions", mock_server.uri()));

    let xml = post_speech(app, Some("My garage door SPRING is broken")).await;
    assert!(xml.contains("A standard spring replacement is $599"), "{xml}");
    // Loops back to the entry prompt
    assert!(xml.contains("<Redirect method=\"POST\">/voice</Redirect>"), "{xml}");
    assert!(!xml.contains("<Dial>"), "{xml}");
}

#[tokio::test]
async fn test_spring_shortcut_survives_completion_outage() {
    // No mock server at all: the endpoint is unreachable. The shortcut must
    // still produce the quote.
    let app = build_app("http://127.0.0.1:9/v1/chat/completions".to_string());

    let xml = post_speech(app, Some("my spring snapped")).await;
    assert!(xml.contains("A standard spring replacement is $599"), "{xml}");
    assert!(xml.contains("/voice"), "{xml}");
}

#[tokio::test]
async fn test_plain_reply_is_spoken_and_reprompted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "gpt-4"})))
        .respond_with(completion_response(
            "Garage door openers usually last 10 to 15 years.",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_app(format!("{}/v1/chat/completions", mock_server.uri()));

    let xml = post_speech(app, Some("How long do openers last")).await;
    assert!(
        xml.contains("<Say>Garage door openers usually last 10 to 15 years.</Say>"),
        "{xml}"
    );
    assert!(xml.contains("<Gather"), "{xml}");
    assert!(xml.contains("action=\"/process\""), "{xml}");
    assert!(!xml.contains("<Dial>"), "{xml}");
}

#[tokio::test]
async fn test_transfer_reply_dials_operator() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_response("I'll transfer you to a technician"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_app(format!("{}/v1/chat/completions", mock_server.uri()));

    let xml = post_speech(app, Some("I need help right now")).await;
    assert!(xml.contains("Transferring you now."), "{xml}");
    assert!(xml.contains(&format!("<Dial>{FORWARD_NUMBER}</Dial>")), "{xml}");
    assert!(!xml.contains("<Gather"), "{xml}");
}

#[tokio::test]
async fn test_completion_failure_falls_back_to_operator() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "upstream exploded"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = build_app(format!("{}/v1/chat/completions", mock_server.uri()));

    let xml = post_speech(app, Some("How much is a new door")).await;
    assert!(xml.contains("Sorry, there was a problem"), "{xml}");
    assert!(xml.contains(&format!("<Dial>{FORWARD_NUMBER}</Dial>")), "{xml}");
}

#[tokio::test]
async fn test_unreachable_completion_endpoint_falls_back_to_operator() {
    let app = build_app("http://127.0.0.1:9/v1/chat/completions".to_string());

    let xml = post_speech(app, Some("How much is a new door")).await;
    assert!(xml.contains("Sorry, there was a problem"), "{xml}");
    assert!(xml.contains("<Dial>"), "{xml}");
}
