#![cfg(feature = "agi")]

use async_trait::async_trait;
use futures_util::StreamExt;
use webui_pipes::pipes::agi::{AgiPipe, AgiValves};
use webui_pipes::traits::{Pipe, StatusEmitter, StatusEvent};
use webui_pipes::types::{ChatRequest, Message, UserContext};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipe_for(server: &MockServer) -> AgiPipe {
    AgiPipe::new(AgiValves::new(&format!("{}/api/agi/chat", server.uri())).with_api_key("agi-test"))
}

fn chat_request() -> ChatRequest {
    ChatRequest::new("gpt-4o").with_message(Message::user("hello"))
}

async fn sent_body(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    serde_json::from_slice(&requests[0].body).unwrap()
}

#[tokio::test]
async fn relays_json_responses_verbatim() {
    let server = MockServer::start().await;
    let upstream = serde_json::json!({
        "id": "agi-1",
        "choices": [{"message": {"role": "assistant", "content": "hello"}}],
        "agi_extension": {"plan_steps": 3}
    });
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .mount(&server)
        .await;

    let output = pipe_for(&server).pipe(chat_request()).await;

    assert_eq!(output.into_json().expect("json output"), upstream);
}

#[tokio::test]
async fn relays_stream_lines_verbatim() {
    let server = MockServer::start().await;
    let body = "data: {\"a\":1}\n\nplain\r\nline b\ntail";
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_raw(body, "text/event-stream"),
        )
        .mount(&server)
        .await;

    let output = pipe_for(&server).pipe(chat_request().with_stream(true)).await;
    let mut stream = output.into_stream().expect("stream output");

    let mut lines = Vec::new();
    while let Some(line) = stream.next().await {
        lines.push(line.unwrap());
    }

    // No marker stripping, no filtering: even blank lines reach the host,
    // and the unterminated tail is flushed.
    assert_eq!(
        lines,
        vec![
            "data: {\"a\":1}".to_string(),
            String::new(),
            "plain".to_string(),
            "line b".to_string(),
            "tail".to_string(),
        ]
    );
}

#[tokio::test]
async fn sends_session_and_authorization_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .and(header("authorization", "Bearer agi-test"))
        .and(header("x-session-id", "session-42"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let user = UserContext {
        id: Some("session-42".to_string()),
        ..Default::default()
    };
    let output = pipe_for(&server).pipe(chat_request().with_user(user)).await;

    assert!(output.into_json().is_some());
    server.verify().await;
}

#[tokio::test]
async fn fills_payload_defaults_for_a_bare_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .and(header("x-session-id", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    pipe_for(&server).pipe(ChatRequest::new("").with_message(Message::user("hi"))).await;

    let body = sent_body(&server).await;
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["stream"], false);
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["max_tokens"], 16384);
    assert_eq!(
        body["user"],
        serde_json::json!({
            "uuid": "default",
            "name": "User",
            "context": "",
            "environment": "{}"
        })
    );
}

#[tokio::test]
async fn forwards_request_values_and_user_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .and(header("x-session-id", "u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let user = UserContext {
        id: Some("u-1".to_string()),
        name: Some("Ada".to_string()),
        context: Some("ops".to_string()),
        environment: Some(serde_json::json!({"os": "linux"})),
    };
    let request = ChatRequest::new("claude-sonnet")
        .with_message(Message::user("hi"))
        .with_temperature(0.3)
        .with_max_tokens(512)
        .with_user(user);
    pipe_for(&server).pipe(request).await;

    let body = sent_body(&server).await;
    assert_eq!(body["model"], "claude-sonnet");
    assert_eq!(body["temperature"], 0.3);
    assert_eq!(body["max_tokens"], 512);
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["context"], "ops");

    // The environment document travels as a JSON string.
    let environment = body["user"]["environment"].as_str().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(environment).unwrap();
    assert_eq!(parsed, serde_json::json!({"os": "linux"}));
}

#[tokio::test]
async fn upstream_error_bodies_are_wrapped_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "exploded"})),
        )
        .mount(&server)
        .await;

    let output = pipe_for(&server).pipe(chat_request()).await;

    let error = output.as_error().expect("error output");
    assert_eq!(
        error.error,
        r#"Error connecting to AGI chat: HTTP 500 - {"error":"exploded"}"#
    );
}

#[tokio::test]
async fn plain_text_error_bodies_keep_status_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let output = pipe_for(&server).pipe(chat_request()).await;

    let error = output.as_error().expect("error output");
    assert_eq!(
        error.error,
        "Error connecting to AGI chat: HTTP error 502: bad gateway"
    );
}

#[tokio::test]
async fn invalid_url_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipe = AgiPipe::new(AgiValves::new("localhost:9000"));
    let output = pipe.pipe(chat_request()).await;

    let error = output.as_error().expect("error output");
    assert!(error.error.contains("must start with http"));
    server.verify().await;
}

#[derive(Default)]
struct RecordingEmitter {
    events: tokio::sync::Mutex<Vec<StatusEvent>>,
}

#[async_trait]
impl StatusEmitter for RecordingEmitter {
    async fn emit(&self, event: StatusEvent) {
        self.events.lock().await.push(event);
    }
}

#[tokio::test]
async fn status_events_bracket_a_successful_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let emitter = RecordingEmitter::default();
    let output = pipe_for(&server)
        .pipe_with_status(chat_request(), Some(&emitter))
        .await;

    assert!(output.into_json().is_some());
    let events = emitter.events.lock().await;
    assert_eq!(
        *events,
        vec![StatusEvent::InProgress, StatusEvent::Complete]
    );
}

#[tokio::test]
async fn status_events_report_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/agi/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let emitter = RecordingEmitter::default();
    let output = pipe_for(&server)
        .pipe_with_status(chat_request(), Some(&emitter))
        .await;

    assert!(output.as_error().is_some());
    let events = emitter.events.lock().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StatusEvent::InProgress);
    match &events[1] {
        StatusEvent::Error { error } => assert!(error.contains("boom")),
        other => panic!("expected error status, got {other:?}"),
    }
}
