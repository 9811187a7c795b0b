//! Integration tests for the OCR tool client and extraction sessions.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wstools_core::{OcrEngine, OcrError, OcrEvent, OcrSession, OcrTool};

async fn mount_tool(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_extract_text_returns_recognized_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("engine", "tesseract"))
        .and(query_param("image", "https://img.example.org/1.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "text": "It was the best of times" })),
        )
        .mount(&server)
        .await;

    let tool = OcrTool::new(&server.uri());
    let text = tool
        .extract_text(
            "https://img.example.org/1.jpg",
            OcrEngine::Tesseract,
            &["en".to_string()],
            "en",
        )
        .await
        .unwrap();
    assert_eq!(text, "It was the best of times");
}

#[tokio::test]
async fn test_tool_error_surfaces_as_tool_error() {
    let server = MockServer::start().await;
    mount_tool(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "error": "Image could not be retrieved" })),
    )
    .await;

    let tool = OcrTool::new(&server.uri());
    let err = tool
        .extract_text("https://img", OcrEngine::Tesseract, &["en".to_string()], "en")
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::Tool { .. }));
    assert!(err.to_string().contains("Image could not be retrieved"));
}

#[tokio::test]
async fn test_empty_text_is_no_text() {
    let server = MockServer::start().await;
    mount_tool(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "text": "" })),
    )
    .await;

    let tool = OcrTool::new(&server.uri());
    let err = tool
        .extract_text("https://img", OcrEngine::Tesseract, &["en".to_string()], "en")
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::NoText));
}

#[tokio::test]
async fn test_session_emits_start_result_end_in_order() {
    let server = MockServer::start().await;
    mount_tool(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "text": "hello" })),
    )
    .await;

    let tool = OcrTool::new(&server.uri());
    let session = OcrSession::new();
    let mut events = session.subscribe();

    let result = session
        .extract(&tool, "https://img", OcrEngine::Tesseract, &["en".to_string()], "en")
        .await;
    assert_eq!(result.unwrap().unwrap(), "hello");

    assert_eq!(events.try_recv().unwrap(), OcrEvent::TextExtractStart);
    assert_eq!(
        events.try_recv().unwrap(),
        OcrEvent::TextExtracted("hello".to_string())
    );
    assert_eq!(events.try_recv().unwrap(), OcrEvent::TextExtractEnd);
    assert!(events.try_recv().is_err(), "no further events");
}

#[tokio::test]
async fn test_session_emits_error_event_on_failure() {
    let server = MockServer::start().await;
    mount_tool(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "error": "bad image" })),
    )
    .await;

    let tool = OcrTool::new(&server.uri());
    let session = OcrSession::new();
    let mut events = session.subscribe();

    let result = session
        .extract(&tool, "https://img", OcrEngine::Tesseract, &["en".to_string()], "en")
        .await;
    assert!(result.unwrap().is_err());

    assert_eq!(events.try_recv().unwrap(), OcrEvent::TextExtractStart);
    assert!(matches!(
        events.try_recv().unwrap(),
        OcrEvent::ExtractError(_)
    ));
    assert_eq!(events.try_recv().unwrap(), OcrEvent::TextExtractEnd);
}

#[tokio::test]
async fn test_cancel_suppresses_the_pending_result() {
    let server = MockServer::start().await;
    mount_tool(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "text": "late text" }))
            .set_delay(Duration::from_millis(200)),
    )
    .await;

    let tool = OcrTool::new(&server.uri());
    let session = OcrSession::new();
    let mut events = session.subscribe();

    let langs = ["en".to_string()];
    let (result, ()) = tokio::join!(
        session.extract(&tool, "https://img", OcrEngine::Tesseract, &langs, "en"),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.cancel();
        }
    );

    assert!(result.is_none(), "cancelled result is suppressed");
    assert_eq!(events.try_recv().unwrap(), OcrEvent::TextExtractStart);
    assert_eq!(events.try_recv().unwrap(), OcrEvent::Cancelling);
    assert_eq!(events.try_recv().unwrap(), OcrEvent::TextExtractEnd);
    assert!(
        events.try_recv().is_err(),
        "no text event after cancellation"
    );
}
