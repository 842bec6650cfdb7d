use recap::llm::{GoogleBackend, LlmBackend, LlmError, OpenAiBackend};
use recap::quiz::{QuizGenerator, parse_questions};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const OPENAI_PATH: &str = "/v1/chat/completions";

fn gemini_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn openai_text(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }]
    })
}

fn prompt_of(request: &Request) -> String {
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_gemini_summarize() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("A short summary.")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = GoogleBackend::new("g-key", "gemini-2.5-flash", server.uri()).unwrap();
    let summary = backend.summarize("Some article text").await.unwrap();

    assert_eq!(summary, "A short summary.");
    assert_eq!(backend.model_name(), "google-gemini-2.5-flash");

    let requests = server.received_requests().await.unwrap();
    let prompt = prompt_of(&requests[0]);
    assert!(prompt.contains("150-200 words"));
    assert!(prompt.contains("Some article text"));
}

#[tokio::test]
async fn test_gemini_quiz_prompt_carries_question_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text(
            "```json\n{\"questions\": [{\"id\": 1, \"question\": \"Q\", \"type\": \"fill_blank\", \"correct_answer\": \"A\"}]}\n```",
        )))
        .mount(&server)
        .await;

    let backend = Arc::new(GoogleBackend::new("g-key", "gemini-2.5-flash", server.uri()).unwrap());
    let quiz = QuizGenerator::new(backend, 3)
        .generate("the summary", "the content")
        .await
        .unwrap();
    assert_eq!(quiz.questions.len(), 1);

    let requests = server.received_requests().await.unwrap();
    let prompt = prompt_of(&requests[0]);
    assert!(prompt.contains("generate 3 educational quiz questions"));
    assert!(prompt.contains("SUMMARY (use this for context):\nthe summary"));
    assert!(prompt.contains("SOURCE CONTENT (ground questions here):\nthe content"));
}

#[tokio::test]
async fn test_gemini_api_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let backend = GoogleBackend::new("bad", "gemini-2.5-flash", server.uri()).unwrap();
    let err = backend.summarize("text").await.unwrap_err();

    assert_eq!(
        err,
        LlmError::Api {
            status: 400,
            message: "API key not valid.".into()
        }
    );
}

#[tokio::test]
async fn test_gemini_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let backend = GoogleBackend::new("g-key", "gemini-2.5-flash", server.uri()).unwrap();
    let err = backend.summarize("text").await.unwrap_err();
    assert_eq!(
        err,
        LlmError::Api {
            status: 503,
            message: "upstream unavailable".into()
        }
    );
}

#[tokio::test]
async fn test_openai_summarize() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(header("authorization", "Bearer o-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.7,
            "messages": [{ "role": "system", "content": "You are an expert summarizer. Provide clear, educational summaries." }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text("Summary from OpenAI.")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new("o-key", "gpt-4o-mini", server.uri(), 100_000).unwrap();
    let summary = backend.summarize("Some article text").await.unwrap();

    assert_eq!(summary, "Summary from OpenAI.");
    assert_eq!(backend.model_name(), "openai-gpt-4o-mini");
}

#[tokio::test]
async fn test_openai_truncates_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text("ok")))
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new("o-key", "gpt-4o-mini", server.uri(), 20).unwrap();
    let content = format!("{}{}", "k".repeat(20), "DROPPED");
    backend.summarize(&content).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user_prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(user_prompt.contains(&"k".repeat(20)));
    assert!(!user_prompt.contains("DROPPED"));
}

#[tokio::test]
async fn test_openai_quiz_output_parses() {
    let server = MockServer::start().await;
    let quiz = json!({
        "questions": [
            { "id": 1, "question": "Q1", "type": "true_false", "correct_answer": false, "explanation": "e" },
            { "id": 2, "question": "Q2", "type": "multiple_choice", "options": ["a", "b"], "correct_answer": "a", "explanation": "e" }
        ]
    });
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(body_partial_json(json!({
            "messages": [{ "role": "system", "content": "You are an expert quiz generator for educational content. Return ONLY valid JSON." }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_text(&quiz.to_string())))
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new("o-key", "gpt-4o-mini", server.uri(), 100_000).unwrap();
    let raw = backend.generate_quiz("summary", "content", 2).await.unwrap();
    assert_eq!(parse_questions(&raw).unwrap().len(), 2);
}

#[tokio::test]
async fn test_openai_empty_choice_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new("o-key", "gpt-4o-mini", server.uri(), 100_000).unwrap();
    assert_eq!(
        backend.summarize("text").await.unwrap_err(),
        LlmError::EmptyResponse
    );
}

#[tokio::test]
async fn test_unreachable_backend_is_request_error() {
    let backend = OpenAiBackend::new("o-key", "gpt-4o-mini", "http://127.0.0.1:1", 100_000).unwrap();
    assert!(matches!(
        backend.summarize("text").await.unwrap_err(),
        LlmError::Request(_)
    ));
}
