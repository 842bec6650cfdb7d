use serde_json::json;
use std::fs;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

use crate::extractor::transcript::TranscriptClient;
use crate::extractor::{ContentSource, ContentType, ExtractError, Extractor};
use crate::fetcher::{FetchPolicy, Fetcher};

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
const TRANSCRIPT_PATH: &str = "/api/transcripts";

fn extractor_with_transcripts(
    transcript_url: String,
    api_key: Option<&str>,
    timeout: Duration,
) -> Extractor {
    let policy = FetchPolicy {
        timeout: Duration::from_secs(5),
        max_attempts: 3,
        backoff_base: Duration::from_millis(1),
    };
    let transcripts =
        TranscriptClient::new(transcript_url, api_key.map(str::to_string), timeout).unwrap();
    Extractor::new(Fetcher::new(policy).unwrap(), transcripts)
}

fn test_extractor(server: &MockServer, api_key: Option<&str>) -> Extractor {
    extractor_with_transcripts(
        format!("{}{}", server.uri(), TRANSCRIPT_PATH),
        api_key,
        Duration::from_secs(5),
    )
}

fn html_response(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("Content-Type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_extract_article_fixture() {
    let html = fs::read_to_string("src/extractor/tests/fixtures/article.html")
        .expect("Failed to read test fixture");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(html_response(html))
        .mount(&server)
        .await;

    let url = format!("{}/article", server.uri());
    let content = test_extractor(&server, None).extract(&url).await.unwrap();

    assert_eq!(content.title, "Sample Article - News Site");
    assert_eq!(content.content_type, ContentType::Article);
    assert_eq!(content.url, url);
    assert!(content.content.contains("first paragraph"));
    assert!(content.content.contains("second paragraph"));
    assert!(!content.content.contains("analytics"));
    assert!(!content.content.contains("injected"));
    assert!(!content.content.contains("font-family"));
    assert!(!content.content.contains("  "));
}

#[tokio::test]
async fn test_short_article_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tiny"))
        .respond_with(html_response(
            "<html><head><title>Tiny</title></head><body>Too little text.</body></html>",
        ))
        .mount(&server)
        .await;

    let url = format!("{}/tiny", server.uri());
    let failure = test_extractor(&server, None)
        .extract(&url)
        .await
        .unwrap_err();

    assert_eq!(failure.error, ExtractError::ContentTooShort(ContentType::Article));
    assert_eq!(failure.url, url);
}

#[tokio::test]
async fn test_article_retries_transient_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html_response(format!(
            "<html><head><title>Recovered</title></head><body><p>{}</p></body></html>",
            "Content that eventually loads after the upstream recovers. ".repeat(5)
        )))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/flaky", server.uri());
    let content = test_extractor(&server, None).extract(&url).await.unwrap();
    assert_eq!(content.title, "Recovered");
}

#[tokio::test]
async fn test_article_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/down", server.uri());
    let failure = test_extractor(&server, None)
        .extract(&url)
        .await
        .unwrap_err();
    assert_eq!(failure.error, ExtractError::Http { status: 502 });
}

#[tokio::test]
async fn test_article_404_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let failure = test_extractor(&server, None)
        .extract(&url)
        .await
        .unwrap_err();
    assert_eq!(failure.error, ExtractError::Http { status: 404 });
}

#[tokio::test]
async fn test_blank_url_is_invalid_input() {
    let server = MockServer::start().await;
    let failure = test_extractor(&server, None)
        .extract("   ")
        .await
        .unwrap_err();
    assert_eq!(failure.error, ExtractError::InvalidInput);
}

#[tokio::test]
async fn test_extract_video_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSCRIPT_PATH))
        .and(header("authorization", "Basic test-key"))
        .and(body_json(json!({ "ids": ["dQw4w9WgXcQ"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "dQw4w9WgXcQ",
            "tracks": [{
                "language": "en",
                "transcript": [
                    { "text": "Welcome to this lecture on plate tectonics.", "start": "0.0", "dur": "3.1" },
                    { "text": "Today we look at how continents drift over time.", "start": "3.1", "dur": "4.0" }
                ]
            }]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let content = test_extractor(&server, Some("test-key"))
        .extract(VIDEO_URL)
        .await
        .unwrap();

    assert_eq!(content.title, "YouTube Video: dQw4w9WgXcQ");
    assert_eq!(content.content_type, ContentType::Video);
    assert_eq!(
        content.content,
        "Welcome to this lecture on plate tectonics. Today we look at how continents drift over time."
    );
}

#[tokio::test]
async fn test_transcript_404_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSCRIPT_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let failure = test_extractor(&server, Some("test-key"))
        .extract(VIDEO_URL)
        .await
        .unwrap_err();

    assert_eq!(failure.error, ExtractError::TranscriptUnavailable { status: 404 });
    assert!(failure.to_string().contains("404"));
}

#[tokio::test]
async fn test_transcript_non_json_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSCRIPT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let failure = test_extractor(&server, Some("test-key"))
        .extract(VIDEO_URL)
        .await
        .unwrap_err();

    assert!(matches!(failure.error, ExtractError::ParseError(_)));
}

#[tokio::test]
async fn test_short_transcript_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSCRIPT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "text": "[Music]" }])))
        .mount(&server)
        .await;

    let failure = test_extractor(&server, Some("test-key"))
        .extract(VIDEO_URL)
        .await
        .unwrap_err();

    assert_eq!(failure.error, ExtractError::ContentTooShort(ContentType::Video));
}

#[tokio::test]
async fn test_slow_transcript_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSCRIPT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "text": "never delivered in time" }]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let extractor = extractor_with_transcripts(
        format!("{}{}", server.uri(), TRANSCRIPT_PATH),
        Some("test-key"),
        Duration::from_millis(200),
    );
    let failure = extractor.extract(VIDEO_URL).await.unwrap_err();

    assert_eq!(failure.error, ExtractError::TranscriptTimeout);
    assert_eq!(failure.url, VIDEO_URL);
    assert_eq!(failure.to_string(), "Request timed out. Please try again.");
}

#[tokio::test]
async fn test_unreachable_transcript_service_is_connection_error() {
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let extractor = extractor_with_transcripts(
        format!("http://127.0.0.1:{}{}", closed_port, TRANSCRIPT_PATH),
        Some("test-key"),
        Duration::from_secs(2),
    );
    let failure = extractor.extract(VIDEO_URL).await.unwrap_err();

    assert_eq!(failure.error, ExtractError::TranscriptConnection);
    assert_eq!(failure.url, VIDEO_URL);
}

#[tokio::test]
async fn test_missing_api_key_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let failure = test_extractor(&server, None)
        .extract(VIDEO_URL)
        .await
        .unwrap_err();

    assert_eq!(failure.error, ExtractError::MissingApiKey);
}

#[tokio::test]
async fn test_video_url_without_id_is_invalid() {
    let server = MockServer::start().await;
    let failure = test_extractor(&server, Some("test-key"))
        .extract("https://www.youtube.com/@somechannel")
        .await
        .unwrap_err();

    assert_eq!(failure.error, ExtractError::InvalidVideoUrl);
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use crate::extractor::article::html_to_text;
    use crate::extractor::video::{classify, extract_video_id};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_html_to_text_never_panics(html in ".*") {
            let article = html_to_text(&html);
            prop_assert!(!article.title.is_empty());
            prop_assert!(!article.text.contains("  "));
        }

        #[test]
        fn test_url_routing_never_panics(url in ".*") {
            let _ = classify(&url);
            let _ = extract_video_id(&url);
        }
    }
}
