//! End-to-end integration tests for pdf-form-filler.
//!
//! A mock question-answering endpoint runs on `127.0.0.1:0` so the real
//! `HttpTransport` (reqwest, bearer auth, timeouts) is exercised without any
//! network access. Tests that need pdfium skip themselves when the library
//! cannot be bound.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pdf_form_filler::pipeline::extract::{bind_pdfium, DocumentReader, PdfiumReader};
use pdf_form_filler::pipeline::layout::{DocumentLayout, PageLayout, TextLine};
use pdf_form_filler::pipeline::render::{DocumentWriter, PdfiumWriter};
use pdf_form_filler::server::{self, AppState};
use pdf_form_filler::{
    Answer, FillConfig, FormFillError, FormFiller, InferenceClient, InferenceError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

// ── Mock inference endpoint ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Recorded {
    authorization: Option<String>,
    body: serde_json::Value,
}

/// Replays scripted `(status, body)` replies; answers 503 once the script is
/// exhausted.
#[derive(Default)]
struct MockEndpoint {
    replies: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<Recorded>>,
    delay: Option<Duration>,
}

impl MockEndpoint {
    fn new(replies: impl IntoIterator<Item = (u16, String)>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn answer(text: &str) -> (u16, String) {
    (200, serde_json::json!({ "answer": text, "score": 0.87, "start": 0, "end": 4 }).to_string())
}

fn status(code: u16) -> (u16, String) {
    (code, format!("{{\"error\":\"status {code}\"}}"))
}

async fn qa_handler(
    State(mock): State<Arc<MockEndpoint>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, String) {
    mock.requests.lock().unwrap().push(Recorded {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    if let Some(delay) = mock.delay {
        tokio::time::sleep(delay).await;
    }
    let (code, body) = mock.replies.lock().unwrap().pop_front().unwrap_or_else(|| status(503));
    (StatusCode::from_u16(code).unwrap(), body)
}

/// Start the mock and return its endpoint URL.
async fn spawn_mock(mock: Arc<MockEndpoint>) -> String {
    let app = Router::new().route("/qa", post(qa_handler)).with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/qa")
}

fn config_for(endpoint: &str) -> FillConfig {
    FillConfig::builder()
        .endpoint(endpoint)
        .api_token("test-token")
        .request_timeout(Duration::from_secs(5))
        .without_delays()
        .build()
        .unwrap()
}

// ── Fakes for the pdfium stages ──────────────────────────────────────────────

struct FakeReader(HashMap<&'static str, String>);

impl FakeReader {
    fn new(questions: &str, data: &str) -> Arc<Self> {
        Arc::new(Self(HashMap::from([
            ("questions", questions.to_string()),
            ("data", data.to_string()),
        ])))
    }
}

#[async_trait]
impl DocumentReader for FakeReader {
    async fn extract_text(&self, document: &str, _bytes: &[u8]) -> Result<String, FormFillError> {
        self.0
            .get(document)
            .cloned()
            .ok_or_else(|| FormFillError::Internal(format!("unexpected document {document}")))
    }
}

struct FakeWriter;

#[async_trait]
impl DocumentWriter for FakeWriter {
    async fn write_pdf(&self, layout: &DocumentLayout) -> Result<Vec<u8>, FormFillError> {
        Ok(format!("%PDF-fake {} lines", layout.line_count()).into_bytes())
    }
}

const DATA_TEXT: &str = "APPLICANT INFORMATION\n\
Full Name: John Smith\n\
Email: john.smith@email.com\n\
Current Position: Senior Software Engineer at Tech Innovations Inc.";

fn app_with(endpoint: &str, questions: &str) -> Router {
    let config = config_for(endpoint);
    let client = InferenceClient::new(&config).unwrap();
    let filler = FormFiller::with_parts(
        config,
        FakeReader::new(questions, DATA_TEXT),
        Arc::new(FakeWriter),
        client,
    );
    server::router(AppState::new(filler))
}

const BOUNDARY: &str = "e2e-boundary-7MA4YWxkTrZu0gW";

fn fill_request(fields: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, data) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/fill-form")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Skip this test when no pdfium library can be bound.
macro_rules! skip_unless_pdfium {
    () => {{
        if let Err(e) = bind_pdfium() {
            println!("SKIP — pdfium unavailable: {e}");
            println!("       Set PDFIUM_LIB_PATH=/path/to/libpdfium");
            return;
        }
    }};
}

// ── Inference over HTTP ──────────────────────────────────────────────────────

#[tokio::test]
async fn model_loading_then_answer() {
    let mock = MockEndpoint::new([status(503), status(503), answer("John Smith")]);
    let endpoint = spawn_mock(mock.clone()).await;
    let client = InferenceClient::new(&config_for(&endpoint)).unwrap();

    let got = client.answer("What is your full name?", DATA_TEXT).await;

    assert_eq!(got, Answer::Found("John Smith".into()));
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test]
async fn persistent_rate_limit_is_not_found() {
    let mock = MockEndpoint::new([status(429), status(429), status(429), status(429)]);
    let endpoint = spawn_mock(mock.clone()).await;
    let client = InferenceClient::new(&config_for(&endpoint)).unwrap();

    let got = client.answer("What is your salary?", DATA_TEXT).await;

    assert!(
        matches!(got, Answer::NotFound(InferenceError::RetriesExhausted { attempts: 3, .. })),
        "{got:?}"
    );
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test]
async fn payload_and_bearer_header() {
    let mock = MockEndpoint::new([answer("john.smith@email.com")]);
    let endpoint = spawn_mock(mock.clone()).await;
    let client = InferenceClient::new(&config_for(&endpoint)).unwrap();

    client.answer("What is your email address?", "Email: john.smith@email.com").await;

    let requests = mock.requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-token"));
    assert_eq!(requests[0].body["inputs"]["question"], "What is your email address?");
    assert_eq!(requests[0].body["inputs"]["context"], "Email: john.smith@email.com");
}

#[tokio::test]
async fn no_token_sends_no_authorization() {
    let mock = MockEndpoint::new([answer("x")]);
    let endpoint = spawn_mock(mock.clone()).await;
    let config = FillConfig::builder()
        .endpoint(&endpoint)
        .without_delays()
        .build()
        .unwrap();
    let client = InferenceClient::new(&config).unwrap();

    client.answer("Name?", "ctx").await;
    assert_eq!(mock.requests()[0].authorization, None);
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let mock = MockEndpoint::new([status(500), answer("never reached")]);
    let endpoint = spawn_mock(mock.clone()).await;
    let client = InferenceClient::new(&config_for(&endpoint)).unwrap();

    let got = client.answer("What is your full name?", DATA_TEXT).await;

    assert!(
        matches!(got, Answer::NotFound(InferenceError::Rejected { status: 500, .. })),
        "{got:?}"
    );
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn list_shaped_response_uses_first_element() {
    let body = serde_json::json!([{ "answer": "San Francisco", "score": 0.9 }]).to_string();
    let mock = MockEndpoint::new([(200, body)]);
    let endpoint = spawn_mock(mock).await;
    let client = InferenceClient::new(&config_for(&endpoint)).unwrap();

    assert_eq!(
        client.answer("Which city?", DATA_TEXT).await,
        Answer::Found("San Francisco".into())
    );
}

#[tokio::test]
async fn slow_endpoint_times_out_and_retries() {
    let mock = MockEndpoint::slow(Duration::from_secs(2));
    let endpoint = spawn_mock(mock.clone()).await;
    let config = FillConfig::builder()
        .endpoint(&endpoint)
        .request_timeout(Duration::from_millis(200))
        .max_attempts(2)
        .without_delays()
        .build()
        .unwrap();
    let client = InferenceClient::new(&config).unwrap();

    let got = client.answer("What is your full name?", DATA_TEXT).await;

    assert!(
        matches!(got, Answer::NotFound(InferenceError::RetriesExhausted { attempts: 2, .. })),
        "{got:?}"
    );
    assert_eq!(mock.requests().len(), 2);
}

// ── HTTP surface ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    let app = app_with("http://127.0.0.1:9/unused", "Q?");
    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn index_serves_upload_form() {
    let app = app_with("http://127.0.0.1:9/unused", "Q?");
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(html.contains("questions_pdf"));
    assert!(html.contains("data_pdf"));
}

#[tokio::test]
async fn no_questions_is_400_without_remote_calls() {
    let mock = MockEndpoint::new([answer("unused")]);
    let endpoint = spawn_mock(mock.clone()).await;
    let app = app_with(&endpoint, "Application Form\nPlease print clearly.");

    let resp = app
        .oneshot(fill_request(&[
            ("questions_pdf", b"%PDF q"),
            ("data_pdf", b"%PDF d"),
        ]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(html.contains("No questions found"), "{html}");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn fill_returns_pdf_attachment() {
    let mock = MockEndpoint::new([answer("John Smith"), answer("28")]);
    let endpoint = spawn_mock(mock.clone()).await;
    let app = app_with(&endpoint, "What is your name?\nRandom line.\nAge?");

    let resp = app
        .oneshot(fill_request(&[
            ("questions_pdf", b"%PDF q"),
            ("data_pdf", b"%PDF d"),
        ]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"filled_form.pdf\""
    );
    assert!(body_bytes(resp).await.starts_with(b"%PDF"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body["inputs"]["question"], "What is your name?");
    assert_eq!(requests[1].body["inputs"]["question"], "Age?");
}

#[tokio::test]
async fn missing_questions_field_is_400() {
    let app = app_with("http://127.0.0.1:9/unused", "Q?");
    let resp = app
        .oneshot(fill_request(&[("data_pdf", b"%PDF d")]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(html.contains("questions_pdf"), "{html}");
}

#[tokio::test]
async fn non_pdf_upload_is_400() {
    let mock = MockEndpoint::new([]);
    let endpoint = spawn_mock(mock.clone()).await;
    let config = config_for(&endpoint);
    let client = InferenceClient::new(&config).unwrap();
    let filler = FormFiller::with_parts(config, Arc::new(PdfiumReader), Arc::new(FakeWriter), client);
    let app = server::router(AppState::new(filler));

    let resp = app
        .oneshot(fill_request(&[
            ("questions_pdf", b"plain text, not a pdf"),
            ("data_pdf", b"%PDF d"),
        ]))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(mock.requests().is_empty());
}

// ── Real PDFs (pdfium) ───────────────────────────────────────────────────────

fn text_pdf_layout(lines: &[&str]) -> DocumentLayout {
    DocumentLayout {
        page_width: 612.0,
        page_height: 792.0,
        font_size: 12.0,
        pages: vec![PageLayout {
            lines: lines
                .iter()
                .enumerate()
                .map(|(i, text)| TextLine {
                    x: 72.0,
                    y: 720.0 - 20.0 * i as f32,
                    text: text.to_string(),
                })
                .collect(),
        }],
    }
}

#[tokio::test]
async fn fill_real_pdfs_round_trip() {
    skip_unless_pdfium!();

    let questions_pdf = PdfiumWriter
        .write_pdf(&text_pdf_layout(&[
            "Job Application Form",
            "What is your full name?",
            "Please answer every question.",
            "What is your email address?",
        ]))
        .await
        .unwrap();
    let data_pdf = PdfiumWriter
        .write_pdf(&text_pdf_layout(&[
            "Full Name: John Smith",
            "Email: john.smith@email.com",
        ]))
        .await
        .unwrap();

    let mock = MockEndpoint::new([answer("John Smith"), answer("john.smith@email.com")]);
    let endpoint = spawn_mock(mock.clone()).await;
    let filler = FormFiller::new(config_for(&endpoint)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let q_path = dir.path().join("questions.pdf");
    let d_path = dir.path().join("data.pdf");
    let out_path = dir.path().join("filled_form.pdf");
    std::fs::write(&q_path, &questions_pdf).unwrap();
    std::fs::write(&d_path, &data_pdf).unwrap();

    let output = filler.fill_to_file(&q_path, &d_path, &out_path).await.unwrap();
    assert_eq!(output.stats.total_questions, 2);
    assert_eq!(output.stats.answered, 2);
    assert_eq!(mock.requests().len(), 2);
    assert!(mock.requests()[0].body["inputs"]["context"]
        .as_str()
        .unwrap()
        .contains("John Smith"));

    let written = std::fs::read(&out_path).unwrap();
    let text = PdfiumReader.extract_text("answers", &written).await.unwrap();
    assert!(text.contains("Q: What is your full name?"), "{text}");
    assert!(text.contains("A: John Smith"), "{text}");
    assert!(text.contains("A: john.smith@email.com"), "{text}");
}
