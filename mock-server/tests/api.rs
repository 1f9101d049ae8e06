use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use transkit_mock_server::{app, JobError, MockConfig, MockState};

const KEY: &str = "K";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, key: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {key}"))
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn wrong_key_returns_401() {
    let resp = app(MockState::new(KEY))
        .oneshot(request("GET", "/quota", "nope", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn empty_bearer_returns_401() {
    let resp = app(MockState::new(KEY))
        .oneshot(request("POST", "/online/transcribe", "", r#"{"audio":"AA==","pipeline":"p"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejected_requests_are_still_recorded() {
    let state = MockState::new(KEY);
    app(state.clone())
        .oneshot(request("GET", "/quota", "nope", ""))
        .await
        .unwrap();

    let recorded = state.requests().await;
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].method, "GET");
    assert_eq!(recorded[0].path, "/quota");
    assert_eq!(recorded[0].authorization.as_deref(), Some("Bearer nope"));
    assert_eq!(recorded[0].content_type.as_deref(), Some("application/json"));
}

// --- quota ---

#[tokio::test]
async fn quota_reports_seeded_value() {
    let state = MockConfig::new(KEY).quota(5).build();
    let resp = app(state).oneshot(request("GET", "/quota", KEY, "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"consumedquota": 5}));
}

// --- online ---

#[tokio::test]
async fn online_transcription_returns_text_and_bumps_quota() {
    let state = MockConfig::new(KEY).quota(5).transcript("kaixo mundua").build();
    let resp = app(state.clone())
        .oneshot(request(
            "POST",
            "/online/transcribe",
            KEY,
            r#"{"audio":"AA==","pipeline":"default","tags":["a"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["text"], "kaixo mundua");
    assert_eq!(body["consumedquota"], 6);
    assert_eq!(body["words"].as_array().unwrap().len(), 2);
    assert_eq!(body["words"][1]["word"], "mundua");

    let resp = app(state).oneshot(request("GET", "/quota", KEY, "")).await.unwrap();
    assert_eq!(body_json(resp).await["consumedquota"], 6);
}

#[tokio::test]
async fn online_transcription_without_audio_returns_400() {
    let resp = app(MockState::new(KEY))
        .oneshot(request("POST", "/online/transcribe", KEY, r#"{"audio":"","pipeline":"p"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn online_transcription_malformed_json_returns_400() {
    let resp = app(MockState::new(KEY))
        .oneshot(request("POST", "/online/transcribe", KEY, "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- offline ---

#[tokio::test]
async fn offline_job_lifecycle() {
    let state = MockConfig::new(KEY).result_base("https://r.example/").build();

    let resp = app(state.clone())
        .oneshot(request(
            "POST",
            "/offline/transcribe",
            KEY,
            r#"{"pipeline":"p","url":"https://a.example/a.wav","config":{"lang":"eu"},"tags":[]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"id": "job-1", "consumedquota": 1}));

    let resp = app(state.clone())
        .oneshot(request("GET", "/offline/status/job-1", KEY, ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"status": 2, "message": "done", "url": "https://r.example/job-1.json"})
    );

    let recorded = state.requests().await;
    assert_eq!(recorded.len(), 2);
    let sent: Value = serde_json::from_str(&recorded[0].body).unwrap();
    assert_eq!(sent["config"], json!({"lang": "eu"}));
}

#[tokio::test]
async fn offline_job_ids_increment() {
    let state = MockState::new(KEY);
    let body = r#"{"pipeline":"p","url":"https://a.example/a.wav","tags":[]}"#;

    for expected in ["job-1", "job-2"] {
        let resp = app(state.clone())
            .oneshot(request("POST", "/offline/transcribe", KEY, body))
            .await
            .unwrap();
        assert_eq!(body_json(resp).await["id"], expected);
    }
}

#[tokio::test]
async fn offline_transcription_without_url_returns_400() {
    let resp = app(MockState::new(KEY))
        .oneshot(request("POST", "/offline/transcribe", KEY, r#"{"pipeline":"p"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_job_reports_nested_error() {
    let state = MockConfig::new(KEY)
        .failed_job(
            "job-9",
            JobError {
                code: 7,
                message: "bad audio".to_string(),
                module: "asr".to_string(),
            },
        )
        .build();

    let resp = app(state)
        .oneshot(request("GET", "/offline/status/job-9", KEY, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({
            "status": 3,
            "message": "failed",
            "error": {"code": 7, "message": "bad audio", "module": "asr"},
        })
    );
}

#[tokio::test]
async fn unknown_job_returns_404() {
    let resp = app(MockState::new(KEY))
        .oneshot(request("GET", "/offline/status/missing", KEY, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
