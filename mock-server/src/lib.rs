//! In-process fake of the Transkit API.
//!
//! Serves the four client endpoints, checks the bearer key, and records
//! every request it sees so tests can assert on headers, bodies and the
//! number of round trips.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const STATUS_DONE: i64 = 2;
pub const STATUS_FAILED: i64 = 3;

/// A request as seen by the mock, before authorization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobError {
    pub code: i64,
    pub message: String,
    pub module: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub status: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

#[derive(Deserialize)]
struct OnlineBody {
    #[serde(default)]
    audio: String,
    #[serde(default)]
    pipeline: String,
}

#[derive(Deserialize)]
struct OfflineBody {
    #[serde(default)]
    url: String,
    #[serde(default)]
    pipeline: String,
}

struct Inner {
    quota: i64,
    next_job: u64,
    jobs: HashMap<String, Job>,
    requests: Vec<RecordedRequest>,
}

/// Seed data for a `MockState`.
#[derive(Clone, Debug)]
pub struct MockConfig {
    api_key: String,
    transcript: String,
    result_base: String,
    quota: i64,
    jobs: HashMap<String, Job>,
}

impl MockConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            transcript: "hello".to_string(),
            result_base: "https://results.mock".to_string(),
            quota: 0,
            jobs: HashMap::new(),
        }
    }

    pub fn quota(mut self, quota: i64) -> Self {
        self.quota = quota;
        self
    }

    pub fn transcript(mut self, text: impl Into<String>) -> Self {
        self.transcript = text.into();
        self
    }

    /// Base URL under which completed jobs publish `<id>.json`.
    pub fn result_base(mut self, base: impl Into<String>) -> Self {
        self.result_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn failed_job(mut self, id: impl Into<String>, error: JobError) -> Self {
        let job = Job {
            status: STATUS_FAILED,
            message: "failed".to_string(),
            url: None,
            error: Some(error),
        };
        self.jobs.insert(id.into(), job);
        self
    }

    pub fn build(self) -> MockState {
        MockState {
            api_key: Arc::new(self.api_key),
            transcript: Arc::new(self.transcript),
            result_base: Arc::new(self.result_base),
            inner: Arc::new(RwLock::new(Inner {
                quota: self.quota,
                next_job: 1,
                jobs: self.jobs,
                requests: Vec::new(),
            })),
        }
    }
}

/// Shared mock state. Cloning shares the same underlying data.
#[derive(Clone)]
pub struct MockState {
    api_key: Arc<String>,
    transcript: Arc<String>,
    result_base: Arc<String>,
    inner: Arc<RwLock<Inner>>,
}

impl MockState {
    pub fn new(api_key: impl Into<String>) -> Self {
        MockConfig::new(api_key).build()
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.read().await.requests.clone()
    }

    /// Like `requests`, for callers outside a tokio runtime.
    pub fn blocking_requests(&self) -> Vec<RecordedRequest> {
        self.inner.blocking_read().requests.clone()
    }

    async fn record(&self, method: Method, path: String, headers: &HeaderMap, body: &str) {
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let request = RecordedRequest {
            method: method.to_string(),
            path,
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            body: body.to_string(),
        };
        self.inner.write().await.requests.push(request);
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let expected = format!("Bearer {}", self.api_key);
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if presented == Some(expected.as_str()) && !self.api_key.is_empty() {
            Ok(())
        } else {
            warn!("rejecting request with bad credentials");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route("/online/transcribe", post(transcribe_online))
        .route("/offline/transcribe", post(transcribe_offline))
        .route("/offline/status/{id}", get(offline_status))
        .route("/quota", get(quota))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

async fn transcribe_online(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    state
        .record(Method::POST, "/online/transcribe".to_string(), &headers, &body)
        .await;
    state.authorize(&headers)?;

    let input: OnlineBody = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    if input.audio.is_empty() || input.pipeline.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut inner = state.inner.write().await;
    inner.quota += 1;
    info!(pipeline = %input.pipeline, "online transcription");

    let words: Vec<Value> = state
        .transcript
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            json!({
                "word": word,
                "start": i as f64 * 0.5,
                "length": 0.4,
                "confidence": 0.95,
            })
        })
        .collect();

    Ok(Json(json!({
        "text": state.transcript.as_str(),
        "words": words,
        "consumedquota": inner.quota,
    })))
}

async fn transcribe_offline(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    state
        .record(Method::POST, "/offline/transcribe".to_string(), &headers, &body)
        .await;
    state.authorize(&headers)?;

    let input: OfflineBody = serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    if input.url.is_empty() || input.pipeline.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut inner = state.inner.write().await;
    let id = format!("job-{}", inner.next_job);
    inner.next_job += 1;
    inner.quota += 1;

    let job = Job {
        status: STATUS_DONE,
        message: "done".to_string(),
        url: Some(format!("{}/{id}.json", state.result_base)),
        error: None,
    };
    inner.jobs.insert(id.clone(), job);
    info!(%id, source = %input.url, "offline job created");

    Ok(Json(json!({ "id": id, "consumedquota": inner.quota })))
}

async fn offline_status(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Job>, StatusCode> {
    state
        .record(Method::GET, format!("/offline/status/{id}"), &headers, "")
        .await;
    state.authorize(&headers)?;

    let inner = state.inner.read().await;
    inner.jobs.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn quota(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state.record(Method::GET, "/quota".to_string(), &headers, "").await;
    state.authorize(&headers)?;

    let inner = state.inner.read().await;
    Ok(Json(json!({ "consumedquota": inner.quota })))
}
