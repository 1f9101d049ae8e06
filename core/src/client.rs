//! Blocking client facade for the Transkit API.
//!
//! # Design
//! Every operation is split in three steps: a `build_*` method that checks
//! preconditions and produces an `HttpRequest`, one round trip through the
//! `Transport`, and `parse_response` which maps the status and decodes the
//! body. The build and parse halves never touch the network, so they can be
//! exercised directly in tests.
//!
//! Configuration setters take `&mut self`; the operations take `&self` and
//! can be shared freely once the client is configured.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::endpoint::join_url;
use crate::error::{Result, TranskitError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{
    ConsumedQuota, OfflineTranscriptionRequest, OfflineTranscriptionResponse,
    OfflineTranscriptionStatusResponse, OnlineTranscriptionRequest, OnlineTranscriptionResponse,
};

/// Production API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.transkit.vicomtech.org/";

pub const PATH_ONLINE_TRANSCRIPTION: &str = "online/transcribe";
pub const PATH_OFFLINE_TRANSCRIPTION: &str = "offline/transcribe";
pub const PATH_OFFLINE_TRANSCRIPTION_STATUS: &str = "offline/status";
pub const PATH_GET_QUOTA: &str = "quota";

/// Client handle holding the API key, endpoint and optional extra config.
#[derive(Clone)]
pub struct Transkit<T = UreqTransport> {
    key: String,
    endpoint: String,
    extra_config: Option<Value>,
    transport: T,
}

impl<T: fmt::Debug> fmt::Debug for Transkit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Transkit")
            .field("key", &key)
            .field("endpoint", &self.endpoint)
            .field("extra_config", &self.extra_config)
            .field("transport", &self.transport)
            .finish()
    }
}

impl Transkit<UreqTransport> {
    /// Client for the production endpoint using the default blocking transport.
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_transport(key, UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut client = Self::with_transport(config.api_key.clone(), config.transport());
        client.set_endpoint(config.endpoint.clone());
        client
    }
}

impl<T: Transport> Transkit<T> {
    pub fn with_transport(key: impl Into<String>, transport: T) -> Self {
        Self {
            key: key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            extra_config: None,
            transport,
        }
    }

    /// Set the key and reset the endpoint to the production default.
    /// The key is not validated.
    pub fn init(&mut self, key: impl Into<String>) {
        self.key = key.into();
        self.endpoint = DEFAULT_ENDPOINT.to_string();
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// Override the base URL. It is only parsed on the next call.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    /// Store a value sent as `config` on subsequent offline requests.
    /// `None` or a JSON `null` clears it.
    pub fn set_config(&mut self, config: Option<Value>) {
        self.extra_config = config.filter(|v| !v.is_null());
    }

    /// Like `set_config`, for any serializable value. Values that serialize
    /// to `null`, such as `None`, clear it.
    pub fn set_config_from<S: Serialize>(&mut self, config: &S) -> Result<()> {
        let value = serde_json::to_value(config).map_err(TranskitError::Marshal)?;
        self.set_config(Some(value));
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config(&self) -> Option<&Value> {
        self.extra_config.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Synchronous transcription of base64 `audio` with `pipeline`.
    pub fn transcribe_online(
        &self,
        audio: &str,
        pipeline: &str,
        tags: &[&str],
    ) -> Result<OnlineTranscriptionResponse> {
        let request = self.build_transcribe_online(audio, pipeline, tags)?;
        parse_response(self.transport.execute(&request)?)
    }

    /// Submit the audio at `audio_url` for asynchronous transcription.
    pub fn transcribe_offline(
        &self,
        audio_url: &str,
        pipeline: &str,
        tags: &[&str],
    ) -> Result<OfflineTranscriptionResponse> {
        let request = self.build_transcribe_offline(audio_url, pipeline, tags)?;
        parse_response(self.transport.execute(&request)?)
    }

    pub fn transcribe_offline_status(&self, id: &str) -> Result<OfflineTranscriptionStatusResponse> {
        let request = self.build_transcribe_offline_status(id)?;
        parse_response(self.transport.execute(&request)?)
    }

    pub fn get_quota(&self) -> Result<ConsumedQuota> {
        let request = self.build_get_quota()?;
        parse_response(self.transport.execute(&request)?)
    }

    /// The online request never carries the stored extra config.
    pub fn build_transcribe_online(
        &self,
        audio: &str,
        pipeline: &str,
        tags: &[&str],
    ) -> Result<HttpRequest> {
        if audio.is_empty() || pipeline.is_empty() {
            return Err(TranskitError::InvalidParameters);
        }

        let body = OnlineTranscriptionRequest {
            audio: audio.to_string(),
            pipeline: pipeline.to_string(),
            tags: owned_tags(tags),
        };
        self.post(&[PATH_ONLINE_TRANSCRIPTION], &body)
    }

    pub fn build_transcribe_offline(
        &self,
        audio_url: &str,
        pipeline: &str,
        tags: &[&str],
    ) -> Result<HttpRequest> {
        if audio_url.is_empty() || pipeline.is_empty() {
            return Err(TranskitError::InvalidParameters);
        }

        let body = OfflineTranscriptionRequest {
            pipeline: pipeline.to_string(),
            url: audio_url.to_string(),
            config: self.extra_config.clone(),
            tags: owned_tags(tags),
        };
        self.post(&[PATH_OFFLINE_TRANSCRIPTION], &body)
    }

    /// An empty `id` is not rejected; it targets `offline/status` itself.
    pub fn build_transcribe_offline_status(&self, id: &str) -> Result<HttpRequest> {
        self.require_key()?;
        self.get(&[PATH_OFFLINE_TRANSCRIPTION_STATUS, id])
    }

    pub fn build_get_quota(&self) -> Result<HttpRequest> {
        self.require_key()?;
        self.get(&[PATH_GET_QUOTA])
    }

    fn require_key(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(TranskitError::NoAuthData);
        }
        Ok(())
    }

    fn get(&self, segments: &[&str]) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: join_url(&self.endpoint, segments)?,
            headers: self.headers(),
            body: None,
        })
    }

    fn post<B: Serialize>(&self, segments: &[&str], body: &B) -> Result<HttpRequest> {
        let url = join_url(&self.endpoint, segments)?;
        let body = serde_json::to_string(body).map_err(TranskitError::Marshal)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: self.headers(),
            body: Some(body),
        })
    }

    /// Sent on every request, GET included. An empty key still yields
    /// `Bearer ` and the server answers 401.
    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), format!("Bearer {}", self.key)),
        ]
    }
}

/// Map the status of `response` to an error, or decode its body as `R`.
pub fn parse_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R> {
    match response.status {
        200 => {
            debug!(bytes = response.body.len(), "decoding response body");
            serde_json::from_str(&response.body).map_err(TranskitError::Decode)
        }
        401 => {
            debug!("server rejected the API key");
            Err(TranskitError::InvalidApiKey)
        }
        status => {
            debug!(status, "unexpected status code");
            Err(TranskitError::InvalidStatusCode(status))
        }
    }
}

fn owned_tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}
