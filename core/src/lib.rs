//! Blocking client for the Transkit speech transcription API.
//!
//! # Overview
//! Submits audio for synchronous (online) or asynchronous (offline)
//! transcription, polls offline jobs and reads the caller's consumed quota.
//! All calls are HTTPS with JSON bodies and a bearer token.
//!
//! # Design
//! - `Transkit` holds the key, endpoint and optional extra config, and
//!   exposes one method per API operation.
//! - Each operation is built into an `HttpRequest`, executed by a
//!   `Transport` (by default `UreqTransport`), and parsed from an
//!   `HttpResponse`. Building and parsing never touch the network.
//! - One round trip per call. No retries, no caching.
//!
//! ```no_run
//! let client = transkit::Transkit::new("my-api-key");
//! let quota = client.get_quota()?;
//! println!("consumed: {}", quota.consumed_quota);
//! # Ok::<(), transkit::TranskitError>(())
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod types;

pub use client::{parse_response, Transkit, DEFAULT_ENDPOINT};
pub use config::ClientConfig;
pub use error::{Result, TranskitError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    ConsumedQuota, OfflineError, OfflineTranscriptionRequest, OfflineTranscriptionResponse,
    OfflineTranscriptionStatusResponse, OnlineTranscriptionRequest, OnlineTranscriptionResponse,
    OnlineWord,
};
