//! HTTP transport to the assessment backend.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;
use vapt_core::TransportError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub connect_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions { connect_timeout_ms: 5_000, user_agent: format!("vapt/{}", env!("CARGO_PKG_VERSION")) }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid api url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: Client,
}

#[derive(Deserialize)]
struct Health {
    status: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, BuildError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    pub fn with_options(base_url: &str, opts: ClientOptions) -> Result<Self, BuildError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| BuildError::InvalidUrl { url: base_url.to_string(), reason: e.to_string() })?;
        if base.cannot_be_a_base() {
            return Err(BuildError::InvalidUrl { url: base_url.to_string(), reason: "not a base url".into() });
        }
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(opts.connect_timeout_ms))
            .user_agent(opts.user_agent)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;
        Ok(ApiClient { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base.join(path.trim_start_matches('/')).map_err(|e| TransportError::Connect {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// `POST {path}` with `{"target": target}`. `budget` caps the whole request;
    /// `None` leaves timing to the caller.
    pub async fn post_target<T: DeserializeOwned>(
        &self,
        path: &str,
        target: &str,
        budget: Option<Duration>,
    ) -> Result<T, TransportError> {
        let url = self.endpoint(path)?;
        debug!(%url, host = target, "posting target");
        let mut req = self.http.post(url).json(&serde_json::json!({ "target": target }));
        if let Some(d) = budget {
            req = req.timeout(d);
        }
        let resp = req.send().await.map_err(|e| classify(path, e, budget))?;
        read_json(path, resp, budget).await
    }

    /// `GET /`; returns the backend's status line.
    pub async fn ping(&self) -> Result<String, TransportError> {
        let url = self.endpoint("/")?;
        let resp = self.http.get(url).send().await.map_err(|e| classify("/", e, None))?;
        let health: Health = read_json("/", resp, None).await?;
        Ok(health.status)
    }

    /// Link for a report artifact served by `GET /report/{name}`.
    pub fn report_url(&self, name: &str) -> Option<Url> {
        let mut url = self.base.join("report/").ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().push(name);
        Some(url)
    }
}

async fn read_json<T: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
    budget: Option<Duration>,
) -> Result<T, TransportError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(TransportError::Status { endpoint: path.to_string(), status: status.as_u16() });
    }
    let bytes = resp.bytes().await.map_err(|e| classify(path, e, budget))?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode { endpoint: path.to_string(), reason: e.to_string() })
}

/// Only a request that ran past a caller-set budget is a `Timeout`; failing to
/// connect, including running out of `connect_timeout_ms`, is `Connect`.
fn classify(path: &str, e: reqwest::Error, budget: Option<Duration>) -> TransportError {
    let endpoint = path.to_string();
    if e.is_connect() {
        TransportError::Connect { endpoint, reason: e.to_string() }
    } else if let (true, Some(after)) = (e.is_timeout(), budget) {
        TransportError::Timeout { endpoint, after }
    } else if let Some(status) = e.status() {
        TransportError::Status { endpoint, status: status.as_u16() }
    } else if e.is_decode() {
        TransportError::Decode { endpoint, reason: e.to_string() }
    } else {
        TransportError::Connect { endpoint, reason: e.to_string() }
    }
}
