//! Target validation: remotely through the backend, or offline by format.

use api_client::ApiClient;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;
use vapt_core::{NormalizedTarget, RawTarget, TargetKind, TransportError, ValidationError, Validator, VALIDATION_TIMEOUT};

const VALIDATE_PATH: &str = "/validate";

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
    #[serde(default)]
    cleaned_target: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<TargetKind>,
    #[serde(default)]
    reachable: Option<bool>,
}

/// Asks `POST /validate` for a verdict and the cleaned target.
#[derive(Debug, Clone)]
pub struct HttpValidator {
    client: ApiClient,
    budget: Duration,
}

impl HttpValidator {
    pub fn new(client: ApiClient) -> Self {
        HttpValidator { client, budget: VALIDATION_TIMEOUT }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

#[async_trait]
impl Validator for HttpValidator {
    async fn validate(&self, raw: &RawTarget) -> Result<NormalizedTarget, ValidationError> {
        let resp: ValidateResponse = self.client.post_target(VALIDATE_PATH, raw.as_str(), Some(self.budget)).await?;
        if !resp.valid {
            return Err(ValidationError::Rejected(resp.message.unwrap_or_else(|| "Invalid target".to_string())));
        }
        let host = resp.cleaned_target.filter(|s| !s.trim().is_empty()).ok_or_else(|| TransportError::Decode {
            endpoint: VALIDATE_PATH.to_string(),
            reason: "valid verdict without cleaned_target".to_string(),
        })?;
        debug!(raw = %raw, cleaned = %host, message = ?resp.message, "validator accepted target");
        Ok(NormalizedTarget::new(host).with_kind(resp.kind).with_reachable(resp.reachable))
    }
}

/// Offline format check for domains and dotted IPv4, with URL scheme and port stripped.
#[derive(Debug, Clone)]
pub struct LocalValidator {
    domain: Regex,
    ipv4: Regex,
}

impl LocalValidator {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(LocalValidator {
            domain: Regex::new(r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,6}$")?,
            ipv4: Regex::new(r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$")?,
        })
    }

    pub fn check(&self, raw: &str) -> Option<NormalizedTarget> {
        let mut t = raw.trim().to_string();
        if t.starts_with("http://") || t.starts_with("https://") {
            t = Url::parse(&t).ok()?.host_str()?.to_string();
        }
        if self.ipv4.is_match(&t) {
            return Some(NormalizedTarget::new(t).with_kind(Some(TargetKind::Ip)));
        }
        if self.domain.is_match(&t) {
            return Some(NormalizedTarget::new(t).with_kind(Some(TargetKind::Domain)));
        }
        None
    }
}

#[async_trait]
impl Validator for LocalValidator {
    async fn validate(&self, raw: &RawTarget) -> Result<NormalizedTarget, ValidationError> {
        self.check(raw.as_str())
            .ok_or_else(|| ValidationError::Rejected("Invalid Domain or IP format".to_string()))
    }
}
