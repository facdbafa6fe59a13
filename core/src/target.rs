//! Raw and validated target identifiers.
//!
//! Phases only ever see a [`NormalizedTarget`]; the sole way to obtain one is
//! through a [`Validator`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// User input exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTarget(pub String);

impl RawTarget {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty input means "nothing to do" rather than a failed run. Whitespace
    /// still goes to the validator.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RawTarget {
    fn from(s: &str) -> Self {
        RawTarget(s.to_string())
    }
}

impl From<String> for RawTarget {
    fn from(s: String) -> Self {
        RawTarget(s)
    }
}

impl fmt::Display for RawTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Domain,
    Ip,
}

/// Hostname or IP returned by validation. Used by every phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTarget {
    host: String,
    kind: Option<TargetKind>,
    reachable: Option<bool>,
}

impl NormalizedTarget {
    pub fn new(host: impl Into<String>) -> Self {
        NormalizedTarget { host: host.into(), kind: None, reachable: None }
    }

    pub fn with_kind(mut self, kind: Option<TargetKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_reachable(mut self, reachable: Option<bool>) -> Self {
        self.reachable = reachable;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn kind(&self) -> Option<TargetKind> {
        self.kind
    }

    pub fn reachable(&self) -> Option<bool> {
        self.reachable
    }
}

impl fmt::Display for NormalizedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Turns a raw target into a normalized one, or explains why it cannot.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, raw: &RawTarget) -> Result<NormalizedTarget, ValidationError>;
}
