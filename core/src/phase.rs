//! Phases are plain data: an ordered list of descriptors the runner walks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::PhaseError;
use crate::payload::{Inventory, VulnReport};
use crate::target::NormalizedTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Recon,
    Vuln,
}

impl PhaseKind {
    /// Vulnerability tooling (ZAP in particular) is much slower than recon.
    pub fn default_timeout(self) -> Duration {
        match self {
            PhaseKind::Recon => Duration::from_secs(300),
            PhaseKind::Vuln => Duration::from_secs(900),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PhaseKind::Recon => "Complete Recon (Nmap, Subfinder, Amass, Tech)",
            PhaseKind::Vuln => "Automated Vulnerability Scan (Nuclei + Nikto + ZAP)",
        }
    }

    /// Prefix used in log lines when the phase fails.
    pub fn failure_label(self) -> &'static str {
        match self {
            PhaseKind::Recon => "Recon Failed",
            PhaseKind::Vuln => "Scan Failed",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Recon => f.write_str("recon"),
            PhaseKind::Vuln => f.write_str("vuln"),
        }
    }
}

/// What a phase hands back on success, tagged by phase identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "payload", rename_all = "lowercase")]
pub enum PhasePayload {
    Recon(Inventory),
    Vuln(VulnReport),
}

impl PhasePayload {
    pub fn kind(&self) -> PhaseKind {
        match self {
            PhasePayload::Recon(_) => PhaseKind::Recon,
            PhasePayload::Vuln(_) => PhaseKind::Vuln,
        }
    }

    /// One-line completion message for the activity log.
    pub fn summary(&self) -> String {
        match self {
            PhasePayload::Recon(inv) => format!("Recon Completed. Found {} subdomains.", inv.discovery.subdomains_count),
            PhasePayload::Vuln(v) => format!("Scan Completed. Found {} Nuclei issues.", v.findings_count),
        }
    }
}

pub type PhaseResult = Result<PhasePayload, PhaseError>;

/// Remote call behind one phase.
#[async_trait]
pub trait PhaseInvoker: Send + Sync {
    async fn invoke(&self, target: &NormalizedTarget) -> PhaseResult;
}

#[derive(Clone)]
pub struct PhaseDescriptor {
    pub kind: PhaseKind,
    pub timeout: Duration,
    pub invoker: Arc<dyn PhaseInvoker>,
}

impl PhaseDescriptor {
    /// Descriptor with the phase's default timeout.
    pub fn new(kind: PhaseKind, invoker: Arc<dyn PhaseInvoker>) -> Self {
        PhaseDescriptor { kind, timeout: kind.default_timeout(), invoker }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for PhaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseDescriptor").field("kind", &self.kind).field("timeout", &self.timeout).finish_non_exhaustive()
    }
}
