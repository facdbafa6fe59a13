//! Response bodies of the two scan endpoints.
//!
//! Unknown fields are kept in `extra` maps so detail views can show whatever
//! the backend tools produced.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Output of one tool inside a phase response: either its data or `{ "error": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolReport<T> {
    Failed { error: String },
    Ok(T),
}

impl<T> ToolReport<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            ToolReport::Ok(v) => Some(v),
            ToolReport::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ToolReport::Failed { error } => Some(error),
            ToolReport::Ok(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ToolReport<U> {
        match self {
            ToolReport::Ok(v) => ToolReport::Ok(f(v)),
            ToolReport::Failed { error } => ToolReport::Failed { error },
        }
    }
}

// ---- recon -----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub scan_time: Option<String>,
    #[serde(default)]
    pub discovery: Discovery,
    #[serde(default)]
    pub infrastructure: Infrastructure,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    #[serde(default)]
    pub subdomains: Vec<String>,
    #[serde(default)]
    pub subdomains_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Infrastructure {
    #[serde(default)]
    pub main_target_ports: Vec<OpenPort>,
    #[serde(default)]
    pub technologies: Technologies,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPort {
    /// As nmap prints it, e.g. `80/tcp`. Bare numbers are accepted too.
    #[serde(deserialize_with = "port_label")]
    pub port: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technologies {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub webserver: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn port_label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("invalid port: {}", other))),
    }
}

// ---- vuln ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnReport {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub findings_count: usize,
    pub nuclei: ToolReport<NucleiReport>,
    #[serde(default)]
    pub nikto: Option<ToolReport<NiktoReport>>,
    #[serde(default)]
    pub zap: Option<ToolReport<ZapReport>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NucleiReport {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub findings_count: usize,
    #[serde(default)]
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default, rename = "template-id")]
    pub template_id: Option<String>,
    #[serde(default)]
    pub info: FindingInfo,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default, rename = "matched-at")]
    pub matched_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindingInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Finding {
    pub fn severity(&self) -> &str {
        self.info.severity.as_deref().unwrap_or("unknown")
    }

    pub fn name(&self) -> &str {
        self.info.name.as_deref().unwrap_or("Unknown Issue")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NiktoReport {
    /// Set when the backend skipped nikto on purpose.
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub findings: Vec<Value>,
    #[serde(default)]
    pub raw_output: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZapReport {
    #[serde(default)]
    pub report_filename: Option<String>,
    #[serde(default)]
    pub report_file: Option<String>,
    #[serde(default)]
    pub raw_output: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ZapReport {
    /// Name to use with `GET /report/{name}`.
    pub fn report_name(&self) -> Option<&str> {
        if let Some(name) = self.report_filename.as_deref().filter(|s| !s.is_empty()) {
            return Some(name);
        }
        self.report_file
            .as_deref()
            .and_then(|p| p.rsplit(['\\', '/']).next())
            .filter(|s| !s.is_empty())
    }
}
