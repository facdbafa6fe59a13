//! Cumulative results of a run, one slot per tool or data group.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::payload::{Finding, Inventory, NiktoReport, OpenPort, ToolReport, ZapReport};
use crate::phase::PhasePayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCategory {
    Nmap,
    Nuclei,
    Nikto,
    Zap,
    Inventory,
}

impl ResultCategory {
    pub const ALL: [ResultCategory; 5] = [
        ResultCategory::Nmap,
        ResultCategory::Nuclei,
        ResultCategory::Nikto,
        ResultCategory::Zap,
        ResultCategory::Inventory,
    ];
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResultCategory::Nmap => "nmap",
            ResultCategory::Nuclei => "nuclei",
            ResultCategory::Nikto => "nikto",
            ResultCategory::Zap => "zap",
            ResultCategory::Inventory => "inventory",
        };
        f.write_str(s)
    }
}

/// Port view derived from the recon inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSummary {
    pub open_ports: Vec<OpenPort>,
    pub raw_output: String,
}

/// Absent slots serialize as `null`. Slots are shared with earlier snapshots
/// through `Arc`, so merging never copies untouched data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResults {
    pub nmap: Option<Arc<PortSummary>>,
    pub nuclei: Option<Arc<ToolReport<Vec<Finding>>>>,
    pub nikto: Option<Arc<ToolReport<NiktoReport>>>,
    pub zap: Option<Arc<ToolReport<ZapReport>>>,
    pub inventory: Option<Arc<Inventory>>,
}

impl AssessmentResults {
    pub fn is_populated(&self, category: ResultCategory) -> bool {
        match category {
            ResultCategory::Nmap => self.nmap.is_some(),
            ResultCategory::Nuclei => self.nuclei.is_some(),
            ResultCategory::Nikto => self.nikto.is_some(),
            ResultCategory::Zap => self.zap.is_some(),
            ResultCategory::Inventory => self.inventory.is_some(),
        }
    }

    pub fn populated(&self) -> Vec<ResultCategory> {
        ResultCategory::ALL.into_iter().filter(|c| self.is_populated(*c)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.populated().is_empty()
    }

    /// Nuclei findings, empty when nuclei failed or has not run.
    pub fn findings(&self) -> &[Finding] {
        self.nuclei.as_deref().and_then(|r| r.ok()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Categories holding a tool error marker, with the message.
    pub fn tool_errors(&self) -> Vec<(ResultCategory, &str)> {
        let mut out = Vec::new();
        if let Some(e) = self.nuclei.as_deref().and_then(|r| r.error()) { out.push((ResultCategory::Nuclei, e)); }
        if let Some(e) = self.nikto.as_deref().and_then(|r| r.error()) { out.push((ResultCategory::Nikto, e)); }
        if let Some(e) = self.zap.as_deref().and_then(|r| r.error()) { out.push((ResultCategory::Zap, e)); }
        out
    }
}

/// Fold one phase's payload into the results. Only that phase's categories are
/// replaced; every other slot is carried over as-is.
pub fn merge(current: &AssessmentResults, payload: PhasePayload) -> AssessmentResults {
    let mut next = current.clone();
    match payload {
        PhasePayload::Recon(inventory) => {
            next.nmap = Some(Arc::new(PortSummary {
                open_ports: inventory.infrastructure.main_target_ports.clone(),
                raw_output: "See Inventory for details".to_string(),
            }));
            next.inventory = Some(Arc::new(inventory));
        }
        PhasePayload::Vuln(report) => {
            next.nuclei = Some(Arc::new(report.nuclei.map(|n| n.findings)));
            next.nikto = report.nikto.map(Arc::new);
            next.zap = report.zap.map(Arc::new);
        }
    }
    next
}
