//! Vulnerability phase: nuclei, nikto and ZAP results via `POST /scan/vuln`.

use api_client::ApiClient;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use vapt_core::{NormalizedTarget, PhaseDescriptor, PhaseError, PhaseInvoker, PhaseKind, PhasePayload, PhaseResult, TransportError, VulnReport};

const VULN_PATH: &str = "/scan/vuln";

#[derive(Debug, Clone)]
pub struct VulnPhase {
    client: ApiClient,
}

impl VulnPhase {
    pub fn new(client: ApiClient) -> Self {
        VulnPhase { client }
    }

    /// Descriptor with the default vulnerability-scan budget.
    pub fn descriptor(client: ApiClient) -> PhaseDescriptor {
        PhaseDescriptor::new(PhaseKind::Vuln, Arc::new(VulnPhase::new(client)))
    }
}

#[async_trait]
impl PhaseInvoker for VulnPhase {
    async fn invoke(&self, target: &NormalizedTarget) -> PhaseResult {
        let body: Value = self.client.post_target(VULN_PATH, target.host(), None).await?;
        if body.get("status").and_then(Value::as_str) == Some("error") {
            let msg = body.get("message").and_then(Value::as_str).unwrap_or("unknown error");
            return Err(PhaseError::Tool(msg.to_string()));
        }
        let report: VulnReport = serde_json::from_value(body).map_err(|e| TransportError::Decode {
            endpoint: VULN_PATH.to_string(),
            reason: e.to_string(),
        })?;
        debug!(
            findings = report.findings_count,
            nuclei_error = ?report.nuclei.error(),
            "vulnerability report received"
        );
        Ok(PhasePayload::Vuln(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn phase_answering(body: Value) -> (MockServer, VulnPhase) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scan/vuln"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let phase = VulnPhase::new(ApiClient::new(&server.uri()).unwrap());
        (server, phase)
    }

    #[tokio::test]
    async fn report_splits_per_tool() {
        let (_server, phase) = phase_answering(json!({
            "status": "success",
            "message": "Step 3 Complete. Detected vulnerabilities and misconfigurations.",
            "findings_count": 2,
            "nuclei": {
                "tool": "nuclei",
                "findings_count": 2,
                "findings": [
                    { "template-id": "apache-detect", "info": { "name": "Apache Detection", "severity": "info" }, "host": "scanme.nmap.org" },
                    { "template-id": "openssh-detect", "info": { "name": "OpenSSH Detection", "severity": "low" }, "host": "scanme.nmap.org:22" }
                ]
            },
            "nikto": { "info": "Nikto scan disabled by policy." },
            "zap": { "error": "ZAP not available" }
        }))
        .await;
        let payload = phase.invoke(&NormalizedTarget::new("scanme.nmap.org")).await.unwrap();
        assert_eq!(payload.summary(), "Scan Completed. Found 2 Nuclei issues.");
        let PhasePayload::Vuln(report) = payload else { panic!("expected vuln payload") };
        let findings = &report.nuclei.ok().unwrap().findings;
        assert_eq!(findings[1].severity(), "low");
        assert_eq!(report.zap.unwrap().error(), Some("ZAP not available"));
        assert!(report.nikto.unwrap().ok().is_some());
    }

    #[tokio::test]
    async fn error_status_is_tool_error() {
        let (_server, phase) = phase_answering(json!({
            "status": "error",
            "message": "No vulnerability scanners (Nuclei/ZAP) available."
        }))
        .await;
        let err = phase.invoke(&NormalizedTarget::new("example.com")).await.unwrap_err();
        assert_eq!(err, PhaseError::Tool("No vulnerability scanners (Nuclei/ZAP) available.".into()));
    }

    #[tokio::test]
    async fn missing_nuclei_section_is_decode_failure() {
        let (_server, phase) = phase_answering(json!({ "status": "success", "findings_count": 0 })).await;
        let err = phase.invoke(&NormalizedTarget::new("example.com")).await.unwrap_err();
        assert!(matches!(err, PhaseError::Transport(TransportError::Decode { .. })));
    }
}
