//! Recon phase: subdomains, open ports and technology fingerprint via `POST /scan/inventory`.

use api_client::ApiClient;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use vapt_core::{Inventory, NormalizedTarget, PhaseDescriptor, PhaseError, PhaseInvoker, PhaseKind, PhasePayload, PhaseResult, TransportError};

const INVENTORY_PATH: &str = "/scan/inventory";

#[derive(Debug, Deserialize)]
struct InventoryResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Inventory>,
}

#[derive(Debug, Clone)]
pub struct ReconPhase {
    client: ApiClient,
}

impl ReconPhase {
    pub fn new(client: ApiClient) -> Self {
        ReconPhase { client }
    }

    /// Descriptor with the default recon budget.
    pub fn descriptor(client: ApiClient) -> PhaseDescriptor {
        PhaseDescriptor::new(PhaseKind::Recon, Arc::new(ReconPhase::new(client)))
    }
}

#[async_trait]
impl PhaseInvoker for ReconPhase {
    async fn invoke(&self, target: &NormalizedTarget) -> PhaseResult {
        let resp: InventoryResponse = self.client.post_target(INVENTORY_PATH, target.host(), None).await?;
        if resp.status.as_deref() == Some("error") {
            return Err(PhaseError::Tool(resp.message.unwrap_or_else(|| "unknown error".to_string())));
        }
        let inventory = resp.data.ok_or_else(|| TransportError::Decode {
            endpoint: INVENTORY_PATH.to_string(),
            reason: "missing data".to_string(),
        })?;
        debug!(
            subdomains = inventory.discovery.subdomains_count,
            ports = inventory.infrastructure.main_target_ports.len(),
            "inventory received"
        );
        Ok(PhasePayload::Recon(inventory))
    }
}
