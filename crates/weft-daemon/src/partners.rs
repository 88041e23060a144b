// crates/weft-daemon/src/partners.rs
//
// PartnerDirectory: one HTTP tenant client per configured partner, plus
// liveness tracking fed by a background health probe loop. Liveness is
// advisory (logging and the health endpoint); the router discovers dead
// partners itself through its own timeouts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use weft_core::{TenantClient, TenantId};
use weft_federation::HttpTenantClient;

use crate::config::PartnerConfig;

/// Liveness state of one partner.
#[derive(Debug, Clone)]
struct PartnerState {
    url: String,
    alive: bool,
}

/// Manages the configured partner endpoints and a shared probe client.
pub struct PartnerDirectory {
    clients: HashMap<TenantId, Arc<dyn TenantClient>>,
    state: Arc<RwLock<HashMap<TenantId, PartnerState>>>,
    probe_client: reqwest::Client,
}

impl PartnerDirectory {
    /// Build one HTTP client per configured partner.
    pub fn from_config(partners: &[PartnerConfig], call_timeout: Duration) -> Self {
        let probe_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let mut clients: HashMap<TenantId, Arc<dyn TenantClient>> = HashMap::new();
        let mut state = HashMap::new();
        for partner in partners {
            clients.insert(
                partner.tenant_id,
                Arc::new(HttpTenantClient::new(
                    partner.tenant_id,
                    partner.url.clone(),
                    call_timeout,
                )) as Arc<dyn TenantClient>,
            );
            state.insert(
                partner.tenant_id,
                PartnerState {
                    url: partner.url.clone(),
                    alive: false,
                },
            );
        }

        Self {
            clients,
            state: Arc::new(RwLock::new(state)),
            probe_client,
        }
    }

    /// The tenant-client map the query router fans out over.
    pub fn clients(&self) -> HashMap<TenantId, Arc<dyn TenantClient>> {
        self.clients.clone()
    }

    pub fn partner_count(&self) -> usize {
        self.clients.len()
    }

    /// Tenants whose last probe succeeded.
    pub async fn live_partners(&self) -> Vec<TenantId> {
        let state = self.state.read().await;
        let mut live: Vec<TenantId> = state
            .iter()
            .filter(|(_, p)| p.alive)
            .map(|(id, _)| *id)
            .collect();
        live.sort_unstable();
        live
    }

    async fn mark(&self, tenant: TenantId, alive: bool) {
        let mut state = self.state.write().await;
        if let Some(partner) = state.get_mut(&tenant) {
            if partner.alive != alive {
                if alive {
                    tracing::info!("Partner tenant {} is reachable at {}", tenant, partner.url);
                } else {
                    tracing::warn!("Partner tenant {} is unreachable at {}", tenant, partner.url);
                }
            }
            partner.alive = alive;
        }
    }

    /// Probe every partner's health endpoint once.
    pub async fn probe_all(&self) {
        let targets: Vec<(TenantId, String)> = {
            let state = self.state.read().await;
            state.iter().map(|(id, p)| (*id, p.url.clone())).collect()
        };

        for (tenant, url) in targets {
            let body = serde_json::json!({
                "method": "node/health",
                "params": {}
            });
            let alive = match self.probe_client.post(&url).json(&body).send().await {
                Ok(resp) => resp.status().is_success(),
                Err(e) => {
                    tracing::debug!("Probe of partner {} failed: {}", tenant, e);
                    false
                }
            };
            self.mark(tenant, alive).await;
        }
    }

    /// Probe all partners every `interval_secs`, forever.
    pub async fn run_probe_loop(self: Arc<Self>, interval_secs: u64) {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            self.probe_all().await;
        }
    }
}
