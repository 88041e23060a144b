// crates/weft-daemon/src/config.rs
//
// Runtime configuration for the Weft federation daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use weft_core::{FeatureSet, TenantId};

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct WeftConfig {
    /// The tenant this node serves.
    #[serde(default = "default_tenant_id")]
    pub tenant_id: TenantId,

    /// Display name of the tenant.
    #[serde(default = "default_tenant_name")]
    pub tenant_name: String,

    /// The tenant's public domain.
    #[serde(default = "default_tenant_domain")]
    pub tenant_domain: String,

    /// Federated features this tenant supports at all.
    #[serde(default = "FeatureSet::all")]
    pub features: FeatureSet,

    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Independent timeout for each partner call during fan-out, in ms.
    #[serde(default = "default_per_tenant_timeout_ms")]
    pub per_tenant_timeout_ms: u64,

    /// Global deadline for one federated search, in ms.
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,

    /// Maximum age a cached trust score may be served at, in seconds.
    #[serde(default = "default_trust_staleness_secs")]
    pub trust_staleness_secs: u64,

    /// Interval between partner health probes, in seconds.
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,

    /// Partner tenants this node federates with.
    #[serde(default)]
    pub partners: Vec<PartnerConfig>,
}

/// One configured partner tenant.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerConfig {
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub domain: String,
    /// The partner's federation endpoint (e.g., "http://harbour.example.org:7410").
    pub url: String,
    /// Features the partner exposes to us.
    #[serde(default)]
    pub their_features: FeatureSet,
    /// Features we expose to the partner.
    #[serde(default)]
    pub our_features: FeatureSet,
}

fn default_tenant_id() -> TenantId {
    1
}

fn default_tenant_name() -> String {
    "Weft Timebank".to_string()
}

fn default_tenant_domain() -> String {
    "localhost".to_string()
}

fn default_data_dir() -> String {
    "~/.weft/data".to_string()
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    7410
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_per_tenant_timeout_ms() -> u64 {
    5000
}

fn default_request_deadline_ms() -> u64 {
    15000
}

fn default_trust_staleness_secs() -> u64 {
    300
}

fn default_probe_interval_secs() -> u64 {
    60
}

impl Default for WeftConfig {
    fn default() -> Self {
        Self {
            tenant_id: default_tenant_id(),
            tenant_name: default_tenant_name(),
            tenant_domain: default_tenant_domain(),
            features: FeatureSet::all(),
            data_dir: default_data_dir(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            per_tenant_timeout_ms: default_per_tenant_timeout_ms(),
            request_deadline_ms: default_request_deadline_ms(),
            trust_staleness_secs: default_trust_staleness_secs(),
            probe_interval_secs: default_probe_interval_secs(),
            partners: Vec::new(),
        }
    }
}

impl WeftConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: WeftConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
