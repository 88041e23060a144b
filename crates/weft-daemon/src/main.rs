// crates/weft-daemon/src/main.rs
//
// Binary entrypoint for the Weft federation daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration, seeds
// the partnership registry from config, opens the store, spawns the
// partner health probe loop, and serves the RPC surface.

mod config;
mod partners;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::Parser;

use config::WeftConfig;
use partners::PartnerDirectory;

use weft_activity::ActivityAggregator;
use weft_core::{
    ActivityStore, Partnership, PartnershipStatus, PartnershipStore, ReviewStore, SettingsStore,
    Tenant, TransactionStore, TrustScoreStore,
};
use weft_federation::{
    FederatedQueryRouter, RouterConfig, SearchSessions, StaticTenantClient,
    TenantPartnershipRegistry,
};
use weft_reputation::{ReviewSubsystem, TrustConfig, TrustScoreEngine};
use weft_rpc::{RpcConfig, RpcState, WeftRpcServer};
use weft_store::{
    MemoryActivityStore, MemoryPartnershipStore, MemoryReviewStore, MemorySettingsStore,
    MemoryTransactionStore, MemoryTrustScoreStore, RocksStore,
};

/// Weft federation daemon — serves one tenant's federation node.
#[derive(Parser, Debug)]
#[command(name = "weft-daemon", version = "0.1.0", about = "Weft federation node daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.weft/config.toml")]
    config: String,
}

/// The persistence handles the engine runs on.
struct EngineStores {
    partnerships: Arc<dyn PartnershipStore>,
    settings: Arc<dyn SettingsStore>,
    activity: Arc<dyn ActivityStore>,
    reviews: Arc<dyn ReviewStore>,
    transactions: Arc<dyn TransactionStore>,
    trust_cache: Arc<dyn TrustScoreStore>,
}

/// Open the RocksDB store, falling back to in-memory stores (with a
/// warning) when the database cannot be opened.
fn open_stores(data_dir: &str) -> EngineStores {
    let path = format!("{}/rocksdb", expand_tilde(data_dir));
    match RocksStore::open(&path) {
        Ok(db) => {
            tracing::info!("Store opened at {}", path);
            let db = Arc::new(db);
            EngineStores {
                partnerships: db.clone(),
                settings: db.clone(),
                activity: db.clone(),
                reviews: db.clone(),
                transactions: db.clone(),
                trust_cache: db,
            }
        }
        Err(e) => {
            tracing::warn!(
                "Could not open store at {}: {}. Running on in-memory stores; nothing will persist.",
                path,
                e
            );
            EngineStores {
                partnerships: Arc::new(MemoryPartnershipStore::new()),
                settings: Arc::new(MemorySettingsStore::new()),
                activity: Arc::new(MemoryActivityStore::new()),
                reviews: Arc::new(MemoryReviewStore::new()),
                transactions: Arc::new(MemoryTransactionStore::new()),
                trust_cache: Arc::new(MemoryTrustScoreStore::new()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration from the TOML file, falling back to defaults if
    // the file is not found.
    let weft_config = match WeftConfig::load(&expand_tilde(&args.config)) {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", args.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                args.config,
                e
            );
            WeftConfig::default()
        }
    };

    tracing::info!("Weft Federation Daemon v0.1.0");
    tracing::info!(
        "Tenant: {} ({}) at {}",
        weft_config.tenant_id,
        weft_config.tenant_name,
        weft_config.tenant_domain
    );
    tracing::info!(
        "RPC endpoint: {}:{}",
        weft_config.rpc_host,
        weft_config.rpc_port
    );
    tracing::info!("Partners configured: {}", weft_config.partners.len());

    let stores = open_stores(&weft_config.data_dir);

    // ---------------------------------------------------------------
    // Seed the registry from config: the local tenant, every partner,
    // and one active partnership per partner entry.
    // ---------------------------------------------------------------
    let local_tenant = Tenant {
        id: weft_config.tenant_id,
        name: weft_config.tenant_name.clone(),
        domain: weft_config.tenant_domain.clone(),
        features: weft_config.features,
    };

    let registry = Arc::new(TenantPartnershipRegistry::new());
    registry.register_tenant(local_tenant.clone())?;
    for partner in &weft_config.partners {
        registry.register_tenant(Tenant {
            id: partner.tenant_id,
            name: partner.name.clone(),
            domain: partner.domain.clone(),
            // Until a partner/info exchange refreshes them, the features
            // the partner offers us stand in for its capability flags.
            features: partner.their_features,
        })?;

        let partnership = match stores
            .partnerships
            .get_partnership(weft_config.tenant_id, partner.tenant_id)
            .await?
        {
            Some(stored) => stored,
            None => {
                let fresh = Partnership {
                    a_tenant: weft_config.tenant_id,
                    b_tenant: partner.tenant_id,
                    status: PartnershipStatus::Active,
                    since: Utc::now(),
                    a_features: partner.our_features,
                    b_features: partner.their_features,
                };
                stores.partnerships.save_partnership(&fresh).await?;
                fresh
            }
        };
        registry.upsert_partnership(partnership)?;
    }

    // ---------------------------------------------------------------
    // Assemble the engine.
    // ---------------------------------------------------------------
    let per_tenant_timeout = Duration::from_millis(weft_config.per_tenant_timeout_ms);
    let directory = Arc::new(PartnerDirectory::from_config(
        &weft_config.partners,
        per_tenant_timeout,
    ));

    let router = Arc::new(FederatedQueryRouter::new(
        Arc::clone(&registry),
        directory.clients(),
        RouterConfig {
            per_tenant_timeout,
            request_deadline: Duration::from_millis(weft_config.request_deadline_ms),
            ..RouterConfig::default()
        },
    ));

    let trust = Arc::new(TrustScoreEngine::new(
        stores.reviews.clone(),
        stores.transactions.clone(),
        stores.trust_cache.clone(),
        TrustConfig {
            staleness: Duration::from_secs(weft_config.trust_staleness_secs),
            ..TrustConfig::default()
        },
    ));
    let reviews = Arc::new(ReviewSubsystem::new(
        stores.reviews.clone(),
        stores.transactions.clone(),
        Arc::clone(&trust),
    ));
    let aggregator = Arc::new(ActivityAggregator::new(stores.activity.clone()));

    // The per-tenant member/listing/event/group stores are external
    // collaborators; the host application swaps in its own directory.
    // Until then partners see an empty (but valid) local directory.
    let local_directory = Arc::new(StaticTenantClient::new(weft_config.tenant_id));
    tracing::info!("Local directory is empty until the host application provides one");

    let state = Arc::new(RpcState {
        local_tenant,
        registry,
        router,
        sessions: Arc::new(SearchSessions::new()),
        aggregator,
        reviews,
        trust,
        settings: stores.settings.clone(),
        local_directory,
        partners_configured: directory.partner_count(),
        start_time: Some(Instant::now()),
    });

    // Spawn the partner health probe loop.
    if directory.partner_count() > 0 {
        let probe_directory = Arc::clone(&directory);
        let interval = weft_config.probe_interval_secs;
        tokio::spawn(async move {
            probe_directory.run_probe_loop(interval).await;
        });
    }

    let rpc_config = RpcConfig {
        host: weft_config.rpc_host.clone(),
        port: weft_config.rpc_port,
    };
    let server = WeftRpcServer::new(rpc_config, state);
    server.start().await?;

    tracing::info!("Weft daemon shut down");
    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}
