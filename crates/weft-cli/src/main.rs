// crates/weft-cli/src/main.rs
//
// CLI entrypoint for the Weft federation developer tools.
//
// Provides subcommands for federated search, the activity feed, reviews,
// trust scores, federation settings, and partner status, all speaking the
// daemon's JSON-RPC surface.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::feed::FeedCmd;
use commands::review::ReviewCmd;
use commands::search::SearchCmd;
use commands::settings::SettingsCmd;

use rpc_client::CallerContext;

/// Weft CLI — federation tools for timebank operators.
#[derive(Parser, Debug)]
#[command(
    name = "weft",
    version = "0.1.0",
    about = "Weft CLI — cross-tenant timebank federation tools"
)]
struct Cli {
    /// RPC endpoint of the weft-daemon.
    #[arg(long, global = true, default_value = "http://localhost:7410")]
    rpc: String,

    /// Tenant id to act as (defaults to the daemon's local tenant).
    #[arg(long, global = true)]
    tenant: Option<u64>,

    /// User id to act as.
    #[arg(long, global = true)]
    user: Option<u64>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Federated search: members, listings, events, groups, skills.
    #[command(subcommand)]
    Search(SearchCmd),

    /// Show the activity feed.
    Feed(FeedCmd),

    /// Mark one activity entry read.
    MarkRead {
        /// The entry id.
        entry_id: u64,
    },

    /// Reviews: submit, pending, stats.
    #[command(subcommand)]
    Review(ReviewCmd),

    /// Show a member's trust score.
    Trust {
        /// The member to score.
        member_id: u64,
    },

    /// Federation privacy settings: get, update.
    #[command(subcommand)]
    Settings(SettingsCmd),

    /// List this tenant's partnerships.
    Partners,

    /// Display node connection status and version info.
    Status,
}

/// Shared per-invocation state for commands.
pub struct CliContext {
    pub rpc: String,
    pub context: Option<CallerContext>,
    pub json: bool,
    pub user: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let context = if cli.tenant.is_some() || cli.user.is_some() {
        Some(CallerContext {
            tenant_id: cli.tenant,
            user_id: cli.user,
        })
    } else {
        None
    };
    let ctx = CliContext {
        rpc: cli.rpc.clone(),
        context,
        json: cli.json,
        user: cli.user,
    };

    match &cli.command {
        Commands::Search(cmd) => commands::search::run(&ctx, cmd).await?,
        Commands::Feed(cmd) => commands::feed::run(&ctx, cmd).await?,
        Commands::MarkRead { entry_id } => commands::feed::run_mark_read(&ctx, *entry_id).await?,
        Commands::Review(cmd) => commands::review::run(&ctx, cmd).await?,
        Commands::Trust { member_id } => commands::trust::run(&ctx, *member_id).await?,
        Commands::Settings(cmd) => commands::settings::run(&ctx, cmd).await?,
        Commands::Partners => commands::partners::run(&ctx).await?,
        Commands::Status => commands::status::run(&ctx).await?,
    }

    Ok(())
}
