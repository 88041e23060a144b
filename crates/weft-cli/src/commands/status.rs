// crates/weft-cli/src/commands/status.rs
//
// `weft status` — display node connection status and version info.

use crate::rpc_client::rpc_call;
use crate::CliContext;

/// Run the status command.
pub async fn run(ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    let info = rpc_call(&ctx.rpc, "node/info", serde_json::json!({}), None).await;
    let health = rpc_call(&ctx.rpc, "node/health", serde_json::json!({}), None).await;

    println!("Weft v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Node Status");
    println!("-----------");
    println!("  RPC endpoint: {}", ctx.rpc);

    match info {
        Ok(info) => {
            println!(
                "  Tenant:       {} ({})",
                info["tenant_id"],
                info["tenant_name"].as_str().unwrap_or("?")
            );
            println!("  Domain:       {}", info["domain"].as_str().unwrap_or("?"));
            println!("  Daemon:       v{}", info["version"].as_str().unwrap_or("?"));
            if let Some(uptime) = info["uptime_seconds"].as_u64() {
                println!("  Uptime:       {}s", uptime);
            }
        }
        Err(e) => println!("  Connection:   not connected ({})", e),
    }

    if let Ok(health) = health {
        println!(
            "  Health:       {} ({} partners configured)",
            health["status"].as_str().unwrap_or("?"),
            health["partners_configured"]
        );
    }

    Ok(())
}
