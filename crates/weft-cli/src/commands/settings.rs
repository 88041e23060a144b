// crates/weft-cli/src/commands/settings.rs
//
// `weft settings get|update` — per-user federation privacy settings.

use clap::{Args, Subcommand};

use crate::output;
use crate::rpc_client::rpc_call;
use crate::CliContext;

/// Settings subcommands.
#[derive(Debug, Subcommand)]
pub enum SettingsCmd {
    /// Show the current settings row.
    Get,
    /// Replace the settings row.
    Update(UpdateArgs),
}

/// Arguments for `settings update`. The row is replaced wholesale;
/// anything not passed is off.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Opt into federation.
    #[arg(long)]
    pub opt_in: bool,

    /// Privacy level: discovery, social, economic.
    #[arg(long, default_value = "discovery")]
    pub privacy_level: String,

    /// Service reach: local_only, will_travel, remote_ok.
    #[arg(long, default_value = "local_only")]
    pub service_reach: String,

    /// Show location to partner timebanks.
    #[arg(long)]
    pub show_location: bool,

    /// Show skills to partner timebanks.
    #[arg(long)]
    pub show_skills: bool,

    /// Accept messages from partner timebanks.
    #[arg(long)]
    pub allow_messaging: bool,

    /// Accept transactions with partner timebank members.
    #[arg(long)]
    pub allow_transactions: bool,
}

/// Run the settings command.
pub async fn run(ctx: &CliContext, cmd: &SettingsCmd) -> Result<(), Box<dyn std::error::Error>> {
    let user = ctx.user.ok_or("--user is required for settings")?;

    match cmd {
        SettingsCmd::Get => {
            let result = rpc_call(
                &ctx.rpc,
                "settings/get",
                serde_json::json!({ "user_id": user }),
                ctx.context.clone(),
            )
            .await?;
            println!("{}", output::format_json(&result["settings"]));
        }
        SettingsCmd::Update(args) => {
            let params = serde_json::json!({
                "user_id": user,
                "opted_in": args.opt_in,
                "privacy_level": args.privacy_level,
                "service_reach": args.service_reach,
                "show_location": args.show_location,
                "show_skills": args.show_skills,
                "allow_messaging": args.allow_messaging,
                "allow_transactions": args.allow_transactions,
            });
            let result =
                rpc_call(&ctx.rpc, "settings/update", params, ctx.context.clone()).await?;
            if ctx.json {
                println!("{}", output::format_json(&result));
            } else {
                println!("Settings saved.");
                println!("{}", output::format_json(&result["settings"]));
            }
        }
    }
    Ok(())
}
