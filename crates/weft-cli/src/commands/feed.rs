// crates/weft-cli/src/commands/feed.rs
//
// `weft feed` — show the activity feed; `weft mark-read` — read-state.

use clap::Args;
use tabled::Tabled;

use weft_core::ActivityPayload;
use weft_rpc::handlers::activity::FeedResponse;

use crate::output;
use crate::rpc_client::rpc_call;
use crate::CliContext;

/// Activity feed command.
#[derive(Debug, Args)]
pub struct FeedCmd {
    /// Only one origin: messages, transactions, partnerships.
    #[arg(long)]
    pub origin: Option<String>,

    /// Only unread entries.
    #[arg(long)]
    pub unread: bool,

    /// Cap on entries shown.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// One feed row.
#[derive(Tabled)]
struct FeedRow {
    #[tabled(rename = "Id")]
    id: u64,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "Read")]
    read: String,
}

fn describe(payload: &ActivityPayload) -> String {
    match payload {
        ActivityPayload::Message {
            counterparty_name,
            direction,
            preview,
            ..
        } => {
            let arrow = match direction {
                weft_core::FlowDirection::Inbound => "from",
                weft_core::FlowDirection::Outbound => "to",
            };
            format!("Message {} {}: {}", arrow, counterparty_name, preview)
        }
        ActivityPayload::Transaction {
            counterparty_name,
            direction,
            hours,
            status,
            ..
        } => {
            let verb = match direction {
                weft_core::TransferDirection::Sent => "sent to",
                weft_core::TransferDirection::Received => "received from",
            };
            format!("{:.1}h {} {} ({:?})", hours, verb, counterparty_name, status)
        }
        ActivityPayload::NewPartner { partner_name, .. } => {
            format!("New partner timebank: {}", partner_name)
        }
    }
}

/// Run the feed command.
pub async fn run(ctx: &CliContext, cmd: &FeedCmd) -> Result<(), Box<dyn std::error::Error>> {
    let owner = ctx
        .user
        .ok_or("--user is required for the feed (whose feed?)")?;

    let params = serde_json::json!({
        "owner_id": owner,
        "origin": cmd.origin,
        "unread_only": cmd.unread,
        "limit": cmd.limit,
    });
    let result = rpc_call(&ctx.rpc, "activity/feed", params, ctx.context.clone()).await?;
    if ctx.json {
        println!("{}", output::format_json(&result));
        return Ok(());
    }

    let response: FeedResponse = serde_json::from_value(result)?;
    let rows: Vec<FeedRow> = response
        .entries
        .iter()
        .map(|view| FeedRow {
            id: view.entry.id,
            when: view.relative_time.clone(),
            activity: describe(&view.entry.payload),
            read: if view.entry.read { "" } else { "●" }.to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("No activity.");
    } else {
        println!("{}", output::format_table(&rows));
    }
    println!();
    println!(
        "Unread: {}  |  Messages: {}  |  Exchanges: {} ({:.1}h sent, {:.1}h received)  |  Partners: {}",
        response.stats.unread,
        response.stats.messages,
        response.stats.transactions,
        response.stats.hours_sent,
        response.stats.hours_received,
        response.stats.partner_events,
    );
    if response.partial {
        println!("Note: one or more activity sources were unavailable; this feed is partial.");
    }

    Ok(())
}

/// Run the mark-read command.
pub async fn run_mark_read(
    ctx: &CliContext,
    entry_id: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let owner = ctx.user.ok_or("--user is required to mark entries read")?;
    rpc_call(
        &ctx.rpc,
        "activity/mark_read",
        serde_json::json!({ "entry_id": entry_id, "owner_id": owner }),
        ctx.context.clone(),
    )
    .await?;
    println!("Entry {} marked read.", entry_id);
    Ok(())
}
