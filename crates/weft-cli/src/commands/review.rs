// crates/weft-cli/src/commands/review.rs
//
// `weft review submit|pending|stats` — review workflow.

use clap::{Args, Subcommand};
use tabled::Tabled;

use weft_rpc::handlers::review::PendingReviewsResponse;

use crate::output;
use crate::rpc_client::rpc_call;
use crate::CliContext;

/// Review subcommands.
#[derive(Debug, Subcommand)]
pub enum ReviewCmd {
    /// Submit a review for a completed exchange.
    Submit(SubmitArgs),
    /// List completed exchanges awaiting your review.
    Pending,
    /// Show a member's review statistics.
    Stats {
        /// The member to show statistics for.
        member_id: u64,
    },
}

/// Arguments for `review submit`.
#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// The completed transaction being reviewed.
    pub transaction_id: u64,

    /// Rating from 1 to 5.
    #[arg(long)]
    pub rating: u8,

    /// Optional comment (up to 2000 characters).
    #[arg(long)]
    pub comment: Option<String>,
}

/// One pending exchange row.
#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "Transaction")]
    id: u64,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Sender")]
    sender: u64,
    #[tabled(rename = "Receiver")]
    receiver: u64,
}

/// Run the review command.
pub async fn run(ctx: &CliContext, cmd: &ReviewCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ReviewCmd::Submit(args) => {
            let reviewer = ctx.user.ok_or("--user is required to submit a review")?;
            let params = serde_json::json!({
                "transaction_id": args.transaction_id,
                "reviewer_id": reviewer,
                "rating": args.rating,
                "comment": args.comment,
            });
            let result = rpc_call(&ctx.rpc, "review/submit", params, ctx.context.clone()).await?;
            if ctx.json {
                println!("{}", output::format_json(&result));
            } else {
                println!(
                    "Review {} submitted ({} stars).",
                    result["review"]["id"], args.rating
                );
            }
        }
        ReviewCmd::Pending => {
            let user = ctx.user.ok_or("--user is required to list pending reviews")?;
            let result = rpc_call(
                &ctx.rpc,
                "review/pending",
                serde_json::json!({ "user_id": user }),
                ctx.context.clone(),
            )
            .await?;
            if ctx.json {
                println!("{}", output::format_json(&result));
                return Ok(());
            }
            let response: PendingReviewsResponse = serde_json::from_value(result)?;
            if response.transactions.is_empty() {
                println!("Nothing awaiting review.");
                return Ok(());
            }
            let rows: Vec<PendingRow> = response
                .transactions
                .iter()
                .map(|t| PendingRow {
                    id: t.id,
                    hours: format!("{:.1}", t.hours),
                    sender: t.sender_user_id,
                    receiver: t.receiver_user_id,
                })
                .collect();
            println!("{}", output::format_table(&rows));
        }
        ReviewCmd::Stats { member_id } => {
            let result = rpc_call(
                &ctx.rpc,
                "review/stats",
                serde_json::json!({ "member_id": member_id }),
                ctx.context.clone(),
            )
            .await?;
            if ctx.json {
                println!("{}", output::format_json(&result));
            } else {
                println!(
                    "Member {}: {} reviews, {:.1} average",
                    member_id,
                    result["total"],
                    result["average"].as_f64().unwrap_or(0.0)
                );
            }
        }
    }
    Ok(())
}
