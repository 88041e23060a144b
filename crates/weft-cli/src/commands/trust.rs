// crates/weft-cli/src/commands/trust.rs
//
// `weft trust <member>` — show a member's trust score.

use crate::output;
use crate::rpc_client::rpc_call;
use crate::CliContext;

/// Run the trust command.
pub async fn run(ctx: &CliContext, member_id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let result = rpc_call(
        &ctx.rpc,
        "trust/score",
        serde_json::json!({ "member_id": member_id }),
        ctx.context.clone(),
    )
    .await?;

    if ctx.json {
        println!("{}", output::format_json(&result));
        return Ok(());
    }

    println!(
        "Member {} — trust score {} ({})",
        member_id,
        result["score"],
        result["level"].as_str().unwrap_or("unknown")
    );
    println!();
    println!("Components");
    println!("----------");
    let components = &result["components"];
    println!(
        "  Rating:        {:.1}",
        components["rating_points"].as_f64().unwrap_or(0.0)
    );
    println!(
        "  Review volume: {:.1}",
        components["volume_points"].as_f64().unwrap_or(0.0)
    );
    println!(
        "  Transactions:  {:.1}",
        components["transaction_points"].as_f64().unwrap_or(0.0)
    );
    println!(
        "  Cross-tenant:  {:.1}",
        components["cross_tenant_points"].as_f64().unwrap_or(0.0)
    );
    let details = &result["details"];
    println!();
    println!(
        "Based on {} reviews (avg {:.1}), {} completed exchanges{}",
        details["review_count"],
        details["average_rating"].as_f64().unwrap_or(0.0),
        details["completed_transactions"],
        if details["cross_tenant_activity"].as_bool().unwrap_or(false) {
            ", with cross-tenant activity"
        } else {
            ""
        }
    );

    Ok(())
}
