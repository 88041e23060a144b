// crates/weft-cli/src/commands/partners.rs
//
// `weft partners` — list this tenant's partnerships and per-direction flags.

use tabled::Tabled;

use weft_core::FeatureSet;
use weft_rpc::handlers::partner::ListPartnersResponse;

use crate::output;
use crate::rpc_client::rpc_call;
use crate::CliContext;

/// One partnership row.
#[derive(Tabled)]
struct PartnerRow {
    #[tabled(rename = "Tenant")]
    tenant: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "They offer")]
    offers: String,
    #[tabled(rename = "We offer")]
    accepts: String,
}

fn feature_list(set: &FeatureSet) -> String {
    let mut enabled = Vec::new();
    if set.members {
        enabled.push("members");
    }
    if set.listings {
        enabled.push("listings");
    }
    if set.events {
        enabled.push("events");
    }
    if set.groups {
        enabled.push("groups");
    }
    if set.messaging {
        enabled.push("messaging");
    }
    if set.transactions {
        enabled.push("transactions");
    }
    if enabled.is_empty() {
        "-".to_string()
    } else {
        enabled.join(", ")
    }
}

/// Run the partners command.
pub async fn run(ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    let result = rpc_call(
        &ctx.rpc,
        "partners/list",
        serde_json::json!({}),
        ctx.context.clone(),
    )
    .await?;

    if ctx.json {
        println!("{}", output::format_json(&result));
        return Ok(());
    }

    let response: ListPartnersResponse = serde_json::from_value(result)?;
    if response.partners.is_empty() {
        println!("No active partnerships.");
        return Ok(());
    }

    let rows: Vec<PartnerRow> = response
        .partners
        .iter()
        .map(|p| PartnerRow {
            tenant: p.tenant_id,
            name: p.name.clone(),
            status: format!("{:?}", p.status).to_lowercase(),
            offers: feature_list(&p.offers),
            accepts: feature_list(&p.accepts),
        })
        .collect();
    println!("{}", output::format_table(&rows));

    Ok(())
}
