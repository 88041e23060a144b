// crates/weft-cli/src/commands/search.rs
//
// `weft search members|listings|events|groups|skills` — federated search
// against all eligible partner tenants.

use clap::{Args, Subcommand};
use tabled::Tabled;

use weft_core::FederatedRecord;
use weft_rpc::handlers::search::SearchResponse;

use crate::output;
use crate::rpc_client::rpc_call;
use crate::CliContext;

/// Search subcommands, one per resource kind plus skills autocomplete.
#[derive(Debug, Subcommand)]
pub enum SearchCmd {
    /// Search members across partner timebanks.
    Members(SearchArgs),
    /// Search service listings.
    Listings(SearchArgs),
    /// Search events.
    Events(SearchArgs),
    /// Search groups.
    Groups(SearchArgs),
    /// Autocomplete skill tokens.
    Skills {
        /// The skill prefix to complete.
        q: String,
    },
}

/// Common search arguments.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query.
    #[arg(long)]
    pub q: Option<String>,

    /// Restrict to one partner tenant.
    #[arg(long)]
    pub tenant_id: Option<u64>,

    /// Skills to match (any of them).
    #[arg(long)]
    pub skill: Vec<String>,

    /// Location substring.
    #[arg(long)]
    pub location: Option<String>,

    /// Category (listings).
    #[arg(long)]
    pub category: Option<String>,

    /// Page offset.
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Page size.
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Sort order: name, recent, active.
    #[arg(long, default_value = "name")]
    pub sort: String,
}

impl SearchArgs {
    fn params(&self) -> serde_json::Value {
        serde_json::json!({
            "q": self.q,
            "tenant_id": self.tenant_id,
            "skills": self.skill,
            "location": self.location,
            "category": self.category,
            "offset": self.offset,
            "limit": self.limit,
            "sort": self.sort,
        })
    }
}

/// A member row in the search result table.
#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Tenant")]
    tenant: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Skills")]
    skills: String,
    #[tabled(rename = "Msg")]
    messaging: String,
    #[tabled(rename = "Tx")]
    transactions: String,
}

/// A generic row for listings, events, and groups.
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Tenant")]
    tenant: u64,
    #[tabled(rename = "Id")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

/// Run the search command.
pub async fn run(ctx: &CliContext, cmd: &SearchCmd) -> Result<(), Box<dyn std::error::Error>> {
    let (method, params) = match cmd {
        SearchCmd::Members(args) => ("search/members", args.params()),
        SearchCmd::Listings(args) => ("search/listings", args.params()),
        SearchCmd::Events(args) => ("search/events", args.params()),
        SearchCmd::Groups(args) => ("search/groups", args.params()),
        SearchCmd::Skills { q } => {
            let result = rpc_call(
                &ctx.rpc,
                "search/skills",
                serde_json::json!({ "q": q }),
                ctx.context.clone(),
            )
            .await?;
            if ctx.json {
                println!("{}", output::format_json(&result));
            } else {
                let skills = result["skills"]
                    .as_array()
                    .map(|a| {
                        a.iter()
                            .filter_map(|s| s.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                println!("Skills: {}", skills);
            }
            return Ok(());
        }
    };

    let result = rpc_call(&ctx.rpc, method, params, ctx.context.clone()).await?;
    if ctx.json {
        println!("{}", output::format_json(&result));
        return Ok(());
    }

    let response: SearchResponse = serde_json::from_value(result)?;
    let mut member_rows = Vec::new();
    let mut record_rows = Vec::new();
    for item in &response.items {
        match item {
            FederatedRecord::Member(m) => member_rows.push(MemberRow {
                tenant: m.tenant_id,
                name: m.name.clone(),
                location: m.location.clone().unwrap_or_else(|| "-".to_string()),
                skills: m.skills.join(", "),
                messaging: yes_no(m.messaging_enabled),
                transactions: yes_no(m.transactions_enabled),
            }),
            other => record_rows.push(RecordRow {
                tenant: other.tenant_id(),
                id: other.record_id(),
                name: other.display_name().to_string(),
            }),
        }
    }

    if !member_rows.is_empty() {
        println!("{}", output::format_table(&member_rows));
    }
    if !record_rows.is_empty() {
        println!("{}", output::format_table(&record_rows));
    }
    if response.items.is_empty() {
        println!("No results.");
    }
    println!();
    println!(
        "Tenants consulted: {:?}  |  More pages: {}",
        response.tenants_consulted, response.has_more
    );

    Ok(())
}
