use keel_core::analytics::csat_summary;
use keel_core::entities::NewCsatEntry;
use keel_db::repos::CsatFilter;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CsatCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{parse_month, parse_optional_month};
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel csat`.
pub async fn handle(action: &CsatCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        CsatCommands::Add {
            project,
            month,
            score,
            respondent,
            comment,
        } => {
            let input = NewCsatEntry {
                project_id: project.clone(),
                month: parse_month(month)?,
                score: *score,
                respondent: respondent.clone(),
                comment: comment.clone(),
            };
            let entry = ctx.service.create_csat_entry(&input).await?;
            output(&entry, flags.format)
        }
        CsatCommands::List {
            month,
            project,
            limit,
        } => {
            let filter = CsatFilter {
                month: parse_optional_month(month.as_deref())?,
                project_id: project.clone(),
                limit: Some(effective_limit(*limit, flags.limit, ctx.default_limit())),
            };
            output(&ctx.service.list_csat_entries(&filter).await?, flags.format)
        }
        CsatCommands::Get { id } => output(&ctx.service.get_csat_entry(id).await?, flags.format),
        CsatCommands::Delete { id } => {
            ctx.service.delete_csat_entry(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        CsatCommands::Summary { month } => {
            // Without a month the summary covers every entry on record.
            let filter = CsatFilter {
                month: parse_optional_month(month.as_deref())?,
                ..CsatFilter::default()
            };
            let entries = ctx.service.list_csat_entries(&filter).await?;
            output(&csat_summary(&entries), flags.format)
        }
    }
}
