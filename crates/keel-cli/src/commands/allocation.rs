use keel_core::entities::NewAllocation;
use keel_core::enums::CostType;
use keel_db::repos::AllocationFilter;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AllocationCommands;
use crate::commands::shared::parse::{month_or_current, parse_enum, parse_month, parse_optional_month};
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel allocation`.
pub async fn handle(
    action: &AllocationCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AllocationCommands::Set {
            member,
            month,
            cost_type,
            percentage,
            project,
        } => {
            let input = NewAllocation {
                team_member_id: member.clone(),
                project_id: project.clone(),
                month: parse_month(month)?,
                cost_type: parse_enum::<CostType>(cost_type, "cost type")?,
                percentage: *percentage,
            };
            let response = ctx.service.upsert_allocation(&input).await?;
            output(&response, flags.format)
        }
        AllocationCommands::List {
            month,
            member,
            project,
        } => {
            let filter = AllocationFilter {
                month: parse_optional_month(month.as_deref())?,
                team_member_id: member.clone(),
                project_id: project.clone(),
            };
            let allocations = ctx.service.list_allocations(&filter).await?;
            output(&allocations, flags.format)
        }
        AllocationCommands::Utilization { month } => {
            let month = month_or_current(month.as_deref())?;
            let rows = ctx.service.member_utilization(month).await?;
            let over = rows.iter().filter(|row| row.over_allocated).count();
            if over > 0 && !flags.quiet {
                tracing::warn!(%month, members = over, "team members allocated above 100%");
            }
            output(&rows, flags.format)
        }
        AllocationCommands::Remove { id } => {
            ctx.service.delete_allocation(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
