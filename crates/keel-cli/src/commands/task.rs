use chrono::Utc;
use keel_core::entities::NewDailyTask;
use keel_core::enums::DailyTaskStatus;
use keel_db::repos::DailyTaskFilter;
use keel_db::updates::DailyTaskUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TaskCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{
    clearable, parse_date, parse_enum, parse_optional_date, parse_optional_enum,
};
use crate::commands::shared::update::require_any_field;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel task`.
pub async fn handle(action: &TaskCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        TaskCommands::Create {
            title,
            date,
            hours,
            member,
            project,
            notes,
        } => {
            let input = NewDailyTask {
                team_member_id: member.clone(),
                project_id: project.clone(),
                date: parse_optional_date(date.as_deref(), "date")?
                    .unwrap_or_else(|| Utc::now().date_naive()),
                title: title.clone(),
                hours: *hours,
                notes: notes.clone(),
            };
            let task = ctx.service.create_daily_task(&input).await?;
            output(&task, flags.format)
        }
        TaskCommands::List {
            date,
            member,
            project,
            status,
            limit,
        } => {
            let filter = DailyTaskFilter {
                date: parse_optional_date(date.as_deref(), "date")?,
                team_member_id: member.clone(),
                project_id: project.clone(),
                status: parse_optional_enum::<DailyTaskStatus>(status.as_deref(), "status")?,
                limit: Some(effective_limit(*limit, flags.limit, ctx.default_limit())),
            };
            output(&ctx.service.list_daily_tasks(&filter).await?, flags.format)
        }
        TaskCommands::Get { id } => output(&ctx.service.get_daily_task(id).await?, flags.format),
        TaskCommands::Update {
            id,
            title,
            date,
            hours,
            member,
            project,
            notes,
        } => {
            require_any_field(&[
                ("--title", title.is_some()),
                ("--date", date.is_some()),
                ("--hours", hours.is_some()),
                ("--member", member.is_some()),
                ("--project", project.is_some()),
                ("--notes", notes.is_some()),
            ])?;

            let mut builder = DailyTaskUpdateBuilder::new();
            if let Some(title) = title {
                builder = builder.title(title.as_str());
            }
            if let Some(date) = date {
                builder = builder.date(parse_date(date, "date")?);
            }
            if let Some(hours) = hours {
                builder = builder.hours(*hours);
            }
            if let Some(member) = clearable(member.as_deref()) {
                builder = builder.team_member_id(member);
            }
            if let Some(project) = clearable(project.as_deref()) {
                builder = builder.project_id(project);
            }
            if let Some(notes) = clearable(notes.as_deref()) {
                builder = builder.notes(notes);
            }

            let task = ctx.service.update_daily_task(id, &builder.build()).await?;
            output(&task, flags.format)
        }
        TaskCommands::Status { id, status } => {
            let to = parse_enum::<DailyTaskStatus>(status, "status")?;
            output(&ctx.service.transition_daily_task(id, to).await?, flags.format)
        }
        TaskCommands::Delete { id } => {
            ctx.service.delete_daily_task(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
