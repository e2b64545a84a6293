use keel_core::entities::NewProject;
use keel_core::enums::ProjectStatus;
use keel_db::updates::ProjectUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProjectCommands;
use crate::commands::attachment::remove_objects;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{
    clearable, non_blank, parse_enum, parse_optional_date, parse_optional_enum,
};
use crate::commands::shared::update::require_any_field;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel project`.
pub async fn handle(
    action: &ProjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProjectCommands::Create {
            name,
            client,
            status,
            start,
            end,
            budget,
            description,
        } => {
            let input = NewProject {
                name: name.clone(),
                client: client.clone(),
                status: parse_optional_enum::<ProjectStatus>(status.as_deref(), "status")?,
                start_date: parse_optional_date(start.as_deref(), "start date")?,
                end_date: parse_optional_date(end.as_deref(), "end date")?,
                budget: *budget,
                progress: None,
                description: description.clone(),
            };
            let project = ctx.service.create_project(&input).await?;
            output(&project, flags.format)
        }
        ProjectCommands::List { status, limit } => {
            let status = parse_optional_enum::<ProjectStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            let projects = ctx.service.list_projects(status, limit).await?;
            output(&projects, flags.format)
        }
        ProjectCommands::Get { id } => output(&ctx.service.get_project(id).await?, flags.format),
        ProjectCommands::Update {
            id,
            name,
            client,
            start,
            end,
            budget,
            progress,
            description,
        } => {
            require_any_field(&[
                ("--name", name.is_some()),
                ("--client", client.is_some()),
                ("--start", start.is_some()),
                ("--end", end.is_some()),
                ("--budget", budget.is_some()),
                ("--progress", progress.is_some()),
                ("--description", description.is_some()),
            ])?;

            let mut builder = ProjectUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if let Some(client) = clearable(client.as_deref()) {
                builder = builder.client(client);
            }
            if let Some(start) = start {
                builder = builder.start_date(parse_optional_date(non_blank(start), "start date")?);
            }
            if let Some(end) = end {
                builder = builder.end_date(parse_optional_date(non_blank(end), "end date")?);
            }
            if let Some(budget) = budget {
                builder = builder.budget(Some(*budget));
            }
            if let Some(progress) = progress {
                builder = builder.progress(*progress);
            }
            if let Some(description) = clearable(description.as_deref()) {
                builder = builder.description(description);
            }

            let project = ctx.service.update_project(id, &builder.build()).await?;
            output(&project, flags.format)
        }
        ProjectCommands::Status { id, status, reason } => {
            let to = parse_enum::<ProjectStatus>(status, "status")?;
            let project = ctx
                .service
                .transition_project(id, to, reason.as_deref())
                .await?;
            output(&project, flags.format)
        }
        ProjectCommands::Delete { id } => {
            let keys = ctx.service.delete_project(id).await?;
            let removed = remove_objects(ctx, &keys).await;
            output(
                &json!({ "deleted": id, "attachments_removed": removed }),
                flags.format,
            )
        }
    }
}

