mod body;

use keel_core::entities::NewDocument;
use keel_db::updates::DocumentUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DocCommands;
use crate::commands::attachment::remove_objects;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::clearable;
use crate::commands::shared::update::require_any_field;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel doc`.
pub async fn handle(action: &DocCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        DocCommands::Create {
            title,
            slug,
            body,
            file,
            project,
            tag,
        } => {
            let input = NewDocument {
                title: title.clone(),
                slug: slug.clone(),
                body: body::resolve(body.as_deref(), file.as_deref())?.unwrap_or_default(),
                project_id: project.clone(),
                tags: tag.clone(),
            };
            output(&ctx.service.create_document(&input).await?, flags.format)
        }
        DocCommands::Get { id } => output(&ctx.service.get_document(id).await?, flags.format),
        DocCommands::List {
            project,
            tag,
            limit,
        } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            let documents = ctx
                .service
                .list_documents(project.as_deref(), tag.as_deref(), limit)
                .await?;
            output(&documents, flags.format)
        }
        DocCommands::Update {
            id,
            title,
            body,
            file,
            tag,
            project,
        } => {
            require_any_field(&[
                ("--title", title.is_some()),
                ("--body", body.is_some()),
                ("--file", file.is_some()),
                ("--tag", !tag.is_empty()),
                ("--project", project.is_some()),
            ])?;

            let mut builder = DocumentUpdateBuilder::new();
            if let Some(title) = title {
                builder = builder.title(title.as_str());
            }
            if let Some(body) = body::resolve(body.as_deref(), file.as_deref())? {
                builder = builder.body(body);
            }
            if !tag.is_empty() {
                builder = builder.tags(tag.clone());
            }
            if let Some(project) = clearable(project.as_deref()) {
                builder = builder.project_id(project);
            }

            output(&ctx.service.update_document(id, &builder.build()).await?, flags.format)
        }
        DocCommands::Render { id } => output(&ctx.service.render_document(id).await?, flags.format),
        DocCommands::History { id } => {
            output(&ctx.service.list_document_versions(id).await?, flags.format)
        }
        DocCommands::Version { id, version } => {
            output(&ctx.service.get_document_version(id, *version).await?, flags.format)
        }
        DocCommands::Restore { id, version } => {
            output(&ctx.service.restore_document_version(id, *version).await?, flags.format)
        }
        DocCommands::Search { query, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&ctx.service.search_documents(query, limit).await?, flags.format)
        }
        DocCommands::Delete { id } => {
            let keys = ctx.service.delete_document(id).await?;
            let removed = remove_objects(ctx, &keys).await;
            output(
                &json!({ "deleted": id, "attachments_removed": removed }),
                flags.format,
            )
        }
    }
}
