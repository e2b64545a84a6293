use std::path::Path;

use anyhow::Context;
use keel_core::entities::{MAX_ATTACHMENT_BYTES, NewAttachment};
use keel_db::repos::AttachmentOwner;
use keel_storage::{AttachmentStore, KeyScope, attachment_key};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{AttachmentCommands, OwnerArgs};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `keel attachment`.
pub async fn handle(
    action: &AttachmentCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AttachmentCommands::Upload {
            path,
            owner,
            content_type,
        } => upload(Path::new(path), owner, content_type.as_deref(), ctx, flags).await,
        AttachmentCommands::Url { id } => {
            let attachment = ctx.service.get_attachment(id).await?;
            let url = ctx.storage()?.signed_url(&attachment.storage_key).await?;
            output(
                &json!({
                    "id": attachment.id,
                    "file_name": attachment.file_name,
                    "url": url,
                    "expires_in_secs": ctx.config.storage.signed_url_ttl_secs,
                }),
                flags.format,
            )
        }
        AttachmentCommands::List { owner } => {
            let attachments = ctx.service.list_attachments(&owner_of(owner)?).await?;
            output(&attachments, flags.format)
        }
        AttachmentCommands::Download { id, out } => {
            let attachment = ctx.service.get_attachment(id).await?;
            let bytes = ctx.storage()?.get(&attachment.storage_key).await?;
            std::fs::write(out, &bytes).with_context(|| format!("failed to write {out}"))?;
            output(
                &json!({ "id": attachment.id, "path": out, "size_bytes": bytes.len() }),
                flags.format,
            )
        }
        AttachmentCommands::Delete { id } => {
            let store = ctx.storage()?;
            let attachment = ctx.service.delete_attachment(id).await?;
            remove_from(&store, std::slice::from_ref(&attachment.storage_key)).await;
            output(&json!({ "deleted": attachment.id }), flags.format)
        }
    }
}

/// Remove the objects behind attachment rows that were deleted with their
/// owner. Returns how many were removed.
pub async fn remove_objects(ctx: &AppContext, keys: &[String]) -> usize {
    if keys.is_empty() {
        return 0;
    }
    match ctx.storage() {
        Ok(store) => remove_from(&store, keys).await,
        Err(error) => {
            tracing::warn!(count = keys.len(), error = %format!("{error:#}"), "attachment objects not removed");
            0
        }
    }
}

// The records are gone either way; a leftover object only costs space.
async fn remove_from(store: &AttachmentStore, keys: &[String]) -> usize {
    let mut removed = 0;
    for key in keys {
        match store.delete(key).await {
            Ok(()) => removed += 1,
            Err(error) => tracing::warn!(key = %key, %error, "attachment object not removed"),
        }
    }
    removed
}

/// Upload the bytes first, then record the metadata; remove the object again
/// if the record cannot be written.
async fn upload(
    path: &Path,
    owner: &OwnerArgs,
    content_type: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let owner = owner_of(owner)?;
    let (scope, owner_id) = match &owner {
        AttachmentOwner::Document(id) => {
            let document = ctx.service.get_document(id).await?;
            (KeyScope::Document, document.id)
        }
        AttachmentOwner::Project(id) => (KeyScope::Project, ctx.service.get_project(id).await?.id),
    };

    let size = std::fs::metadata(path)
        .with_context(|| format!("failed to read {}", path.display()))?
        .len();
    if size > MAX_ATTACHMENT_BYTES {
        anyhow::bail!(
            "{} is {size} bytes; attachments are limited to {MAX_ATTACHMENT_BYTES} bytes",
            path.display()
        );
    }
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", path.display()))?
        .to_string();
    let content_type = content_type.map_or_else(|| guess_content_type(&file_name), str::to_string);
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let store = ctx.storage()?;
    let key = attachment_key(ctx.service.org_id(), scope, &owner_id, &file_name);
    let progress = Progress::upload(&file_name, size);
    let stored = match store.put(&key, &content_type, bytes).await {
        Ok(stored) => stored,
        Err(error) => {
            progress.finish_err("upload failed");
            return Err(error.into());
        }
    };
    progress.finish_clear();

    let input = NewAttachment {
        document_id: matches!(scope, KeyScope::Document).then(|| owner_id.clone()),
        project_id: matches!(scope, KeyScope::Project).then(|| owner_id.clone()),
        file_name,
        content_type,
        size_bytes: stored,
        storage_key: key.clone(),
    };
    match ctx.service.create_attachment(&input).await {
        Ok(attachment) => output(&attachment, flags.format),
        Err(error) => {
            if let Err(cleanup) = store.delete(&key).await {
                tracing::warn!(key = %key, error = %cleanup, "orphaned attachment object");
            }
            Err(error.into())
        }
    }
}

fn owner_of(owner: &OwnerArgs) -> anyhow::Result<AttachmentOwner> {
    match (&owner.document, &owner.project) {
        (Some(document), None) => Ok(AttachmentOwner::Document(document.clone())),
        (None, Some(project)) => Ok(AttachmentOwner::Project(project.clone())),
        _ => anyhow::bail!("Exactly one of --document or --project must be provided"),
    }
}

fn guess_content_type(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime = match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "md" | "markdown" => "text/markdown",
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "jsonl" => "application/x-ndjson",
        "zip" => "application/zip",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    };
    mime.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn guesses_common_types_case_insensitively() {
        assert_eq!(guess_content_type("Q3-report.PDF"), "application/pdf");
        assert_eq!(guess_content_type("notes.md"), "text/markdown");
        assert_eq!(guess_content_type("archive"), "application/octet-stream");
    }

    #[test]
    fn owner_requires_exactly_one_flag() {
        let both = OwnerArgs {
            document: Some("doc-1".into()),
            project: Some("prj-1".into()),
        };
        assert!(owner_of(&both).is_err());

        let project = OwnerArgs {
            document: None,
            project: Some("prj-1".into()),
        };
        assert!(matches!(owner_of(&project), Ok(AttachmentOwner::Project(id)) if id == "prj-1"));
    }

    #[tokio::test]
    async fn removes_every_listed_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::local(dir.path(), Duration::from_secs(60)).unwrap();
        let keys = vec![
            "org_acme/projects/prj-1/1-sow.pdf".to_string(),
            "org_acme/projects/prj-1/2-invoice.pdf".to_string(),
        ];
        for key in &keys {
            store.put(key, "application/pdf", vec![1, 2, 3]).await.unwrap();
        }

        assert_eq!(remove_from(&store, &keys).await, 2);
        for key in &keys {
            assert!(store.get(key).await.is_err());
        }
    }
}
