//! Attachment metadata repository.
//!
//! Rows here describe objects held in the bucket; the bytes themselves are
//! written and removed by `keel-storage`. Callers upload first and record
//! metadata second, and delete metadata first and the object second.

use chrono::Utc;
use keel_core::entities::{Attachment, NewAttachment};
use keel_core::enums::{AuditAction, EntityType};
use keel_core::ids::PREFIX_ATTACHMENT;
use keel_core::validation::Validate;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, opt_text, parse_datetime};
use crate::service::KeelService;

const SELECT_COLS: &str = "id, org_id, document_id, project_id, file_name, content_type, \
                           size_bytes, storage_key, created_at";

/// The record an attachment hangs off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentOwner {
    Document(String),
    Project(String),
}

impl AttachmentOwner {
    const fn column(&self) -> &'static str {
        match self {
            Self::Document(_) => "document_id",
            Self::Project(_) => "project_id",
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::Document(id) | Self::Project(id) => id,
        }
    }
}

fn row_to_attachment(row: &libsql::Row) -> Result<Attachment, DatabaseError> {
    let size: i64 = row.get(6)?;
    Ok(Attachment {
        id: row.get(0)?,
        org_id: row.get(1)?,
        document_id: get_opt_string(row, 2)?,
        project_id: get_opt_string(row, 3)?,
        file_name: row.get(4)?,
        content_type: row.get(5)?,
        size_bytes: u64::try_from(size)
            .map_err(|_| DatabaseError::Query(format!("Negative attachment size: {size}")))?,
        storage_key: row.get(7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl KeelService {
    /// Record metadata for an uploaded object.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input and `NotFound`
    /// when the owning document or project does not exist in the tenant.
    pub async fn create_attachment(&self, input: &NewAttachment) -> Result<Attachment, DatabaseError> {
        input.validate()?;
        if let Some(ref document_id) = input.document_id {
            self.ensure_owned("documents", EntityType::Document, document_id)
                .await?;
        }
        self.ensure_project(input.project_id.as_deref()).await?;

        let size = i64::try_from(input.size_bytes)
            .map_err(|_| DatabaseError::Query(format!("Size out of range: {}", input.size_bytes)))?;
        let attachment = Attachment {
            id: self.db().generate_id(PREFIX_ATTACHMENT).await?,
            org_id: self.org_id().to_string(),
            document_id: input.document_id.clone(),
            project_id: input.project_id.clone(),
            file_name: input.file_name.clone(),
            content_type: input.content_type.clone(),
            size_bytes: input.size_bytes,
            storage_key: input.storage_key.clone(),
            created_at: Utc::now(),
        };

        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO attachments ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                || {
                    libsql::params![
                        attachment.id.as_str(),
                        attachment.org_id.as_str(),
                        opt_text(attachment.document_id.as_deref()),
                        opt_text(attachment.project_id.as_deref()),
                        attachment.file_name.as_str(),
                        attachment.content_type.as_str(),
                        size,
                        attachment.storage_key.as_str(),
                        attachment.created_at.to_rfc3339()
                    ]
                },
            )
            .await?;

        self.audit(
            EntityType::Attachment,
            &attachment.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;

        tracing::info!(
            id = %attachment.id,
            key = %attachment.storage_key,
            size = attachment.size_bytes,
            "attachment recorded"
        );
        Ok(attachment)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the attachment does not exist.
    pub async fn get_attachment(&self, id: &str) -> Result<Attachment, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM attachments WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Attachment, id))?;
        row_to_attachment(&row)
    }

    /// Attachments of one document or project, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_attachments(
        &self,
        owner: &AttachmentOwner,
    ) -> Result<Vec<Attachment>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM attachments
             WHERE {} = ?1 AND org_id = ?2
             ORDER BY created_at, rowid",
            owner.column()
        );
        let mut rows = self
            .db()
            .query_with(&sql, || [owner.id(), self.org_id()])
            .await?;
        let mut attachments = Vec::new();
        while let Some(row) = rows.next().await? {
            attachments.push(row_to_attachment(&row)?);
        }
        Ok(attachments)
    }

    /// Storage keys of every attachment the owner holds. Read before deleting
    /// the owner, since the cascade drops these rows.
    pub(crate) async fn attachment_keys(
        &self,
        owner: &AttachmentOwner,
    ) -> Result<Vec<String>, DatabaseError> {
        let sql = format!(
            "SELECT storage_key FROM attachments WHERE {} = ?1 AND org_id = ?2 ORDER BY rowid",
            owner.column()
        );
        let mut rows = self
            .db()
            .query_with(&sql, || [owner.id(), self.org_id()])
            .await?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(row.get::<String>(0)?);
        }
        Ok(keys)
    }

    /// Delete the metadata row and return it so the caller can remove the
    /// object by its `storage_key`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the attachment does not exist.
    pub async fn delete_attachment(&self, id: &str) -> Result<Attachment, DatabaseError> {
        let attachment = self.get_attachment(id).await?;
        self.db()
            .execute_with("DELETE FROM attachments WHERE id = ?1 AND org_id = ?2", || {
                [id, self.org_id()]
            })
            .await?;
        self.audit(
            EntityType::Attachment,
            id,
            AuditAction::Deleted,
            Some(serde_json::json!({ "storage_key": attachment.storage_key })),
        )
        .await?;
        Ok(attachment)
    }
}
