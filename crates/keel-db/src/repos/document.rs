//! Knowledge-base document repository: versioned markdown pages.
//!
//! Every document has at least one row in `document_versions`. Creating a
//! document writes version 1; each change to title or body writes the next
//! version; restoring copies an old version forward as a new one. The
//! document row always mirrors its latest version.

use chrono::{DateTime, Utc};
use keel_core::audit_detail::VersionDetail;
use keel_core::entities::{Document, DocumentVersion, NewDocument};
use keel_core::enums::{AuditAction, EntityType};
use keel_core::ids::{PREFIX_DOCUMENT, PREFIX_DOCUMENT_VERSION};
use keel_core::markdown::{EXCERPT_LEN, excerpt, render_html};
use keel_core::responses::RenderedDocument;
use keel_core::validation::{Validate, ValidationErrors};

use crate::error::DatabaseError;
use crate::helpers::{fts_query, get_opt_string, get_u32, opt_text, parse_datetime};
use crate::repos::AttachmentOwner;
use crate::repos::audit::append_audit_on;
use crate::service::KeelService;
use crate::updates::document::DocumentUpdate;

const SELECT_COLS: &str =
    "id, org_id, title, slug, body, project_id, tags, version, created_at, updated_at";
const VERSION_COLS: &str = "id, document_id, version, title, body, author, created_at";

fn row_to_document(row: &libsql::Row) -> Result<Document, DatabaseError> {
    let tags: String = row.get(6)?;
    Ok(Document {
        id: row.get(0)?,
        org_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        body: row.get(4)?,
        project_id: get_opt_string(row, 5)?,
        tags: serde_json::from_str(&tags)
            .map_err(|e| DatabaseError::Query(format!("Invalid tags JSON: {e}")))?,
        version: get_u32(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

fn row_to_version(row: &libsql::Row) -> Result<DocumentVersion, DatabaseError> {
    Ok(DocumentVersion {
        id: row.get(0)?,
        document_id: row.get(1)?,
        version: get_u32(row, 2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        author: row.get(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tags.iter().map(|t| t.trim().to_lowercase()).collect();
    out.sort();
    out.dedup();
    out
}

impl KeelService {
    async fn insert_version(
        &self,
        conn: &libsql::Connection,
        document_id: &str,
        version: u32,
        title: &str,
        body: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let id = self.db().generate_id(PREFIX_DOCUMENT_VERSION).await?;
        conn.execute(
            &format!("INSERT INTO document_versions ({VERSION_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            libsql::params![
                id.as_str(),
                document_id,
                i64::from(version),
                title,
                body,
                self.actor(),
                at.to_rfc3339()
            ],
        )
        .await?;
        Ok(())
    }

    /// Create a document as version 1.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input or when the slug
    /// is already used in the tenant, and `NotFound` for an unknown project.
    pub async fn create_document(&self, input: &NewDocument) -> Result<Document, DatabaseError> {
        input.validate()?;
        self.ensure_project(input.project_id.as_deref()).await?;
        let slug = input.effective_slug();
        if self.document_id_by_slug(&slug).await?.is_some() {
            return Err(ValidationErrors::single("slug", format!("'{slug}' is already in use")).into());
        }

        let now = Utc::now();
        let document = Document {
            id: self.db().generate_id(PREFIX_DOCUMENT).await?,
            org_id: self.org_id().to_string(),
            title: input.title.trim().to_string(),
            slug,
            body: input.body.clone(),
            project_id: input.project_id.clone(),
            tags: normalize_tags(&input.tags),
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let tx = self.db().conn().transaction().await?;
        tx.execute(
            &format!(
                "INSERT INTO documents ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            libsql::params![
                document.id.as_str(),
                document.org_id.as_str(),
                document.title.as_str(),
                document.slug.as_str(),
                document.body.as_str(),
                opt_text(document.project_id.as_deref()),
                serde_json::to_string(&document.tags)?,
                1_i64,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await?;
        self.insert_version(&tx, &document.id, 1, &document.title, &document.body, now)
            .await?;
        let detail = VersionDetail {
            version: 1,
            restored_from: None,
        };
        let entry = self
            .audit_entry(
                EntityType::Document,
                &document.id,
                AuditAction::Created,
                Some(serde_json::to_value(&detail)?),
            )
            .await?;
        append_audit_on(&tx, &entry).await?;
        tx.commit().await?;

        tracing::info!(id = %document.id, slug = %document.slug, "document created");
        Ok(document)
    }

    async fn document_id_by_slug(&self, slug: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT id FROM documents WHERE slug = ?1 AND org_id = ?2",
                || [slug, self.org_id()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Fetch a document by ID or slug.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if neither matches in the tenant.
    pub async fn get_document(&self, id_or_slug: &str) -> Result<Document, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM documents
                     WHERE (id = ?1 OR slug = ?1) AND org_id = ?2"
                ),
                || [id_or_slug, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Document, id_or_slug))?;
        row_to_document(&row)
    }

    /// List documents, most recently updated first, optionally for one
    /// project or carrying one tag.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_documents(
        &self,
        project_id: Option<&str>,
        tag: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Document>, DatabaseError> {
        let mut conditions = vec!["org_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];
        if let Some(project_id) = project_id {
            params.push(project_id.into());
            conditions.push(format!("project_id = ?{}", params.len()));
        }
        if let Some(tag) = tag {
            params.push(tag.trim().to_lowercase().into());
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM json_each(documents.tags) WHERE json_each.value = ?{})",
                params.len()
            ));
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM documents WHERE {}
             ORDER BY updated_at DESC, rowid DESC LIMIT {limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(row_to_document(&row)?);
        }
        Ok(documents)
    }

    /// Apply an update. A changed title or body writes a new version; tags
    /// and project are metadata and keep the version number.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input and `NotFound`
    /// when the document or a newly referenced project does not exist.
    pub async fn update_document(
        &self,
        id_or_slug: &str,
        update: &DocumentUpdate,
    ) -> Result<Document, DatabaseError> {
        update.validate()?;
        let current = self.get_document(id_or_slug).await?;
        if let Some(ref project_id) = update.project_id {
            self.ensure_project(project_id.as_deref()).await?;
        }

        let title = update
            .title
            .as_deref()
            .map_or_else(|| current.title.clone(), |t| t.trim().to_string());
        let body = update.body.clone().unwrap_or_else(|| current.body.clone());
        let content_changed = title != current.title || body != current.body;
        let tags = update
            .tags
            .as_deref()
            .map_or_else(|| current.tags.clone(), normalize_tags);
        let project_id = update
            .project_id
            .clone()
            .unwrap_or_else(|| current.project_id.clone());

        if !content_changed && tags == current.tags && project_id == current.project_id {
            return Ok(current);
        }

        let version = if content_changed {
            current.version + 1
        } else {
            current.version
        };
        let now = Utc::now();
        let tx = self.db().conn().transaction().await?;
        tx.execute(
            "UPDATE documents SET title = ?1, body = ?2, tags = ?3, project_id = ?4,
                 version = ?5, updated_at = ?6
             WHERE id = ?7 AND org_id = ?8",
            libsql::params![
                title.as_str(),
                body.as_str(),
                serde_json::to_string(&tags)?,
                opt_text(project_id.as_deref()),
                i64::from(version),
                now.to_rfc3339(),
                current.id.as_str(),
                self.org_id()
            ],
        )
        .await?;
        if content_changed {
            self.insert_version(&tx, &current.id, version, &title, &body, now)
                .await?;
        }

        let mut detail = serde_json::to_value(update)?;
        if content_changed {
            detail["version"] = serde_json::json!(version);
        }
        let entry = self
            .audit_entry(
                EntityType::Document,
                &current.id,
                AuditAction::Updated,
                Some(detail),
            )
            .await?;
        append_audit_on(&tx, &entry).await?;
        tx.commit().await?;

        tracing::info!(id = %current.id, version, content_changed, "document updated");
        Ok(Document {
            title,
            body,
            tags,
            project_id,
            version,
            updated_at: now,
            ..current
        })
    }

    /// Version history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the document does not exist.
    pub async fn list_document_versions(
        &self,
        id_or_slug: &str,
    ) -> Result<Vec<DocumentVersion>, DatabaseError> {
        let document = self.get_document(id_or_slug).await?;
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {VERSION_COLS} FROM document_versions
                     WHERE document_id = ?1 ORDER BY version DESC"
                ),
                || [document.id.as_str()],
            )
            .await?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next().await? {
            versions.push(row_to_version(&row)?);
        }
        Ok(versions)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the document or version does not exist.
    pub async fn get_document_version(
        &self,
        id_or_slug: &str,
        version: u32,
    ) -> Result<DocumentVersion, DatabaseError> {
        let document = self.get_document(id_or_slug).await?;
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {VERSION_COLS} FROM document_versions
                     WHERE document_id = ?1 AND version = ?2"
                ),
                || libsql::params![document.id.as_str(), i64::from(version)],
            )
            .await?;
        let row = rows.next().await?.ok_or_else(|| {
            DatabaseError::not_found(EntityType::Document, &format!("{} v{version}", document.id))
        })?;
        row_to_version(&row)
    }

    /// Copy an old version's title and body forward as a new version.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the document or version does not exist.
    pub async fn restore_document_version(
        &self,
        id_or_slug: &str,
        version: u32,
    ) -> Result<Document, DatabaseError> {
        let current = self.get_document(id_or_slug).await?;
        let old = self.get_document_version(&current.id, version).await?;
        let next = current.version + 1;
        let now = Utc::now();

        let tx = self.db().conn().transaction().await?;
        tx.execute(
            "UPDATE documents SET title = ?1, body = ?2, version = ?3, updated_at = ?4
             WHERE id = ?5 AND org_id = ?6",
            libsql::params![
                old.title.as_str(),
                old.body.as_str(),
                i64::from(next),
                now.to_rfc3339(),
                current.id.as_str(),
                self.org_id()
            ],
        )
        .await?;
        self.insert_version(&tx, &current.id, next, &old.title, &old.body, now)
            .await?;
        let detail = VersionDetail {
            version: next,
            restored_from: Some(version),
        };
        let entry = self
            .audit_entry(
                EntityType::Document,
                &current.id,
                AuditAction::Restored,
                Some(serde_json::to_value(&detail)?),
            )
            .await?;
        append_audit_on(&tx, &entry).await?;
        tx.commit().await?;

        tracing::info!(id = %current.id, restored_from = version, version = next, "document restored");
        Ok(Document {
            title: old.title,
            body: old.body,
            version: next,
            updated_at: now,
            ..current
        })
    }

    /// Full-text search over title and body, best match first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn search_documents(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Document>, DatabaseError> {
        let Some(fts) = fts_query(query) else {
            return Ok(Vec::new());
        };
        let cols = SELECT_COLS
            .split(", ")
            .map(|c| format!("d.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {cols} FROM documents_fts
             JOIN documents d ON d.rowid = documents_fts.rowid
             WHERE documents_fts MATCH ?1 AND d.org_id = ?2
             ORDER BY rank LIMIT ?3"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params![fts.as_str(), self.org_id(), limit])
            .await?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            documents.push(row_to_document(&row)?);
        }
        Ok(documents)
    }

    /// The document with its body rendered to HTML and a plain-text excerpt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the document does not exist.
    pub async fn render_document(&self, id_or_slug: &str) -> Result<RenderedDocument, DatabaseError> {
        let document = self.get_document(id_or_slug).await?;
        Ok(RenderedDocument {
            html: render_html(&document.body),
            excerpt: excerpt(&document.body, EXCERPT_LEN),
            document,
        })
    }

    /// Delete a document with its versions and attachments metadata. Returns
    /// the storage keys of the removed attachments.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the document does not exist.
    pub async fn delete_document(&self, id_or_slug: &str) -> Result<Vec<String>, DatabaseError> {
        let document = self.get_document(id_or_slug).await?;
        let keys = self
            .attachment_keys(&AttachmentOwner::Document(document.id.clone()))
            .await?;
        self.db()
            .execute_with("DELETE FROM documents WHERE id = ?1 AND org_id = ?2", || {
                [document.id.as_str(), self.org_id()]
            })
            .await?;
        self.audit(EntityType::Document, &document.id, AuditAction::Deleted, None)
            .await?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::AuditFilter;
    use crate::test_support::helpers::{test_service, two_tenants};
    use crate::updates::DocumentUpdateBuilder;
    use pretty_assertions::assert_eq;

    fn doc(title: &str, body: &str) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            body: body.to_string(),
            ..NewDocument::default()
        }
    }

    #[tokio::test]
    async fn create_writes_version_one() {
        let svc = test_service().await;
        let d = svc
            .create_document(&NewDocument {
                tags: vec!["Sales".into(), "sales".into(), " onboarding ".into()],
                ..doc("Sales Playbook", "# Playbook\n\nCall within a day.")
            })
            .await
            .unwrap();
        assert_eq!(d.slug, "sales-playbook");
        assert_eq!(d.version, 1);
        assert_eq!(d.tags, vec!["onboarding", "sales"]);

        let by_slug = svc.get_document("sales-playbook").await.unwrap();
        assert_eq!(by_slug, d);
        let versions = svc.list_document_versions(&d.id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].author, "usr_ana");
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected_per_tenant() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_tenants(dir.path()).await;
        a.create_document(&doc("Handbook", "")).await.unwrap();
        let err = a.create_document(&doc("Handbook", "")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(ref e) if e.has("slug")));
        b.create_document(&doc("Handbook", "")).await.unwrap();
    }

    #[tokio::test]
    async fn body_change_bumps_version_but_tags_do_not() {
        let svc = test_service().await;
        let d = svc.create_document(&doc("Handbook", "v1 text")).await.unwrap();

        let tagged = svc
            .update_document(&d.id, &DocumentUpdateBuilder::new().tags(vec!["hr".into()]).build())
            .await
            .unwrap();
        assert_eq!(tagged.version, 1);

        let edited = svc
            .update_document(&d.id, &DocumentUpdateBuilder::new().body("v2 text").build())
            .await
            .unwrap();
        assert_eq!(edited.version, 2);
        assert_eq!(svc.get_document(&d.id).await.unwrap(), edited);

        let same = svc
            .update_document(&d.id, &DocumentUpdateBuilder::new().body("v2 text").build())
            .await
            .unwrap();
        assert_eq!(same.version, 2);
        assert_eq!(svc.list_document_versions(&d.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn restore_copies_old_version_forward() {
        let svc = test_service().await;
        let d = svc.create_document(&doc("Handbook", "original")).await.unwrap();
        svc.update_document(&d.id, &DocumentUpdateBuilder::new().body("rewrite").build())
            .await
            .unwrap();

        let restored = svc.restore_document_version(&d.id, 1).await.unwrap();
        assert_eq!(restored.version, 3);
        assert_eq!(restored.body, "original");

        let history: Vec<u32> = svc
            .list_document_versions(&d.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version)
            .collect();
        assert_eq!(history, vec![3, 2, 1]);

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Restored),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audit[0].detail.as_ref().unwrap()["restored_from"], 1);

        assert!(
            svc.restore_document_version(&d.id, 9)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn search_follows_edits() {
        let svc = test_service().await;
        let d = svc.create_document(&doc("Handbook", "expense policy")).await.unwrap();
        assert_eq!(svc.search_documents("expense", 10).await.unwrap().len(), 1);

        svc.update_document(&d.id, &DocumentUpdateBuilder::new().body("travel rules").build())
            .await
            .unwrap();
        assert!(svc.search_documents("expense", 10).await.unwrap().is_empty());
        assert_eq!(svc.search_documents("travel", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_by_tag() {
        let svc = test_service().await;
        svc.create_document(&NewDocument {
            tags: vec!["hr".into()],
            ..doc("Leave policy", "")
        })
        .await
        .unwrap();
        svc.create_document(&doc("Sales playbook", "")).await.unwrap();

        let hr = svc.list_documents(None, Some("HR"), 10).await.unwrap();
        assert_eq!(hr.len(), 1);
        assert_eq!(hr[0].title, "Leave policy");
        assert_eq!(svc.list_documents(None, None, 10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn render_produces_html_and_excerpt() {
        let svc = test_service().await;
        svc.create_document(&doc("Guide", "# Guide\n\nUse *care*."))
            .await
            .unwrap();
        let rendered = svc.render_document("guide").await.unwrap();
        assert!(rendered.html.contains("<em>care</em>"));
        assert_eq!(rendered.excerpt, "Guide Use care.");
    }

    #[tokio::test]
    async fn delete_removes_versions() {
        let svc = test_service().await;
        let d = svc.create_document(&doc("Handbook", "x")).await.unwrap();
        svc.delete_document("handbook").await.unwrap();
        assert!(svc.get_document(&d.id).await.unwrap_err().is_not_found());
        let mut rows = svc
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM document_versions", ())
            .await
            .unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 0);
    }
}
