//! Audit trail repository.
//!
//! Append-only entries recording every mutation, with the tenant's user as
//! actor. Entries written as part of a multi-row write go through the same
//! transaction as the rows they describe.

use chrono::Utc;
use keel_core::entities::AuditEntry;
use keel_core::enums::{AuditAction, EntityType};
use keel_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::KeelService;

const INSERT_SQL: &str = "INSERT INTO audit_trail
     (id, org_id, actor, entity_type, entity_id, action, detail, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SELECT_COLS: &str = "id, org_id, actor, entity_type, entity_id, action, detail, created_at";

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor: Option<String>,
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get(0)?,
        org_id: row.get(1)?,
        actor: row.get(2)?,
        entity_type: parse_enum(&row.get::<String>(3)?)?,
        entity_id: row.get(4)?,
        action: parse_enum(&row.get::<String>(5)?)?,
        detail: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn insert_params(entry: &AuditEntry) -> Vec<libsql::Value> {
    vec![
        entry.id.clone().into(),
        entry.org_id.clone().into(),
        entry.actor.clone().into(),
        entry.entity_type.as_str().into(),
        entry.entity_id.clone().into(),
        entry.action.as_str().into(),
        entry
            .detail
            .as_ref()
            .map_or(libsql::Value::Null, |d| d.to_string().into()),
        entry.created_at.to_rfc3339().into(),
    ]
}

/// Insert `entry` on `conn`, typically an open transaction.
pub(crate) async fn append_audit_on(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    conn.execute(INSERT_SQL, libsql::params_from_iter(insert_params(entry)))
        .await?;
    Ok(())
}

impl KeelService {
    /// Build an audit entry for the current tenant without writing it.
    pub(crate) async fn audit_entry(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<AuditEntry, DatabaseError> {
        let actor = self.actor().to_string();
        self.audit_entry_as(&actor, entity_type, entity_id, action, detail)
            .await
    }

    /// Same as [`Self::audit_entry`] with an explicit actor.
    pub(crate) async fn audit_entry_as(
        &self,
        actor: &str,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<AuditEntry, DatabaseError> {
        Ok(AuditEntry {
            id: self.db().generate_id(PREFIX_AUDIT).await?,
            org_id: self.org_id().to_string(),
            actor: actor.to_string(),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: Utc::now(),
        })
    }

    /// Build and append an audit entry in one step.
    pub(crate) async fn audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<(), DatabaseError> {
        let entry = self
            .audit_entry(entity_type, entity_id, action, detail)
            .await?;
        self.append_audit(&entry).await
    }

    /// Append an audit entry. Called by every mutation method.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        let params = insert_params(entry);
        self.db()
            .execute_with(INSERT_SQL, || libsql::params_from_iter(params.clone()))
            .await?;
        Ok(())
    }

    /// Query the tenant's audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = vec!["org_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];

        if let Some(et) = filter.entity_type {
            params.push(et.as_str().into());
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(eid.clone().into());
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(action.as_str().into());
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor {
            params.push(actor.clone().into());
            conditions.push(format!("actor = ?{}", params.len()));
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM audit_trail WHERE {}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}
