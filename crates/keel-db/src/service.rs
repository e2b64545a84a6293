//! Service layer: tenant-scoped repositories on top of `KeelDb`.
//!
//! `KeelService` wraps `KeelDb` (raw database access), the `Tenant` every
//! call runs as, and the `SchemaRegistry` used to check import payloads. All
//! repo methods are implemented as `impl KeelService` blocks in [`crate::repos`].

use keel_core::enums::EntityType;
use keel_core::identity::Tenant;
use keel_schema::SchemaRegistry;

use crate::KeelDb;
use crate::error::DatabaseError;

/// Orchestrates tenant-scoped reads and audited writes.
///
/// Every mutation method follows this protocol:
/// 1. Validate the input (no SQL runs on invalid input)
/// 2. Execute SQL scoped to the tenant's `org_id`
/// 3. Append an audit entry with the tenant's `user_id` as actor
///
/// Writes spanning several rows (survey submissions, document versions,
/// imports) run inside a transaction together with their audit entries.
pub struct KeelService {
    db: KeelDb,
    tenant: Tenant,
    schema: SchemaRegistry,
}

impl KeelService {
    /// Open a local database file for `tenant`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(path: &str, tenant: Tenant) -> Result<Self, DatabaseError> {
        let db = KeelDb::open_local(path).await?;
        Ok(Self::from_db(db, tenant))
    }

    /// Connect to a remote libSQL database for `tenant`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection fails.
    pub async fn new_remote(
        url: &str,
        auth_token: &str,
        tenant: Tenant,
    ) -> Result<Self, DatabaseError> {
        let db = KeelDb::open_remote(url, auth_token).await?;
        Ok(Self::from_db(db, tenant))
    }

    #[must_use]
    pub fn from_db(db: KeelDb, tenant: Tenant) -> Self {
        Self {
            db,
            tenant,
            schema: SchemaRegistry::new(),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &KeelDb {
        &self.db
    }

    #[must_use]
    pub const fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    #[must_use]
    pub fn org_id(&self) -> &str {
        &self.tenant.org_id
    }

    /// The user recorded on audit entries.
    #[must_use]
    pub fn actor(&self) -> &str {
        &self.tenant.user_id
    }

    /// Access the schema registry.
    #[must_use]
    pub const fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Check that `id` names a row of `table` in the tenant's organization.
    /// References to another tenant's rows read as missing.
    pub(crate) async fn ensure_owned(
        &self,
        table: &str,
        entity_type: EntityType,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let sql = format!("SELECT 1 FROM {table} WHERE id = ?1 AND org_id = ?2");
        let mut rows = self.db.query_with(&sql, || [id, self.org_id()]).await?;
        if rows.next().await?.is_some() {
            Ok(())
        } else {
            Err(DatabaseError::not_found(entity_type, id))
        }
    }

    /// [`Self::ensure_owned`] for an optional project reference.
    pub(crate) async fn ensure_project(&self, project_id: Option<&str>) -> Result<(), DatabaseError> {
        match project_id {
            Some(id) => self.ensure_owned("projects", EntityType::Project, id).await,
            None => Ok(()),
        }
    }

    /// [`Self::ensure_owned`] for an optional team member reference.
    pub(crate) async fn ensure_member(&self, member_id: Option<&str>) -> Result<(), DatabaseError> {
        match member_id {
            Some(id) => {
                self.ensure_owned("team_members", EntityType::TeamMember, id)
                    .await
            }
            None => Ok(()),
        }
    }
}
