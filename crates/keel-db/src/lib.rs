//! # keel-db
//!
//! libSQL storage for Keel: schema migrations, tenant-scoped repositories,
//! and the append-only audit trail.
//!
//! Uses the `libsql` crate (C `SQLite` fork) for native FTS5 on leads and
//! documents. A database is either a local file (or `:memory:` in tests) or a
//! remote libSQL server such as Turso. Remote statements retry transient
//! infrastructure errors with exponential backoff (see [`retry`]).

pub mod error;
pub mod helpers;
pub mod import;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::{RetryConfig, is_transient_error};

/// Central database handle.
///
/// Wraps a libSQL database and a single connection. Repositories live on
/// [`service::KeelService`], which adds tenant scoping on top of this handle.
pub struct KeelDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    remote: bool,
    retry: RetryConfig,
}

impl KeelDb {
    /// Open a local database file, creating it if needed. `":memory:"` opens
    /// a throwaway in-memory database.
    ///
    /// Runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        tracing::debug!(path, "opened local database");
        Self::init(db, conn, false).await
    }

    /// Connect to a remote libSQL server (e.g. `libsql://keel-acme.turso.io`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;
        tracing::debug!(url, "connected to remote database");
        Self::init(db, conn, true).await
    }

    async fn init(
        db: libsql::Database,
        conn: libsql::Connection,
        remote: bool,
    ) -> Result<Self, DatabaseError> {
        // Foreign keys are per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let keel_db = Self {
            db,
            conn,
            remote,
            retry: RetryConfig::default(),
        };
        keel_db.run_migrations().await?;
        Ok(keel_db)
    }

    /// Replace the retry policy used for remote statements.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"led-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .query_with("SELECT ?1 || '-' || lower(hex(randomblob(4)))", || [prefix])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Execute a statement, retrying transient errors on remote databases.
    ///
    /// `params` is called once per attempt because libSQL consumes them.
    ///
    /// # Errors
    ///
    /// Returns the last libSQL error once retries are exhausted, or the first
    /// non-transient error.
    pub async fn execute_with<F, P>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.execute(sql, params()).await {
                Ok(changed) => return Ok(changed),
                Err(e) if self.should_retry(&e, attempt) => {
                    self.backoff(&e, attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Run a query, retrying transient errors on remote databases.
    ///
    /// # Errors
    ///
    /// Same as [`Self::execute_with`].
    pub async fn query_with<F, P>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        let mut attempt = 1;
        loop {
            match self.conn.query(sql, params()).await {
                Ok(rows) => return Ok(rows),
                Err(e) if self.should_retry(&e, attempt) => {
                    self.backoff(&e, attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn should_retry(&self, e: &libsql::Error, attempt: u32) -> bool {
        self.remote && attempt < self.retry.max_attempts && is_transient_error(e)
    }

    async fn backoff(&self, e: &libsql::Error, attempt: u32) {
        let delay = self.retry.delay_for(attempt);
        tracing::warn!(attempt, ?delay, error = %e, "transient libSQL error, retrying");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> KeelDb {
        KeelDb::open_local(":memory:").await.unwrap()
    }

    async fn table_exists(db: &KeelDb, name: &str) -> bool {
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
            )
            .await
            .unwrap();
        rows.next().await.unwrap().is_some()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        for table in [
            "projects",
            "financial_records",
            "leads",
            "team_members",
            "allocations",
            "csat_entries",
            "esat_surveys",
            "esat_questions",
            "esat_responses",
            "esat_answers",
            "daily_tasks",
            "documents",
            "document_versions",
            "attachments",
            "audit_trail",
            "leads_fts",
            "documents_fts",
        ] {
            assert!(table_exists(&db, table).await, "table '{table}' should exist");
        }
        assert!(!db.is_remote());
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("led").await.unwrap();
        assert!(id.starts_with("led-"), "ID should start with 'led-': {id}");
        assert_eq!(id.len(), 12);
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in keel_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(keel_core::ids::has_prefix(&id, prefix), "{id}");
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn allocation_key_is_unique() {
        let db = test_db().await;
        let now = "2026-06-01T00:00:00+00:00";
        db.conn()
            .execute(
                "INSERT INTO team_members (id, org_id, name, created_at, updated_at)
                 VALUES ('mbr-1', 'org', 'Ana', ?1, ?1)",
                [now],
            )
            .await
            .unwrap();
        let insert = "INSERT INTO allocations
             (id, org_id, team_member_id, month, cost_type, percentage, created_at, updated_at)
             VALUES (?1, 'org', 'mbr-1', '2026-06', 'cogs', 50, ?2, ?2)";
        db.conn().execute(insert, ["alc-1", now]).await.unwrap();
        let result = db.conn().execute(insert, ["alc-2", now]).await;
        assert!(result.is_err(), "duplicate allocation key should be rejected");
    }

    #[tokio::test]
    async fn lead_fts_trigger_populates_on_insert() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO leads (id, org_id, company, notes, created_at, updated_at)
                 VALUES ('led-1', 'org', 'Initech', 'wants a migration roadmap', 'x', 'x')",
                (),
            )
            .await
            .unwrap();

        let mut rows = db
            .conn()
            .query("SELECT rowid FROM leads_fts WHERE leads_fts MATCH 'roadmap'", ())
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO csat_entries (id, org_id, project_id, month, score, created_at)
                 VALUES ('csa-1', 'org', 'prj-missing', '2026-06', 90, 'x')",
                (),
            )
            .await;
        assert!(result.is_err());
    }
}
