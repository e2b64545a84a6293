//! Project repository: CRUD, status transitions, and status counts.

use chrono::Utc;
use keel_core::audit_detail::StatusChangedDetail;
use keel_core::entities::{NewProject, Project};
use keel_core::enums::{AuditAction, EntityType, ProjectStatus};
use keel_core::ids::PREFIX_PROJECT;
use keel_core::responses::ProjectCounts;
use keel_core::validation::{Validate, Validator};

use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, get_u8, opt_date, opt_real, opt_text, parse_datetime, parse_enum,
    parse_optional_date,
};
use crate::repos::AttachmentOwner;
use crate::service::KeelService;
use crate::updates::Assignments;
use crate::updates::project::ProjectUpdate;

const SELECT_COLS: &str = "id, org_id, name, client, status, start_date, end_date, budget, \
                           progress, description, created_at, updated_at";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get(0)?,
        org_id: row.get(1)?,
        name: row.get(2)?,
        client: get_opt_string(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        start_date: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
        end_date: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        budget: row.get::<Option<f64>>(7)?,
        progress: get_u8(row, 8)?,
        description: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

impl KeelService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input, or a libSQL error.
    pub async fn create_project(&self, input: &NewProject) -> Result<Project, DatabaseError> {
        input.validate()?;
        let now = Utc::now();
        let project = Project {
            id: self.db().generate_id(PREFIX_PROJECT).await?,
            org_id: self.org_id().to_string(),
            name: input.name.trim().to_string(),
            client: input.client.clone(),
            status: input.status.unwrap_or(ProjectStatus::Planned),
            start_date: input.start_date,
            end_date: input.end_date,
            budget: input.budget,
            progress: input.progress.unwrap_or(0),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };

        let params: Vec<libsql::Value> = vec![
            project.id.clone().into(),
            project.org_id.clone().into(),
            project.name.clone().into(),
            opt_text(project.client.as_deref()),
            project.status.as_str().into(),
            opt_date(project.start_date),
            opt_date(project.end_date),
            opt_real(project.budget),
            i64::from(project.progress).into(),
            opt_text(project.description.as_deref()),
            now.to_rfc3339().into(),
            now.to_rfc3339().into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO projects ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        self.audit(
            EntityType::Project,
            &project.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        tracing::info!(id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such project exists in the tenant.
    pub async fn get_project(&self, id: &str) -> Result<Project, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM projects WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Project, id))?;
        row_to_project(&row)
    }

    /// List projects, optionally filtered by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        limit: u32,
    ) -> Result<Vec<Project>, DatabaseError> {
        let mut sql = format!("SELECT {SELECT_COLS} FROM projects WHERE org_id = ?1");
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];
        if let Some(status) = status {
            params.push(status.as_str().into());
            sql.push_str(&format!(" AND status = ?{}", params.len()));
        }
        sql.push_str(&format!(" ORDER BY created_at DESC, rowid DESC LIMIT {limit}"));

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(row_to_project(&row)?);
        }
        Ok(projects)
    }

    /// Apply a partial update. Status changes go through [`Self::transition_project`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` when the update (or the resulting
    /// date range) is invalid, and `NotFound` when the project does not exist.
    pub async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<Project, DatabaseError> {
        update.validate()?;
        let current = self.get_project(id).await?;

        let start = update.start_date.unwrap_or(current.start_date);
        let end = update.end_date.unwrap_or(current.end_date);
        Validator::new().date_order("end_date", start, end).finish()?;

        let mut a = Assignments::default();
        if let Some(ref name) = update.name {
            a.set("name", name.trim().to_string());
        }
        if let Some(ref client) = update.client {
            a.set_opt("client", client.clone());
        }
        if let Some(date) = update.start_date {
            a.set("start_date", opt_date(date));
        }
        if let Some(date) = update.end_date {
            a.set("end_date", opt_date(date));
        }
        if let Some(budget) = update.budget {
            a.set("budget", opt_real(budget));
        }
        if let Some(progress) = update.progress {
            a.set("progress", i64::from(progress));
        }
        if let Some(ref description) = update.description {
            a.set_opt("description", description.clone());
        }
        if a.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        let (sql, params) = a.into_update("projects", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.audit(
            EntityType::Project,
            id,
            AuditAction::Updated,
            Some(serde_json::to_value(update)?),
        )
        .await?;
        self.get_project(id).await
    }

    /// Move a project to `to`, enforcing the status state machine.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the transition is not allowed.
    pub async fn transition_project(
        &self,
        id: &str,
        to: ProjectStatus,
        reason: Option<&str>,
    ) -> Result<Project, DatabaseError> {
        let current = self.get_project(id).await?;
        current.status.check_transition(to, id)?;

        let now = Utc::now();
        let mut a = Assignments::default();
        a.set("status", to.as_str());
        if to == ProjectStatus::Completed {
            a.set("progress", 100_i64);
        }
        let (sql, params) = a.into_update("projects", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: to.as_str().to_string(),
            reason: reason.map(String::from),
        };
        self.audit(
            EntityType::Project,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
        )
        .await?;
        tracing::info!(id, from = %current.status, %to, "project status changed");
        self.get_project(id).await
    }

    /// Delete a project. Financial records, tasks, and documents keep their
    /// rows with the project reference cleared; CSAT entries and attachments
    /// owned by the project are removed with it. Returns the storage keys of
    /// those attachments so the caller can remove the objects.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the project does not exist.
    pub async fn delete_project(&self, id: &str) -> Result<Vec<String>, DatabaseError> {
        let keys = self
            .attachment_keys(&AttachmentOwner::Project(id.to_string()))
            .await?;
        let deleted = self
            .db()
            .execute_with("DELETE FROM projects WHERE id = ?1 AND org_id = ?2", || {
                [id, self.org_id()]
            })
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::Project, id));
        }
        self.audit(EntityType::Project, id, AuditAction::Deleted, None)
            .await?;
        if !keys.is_empty() {
            tracing::debug!(id, attachments = keys.len(), "project attachments removed");
        }
        Ok(keys)
    }

    /// Count the tenant's projects per status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn project_counts(&self) -> Result<ProjectCounts, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT status, COUNT(*) FROM projects WHERE org_id = ?1 GROUP BY status",
                || [self.org_id()],
            )
            .await?;
        let mut counts = ProjectCounts::default();
        while let Some(row) = rows.next().await? {
            let status: ProjectStatus = parse_enum(&row.get::<String>(0)?)?;
            let n = u32::try_from(row.get::<i64>(1)?).unwrap_or(u32::MAX);
            match status {
                ProjectStatus::Planned => counts.planned = n,
                ProjectStatus::Active => counts.active = n,
                ProjectStatus::OnHold => counts.on_hold = n,
                ProjectStatus::Completed => counts.completed = n,
                ProjectStatus::Cancelled => counts.cancelled = n,
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::AuditFilter;
    use crate::test_support::helpers::{seed_project, test_service, two_tenants};
    use crate::updates::ProjectUpdateBuilder;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn create_and_get() {
        let svc = test_service().await;
        let created = svc
            .create_project(&NewProject {
                client: Some("Initech".into()),
                budget: Some(12_000.0),
                ..NewProject::named("Website relaunch")
            })
            .await
            .unwrap();
        assert!(created.id.starts_with("prj-"));
        assert_eq!(created.status, ProjectStatus::Planned);
        assert_eq!(created.progress, 0);

        let fetched = svc.get_project(&created.id).await.unwrap();
        assert_eq!(fetched.name, "Website relaunch");
        assert_eq!(fetched.client.as_deref(), Some("Initech"));
        assert_eq!(fetched.budget, Some(12_000.0));
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() {
        let svc = test_service().await;
        let err = svc
            .create_project(&NewProject {
                progress: Some(150),
                ..NewProject::named("Relaunch")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
        assert!(svc.list_projects(None, 10).await.unwrap().is_empty());
        assert!(svc.query_audit(&AuditFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let svc = test_service().await;
        let p = seed_project(&svc, "Relaunch").await;
        let update = ProjectUpdateBuilder::new()
            .progress(40)
            .client(Some("Globex".into()))
            .build();
        let updated = svc.update_project(&p.id, &update).await.unwrap();
        assert_eq!(updated.progress, 40);
        assert_eq!(updated.client.as_deref(), Some("Globex"));
        assert_eq!(updated.name, "Relaunch");

        let audit = svc
            .query_audit(&AuditFilter {
                entity_id: Some(p.id.clone()),
                action: Some(AuditAction::Updated),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        let detail = audit[0].detail.as_ref().unwrap();
        assert_eq!(detail["progress"], 40);
        assert!(detail.get("name").is_none());
    }

    #[tokio::test]
    async fn update_rejects_end_before_existing_start() {
        let svc = test_service().await;
        let p = svc
            .create_project(&NewProject {
                start_date: NaiveDate::from_ymd_opt(2026, 5, 1),
                ..NewProject::named("Relaunch")
            })
            .await
            .unwrap();
        let update = ProjectUpdateBuilder::new()
            .end_date(NaiveDate::from_ymd_opt(2026, 4, 1))
            .build();
        let err = svc.update_project(&p.id, &update).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(ref e) if e.has("end_date")));
    }

    #[tokio::test]
    async fn transitions_follow_state_machine() {
        let svc = test_service().await;
        let p = seed_project(&svc, "Relaunch").await;

        let err = svc
            .transition_project(&p.id, ProjectStatus::Completed, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidState(ref msg)
                if *msg == format!("Cannot move project {} from planned to completed", p.id)
        ));

        svc.transition_project(&p.id, ProjectStatus::Active, Some("kickoff"))
            .await
            .unwrap();
        let done = svc
            .transition_project(&p.id, ProjectStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(done.status, ProjectStatus::Completed);
        assert_eq!(done.progress, 100);

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::StatusChanged),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_status_and_counts() {
        let svc = test_service().await;
        let a = seed_project(&svc, "A").await;
        seed_project(&svc, "B").await;
        svc.transition_project(&a.id, ProjectStatus::Active, None)
            .await
            .unwrap();

        let active = svc
            .list_projects(Some(ProjectStatus::Active), 10)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);

        let counts = svc.project_counts().await.unwrap();
        assert_eq!(counts.active, 1);
        assert_eq!(counts.planned, 1);
        assert_eq!(counts.completed, 0);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let svc = test_service().await;
        let p = seed_project(&svc, "Relaunch").await;
        svc.delete_project(&p.id).await.unwrap();
        assert!(svc.get_project(&p.id).await.unwrap_err().is_not_found());
        assert!(svc.delete_project(&p.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn other_tenant_cannot_see_or_delete() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_tenants(dir.path()).await;
        let p = seed_project(&a, "Secret").await;

        assert!(b.get_project(&p.id).await.unwrap_err().is_not_found());
        assert!(b.list_projects(None, 10).await.unwrap().is_empty());
        assert!(b.delete_project(&p.id).await.unwrap_err().is_not_found());
        assert!(a.get_project(&p.id).await.is_ok());
    }
}
