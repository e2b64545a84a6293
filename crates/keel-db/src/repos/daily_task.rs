//! Daily task repository: CRUD, status transitions, date/member listing.

use chrono::{NaiveDate, Utc};
use keel_core::audit_detail::StatusChangedDetail;
use keel_core::entities::{DailyTask, NewDailyTask};
use keel_core::enums::{AuditAction, DailyTaskStatus, EntityType};
use keel_core::ids::PREFIX_DAILY_TASK;
use keel_core::validation::Validate;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, opt_text, parse_date, parse_datetime, parse_enum};
use crate::service::KeelService;
use crate::updates::Assignments;
use crate::updates::daily_task::DailyTaskUpdate;

const SELECT_COLS: &str = "id, org_id, team_member_id, project_id, date, title, status, hours, \
                           notes, created_at, updated_at";

/// Filter criteria for listing daily tasks.
#[derive(Debug, Default)]
pub struct DailyTaskFilter {
    pub date: Option<NaiveDate>,
    pub team_member_id: Option<String>,
    pub project_id: Option<String>,
    pub status: Option<DailyTaskStatus>,
    pub limit: Option<u32>,
}

fn row_to_task(row: &libsql::Row) -> Result<DailyTask, DatabaseError> {
    Ok(DailyTask {
        id: row.get(0)?,
        org_id: row.get(1)?,
        team_member_id: get_opt_string(row, 2)?,
        project_id: get_opt_string(row, 3)?,
        date: parse_date(&row.get::<String>(4)?)?,
        title: row.get(5)?,
        status: parse_enum(&row.get::<String>(6)?)?,
        hours: row.get(7)?,
        notes: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl KeelService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input and `NotFound`
    /// when a referenced member or project is not in the tenant.
    pub async fn create_daily_task(&self, input: &NewDailyTask) -> Result<DailyTask, DatabaseError> {
        input.validate()?;
        self.ensure_member(input.team_member_id.as_deref()).await?;
        self.ensure_project(input.project_id.as_deref()).await?;

        let now = Utc::now();
        let task = DailyTask {
            id: self.db().generate_id(PREFIX_DAILY_TASK).await?,
            org_id: self.org_id().to_string(),
            team_member_id: input.team_member_id.clone(),
            project_id: input.project_id.clone(),
            date: input.date,
            title: input.title.trim().to_string(),
            status: DailyTaskStatus::Todo,
            hours: input.hours,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        let params: Vec<libsql::Value> = vec![
            task.id.clone().into(),
            task.org_id.clone().into(),
            opt_text(task.team_member_id.as_deref()),
            opt_text(task.project_id.as_deref()),
            task.date.to_string().into(),
            task.title.clone().into(),
            task.status.as_str().into(),
            task.hours.into(),
            opt_text(task.notes.as_deref()),
            now.to_rfc3339().into(),
            now.to_rfc3339().into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO daily_tasks ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        self.audit(
            EntityType::DailyTask,
            &task.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        Ok(task)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such task exists in the tenant.
    pub async fn get_daily_task(&self, id: &str) -> Result<DailyTask, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM daily_tasks WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::DailyTask, id))?;
        row_to_task(&row)
    }

    /// List tasks, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_daily_tasks(
        &self,
        filter: &DailyTaskFilter,
    ) -> Result<Vec<DailyTask>, DatabaseError> {
        let mut conditions = vec!["org_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];
        if let Some(date) = filter.date {
            params.push(date.to_string().into());
            conditions.push(format!("date = ?{}", params.len()));
        }
        if let Some(ref member) = filter.team_member_id {
            params.push(member.clone().into());
            conditions.push(format!("team_member_id = ?{}", params.len()));
        }
        if let Some(ref project) = filter.project_id {
            params.push(project.clone().into());
            conditions.push(format!("project_id = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(status.as_str().into());
            conditions.push(format!("status = ?{}", params.len()));
        }
        let limit = filter
            .limit
            .map_or_else(String::new, |n| format!(" LIMIT {n}"));
        let sql = format!(
            "SELECT {SELECT_COLS} FROM daily_tasks WHERE {}
             ORDER BY date DESC, created_at{limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// Apply a partial update. Status changes go through
    /// [`Self::transition_daily_task`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input, `NotFound` if the
    /// task or a newly referenced member/project does not exist.
    pub async fn update_daily_task(
        &self,
        id: &str,
        update: &DailyTaskUpdate,
    ) -> Result<DailyTask, DatabaseError> {
        update.validate()?;
        let current = self.get_daily_task(id).await?;
        if let Some(ref member) = update.team_member_id {
            self.ensure_member(member.as_deref()).await?;
        }
        if let Some(ref project) = update.project_id {
            self.ensure_project(project.as_deref()).await?;
        }

        let mut a = Assignments::default();
        if let Some(ref title) = update.title {
            a.set("title", title.trim().to_string());
        }
        if let Some(date) = update.date {
            a.set("date", date.to_string());
        }
        if let Some(hours) = update.hours {
            a.set("hours", hours);
        }
        if let Some(ref member) = update.team_member_id {
            a.set_opt("team_member_id", member.clone());
        }
        if let Some(ref project) = update.project_id {
            a.set_opt("project_id", project.clone());
        }
        if let Some(ref notes) = update.notes {
            a.set_opt("notes", notes.clone());
        }
        if a.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        let (sql, params) = a.into_update("daily_tasks", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.audit(
            EntityType::DailyTask,
            id,
            AuditAction::Updated,
            Some(serde_json::to_value(update)?),
        )
        .await?;
        self.get_daily_task(id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the transition is not allowed.
    pub async fn transition_daily_task(
        &self,
        id: &str,
        to: DailyTaskStatus,
    ) -> Result<DailyTask, DatabaseError> {
        let current = self.get_daily_task(id).await?;
        current.status.check_transition(to, id)?;

        let now = Utc::now();
        let mut a = Assignments::default();
        a.set("status", to.as_str());
        let (sql, params) = a.into_update("daily_tasks", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: to.as_str().to_string(),
            reason: None,
        };
        self.audit(
            EntityType::DailyTask,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
        )
        .await?;
        self.get_daily_task(id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the task does not exist.
    pub async fn delete_daily_task(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .execute_with("DELETE FROM daily_tasks WHERE id = ?1 AND org_id = ?2", || {
                [id, self.org_id()]
            })
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::DailyTask, id));
        }
        self.audit(EntityType::DailyTask, id, AuditAction::Deleted, None)
            .await
    }
}
