//! CSAT entry repository.

use chrono::Utc;
use keel_core::entities::{CsatEntry, NewCsatEntry};
use keel_core::enums::{AuditAction, EntityType};
use keel_core::ids::PREFIX_CSAT;
use keel_core::month::Month;
use keel_core::validation::Validate;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, opt_text, parse_datetime, parse_month};
use crate::service::KeelService;

const SELECT_COLS: &str =
    "id, org_id, project_id, month, score, respondent, comment, created_at";

/// Filter criteria for listing CSAT entries.
#[derive(Debug, Default)]
pub struct CsatFilter {
    pub month: Option<Month>,
    pub project_id: Option<String>,
    pub limit: Option<u32>,
}

fn row_to_csat(row: &libsql::Row) -> Result<CsatEntry, DatabaseError> {
    Ok(CsatEntry {
        id: row.get(0)?,
        org_id: row.get(1)?,
        project_id: row.get(2)?,
        month: parse_month(&row.get::<String>(3)?)?,
        score: row.get(4)?,
        respondent: get_opt_string(row, 5)?,
        comment: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl KeelService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input and `NotFound`
    /// when the project is not in the tenant.
    pub async fn create_csat_entry(&self, input: &NewCsatEntry) -> Result<CsatEntry, DatabaseError> {
        input.validate()?;
        self.ensure_project(Some(&input.project_id)).await?;

        let now = Utc::now();
        let entry = CsatEntry {
            id: self.db().generate_id(PREFIX_CSAT).await?,
            org_id: self.org_id().to_string(),
            project_id: input.project_id.clone(),
            month: input.month,
            score: input.score,
            respondent: input.respondent.clone(),
            comment: input.comment.clone(),
            created_at: now,
        };

        let params: Vec<libsql::Value> = vec![
            entry.id.clone().into(),
            entry.org_id.clone().into(),
            entry.project_id.clone().into(),
            entry.month.to_string().into(),
            entry.score.into(),
            opt_text(entry.respondent.as_deref()),
            opt_text(entry.comment.as_deref()),
            now.to_rfc3339().into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO csat_entries ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        self.audit(
            EntityType::CsatEntry,
            &entry.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        Ok(entry)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such entry exists in the tenant.
    pub async fn get_csat_entry(&self, id: &str) -> Result<CsatEntry, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM csat_entries WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::CsatEntry, id))?;
        row_to_csat(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_csat_entries(
        &self,
        filter: &CsatFilter,
    ) -> Result<Vec<CsatEntry>, DatabaseError> {
        let mut conditions = vec!["org_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];
        if let Some(month) = filter.month {
            params.push(month.to_string().into());
            conditions.push(format!("month = ?{}", params.len()));
        }
        if let Some(ref project_id) = filter.project_id {
            params.push(project_id.clone().into());
            conditions.push(format!("project_id = ?{}", params.len()));
        }
        let limit = filter
            .limit
            .map_or_else(String::new, |n| format!(" LIMIT {n}"));
        let sql = format!(
            "SELECT {SELECT_COLS} FROM csat_entries WHERE {}
             ORDER BY month DESC, created_at DESC{limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_csat(&row)?);
        }
        Ok(entries)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the entry does not exist.
    pub async fn delete_csat_entry(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .execute_with(
                "DELETE FROM csat_entries WHERE id = ?1 AND org_id = ?2",
                || [id, self.org_id()],
            )
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::CsatEntry, id));
        }
        self.audit(EntityType::CsatEntry, id, AuditAction::Deleted, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_project, test_service};

    fn score(project_id: &str, month: &str, score: f64) -> NewCsatEntry {
        NewCsatEntry {
            project_id: project_id.to_string(),
            month: month.parse().unwrap(),
            score,
            respondent: None,
            comment: None,
        }
    }

    #[tokio::test]
    async fn record_and_list_by_month() {
        let svc = test_service().await;
        let p = seed_project(&svc, "Relaunch").await;
        svc.create_csat_entry(&score(&p.id, "2026-05", 90.0)).await.unwrap();
        svc.create_csat_entry(&score(&p.id, "2026-06", 70.0)).await.unwrap();

        let may = svc
            .list_csat_entries(&CsatFilter {
                month: Some("2026-05".parse().unwrap()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(may.len(), 1);
        assert!((may[0].score - 90.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn score_out_of_range_is_rejected() {
        let svc = test_service().await;
        let p = seed_project(&svc, "Relaunch").await;
        let err = svc
            .create_csat_entry(&score(&p.id, "2026-05", 101.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(ref e) if e.has("score")));
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let svc = test_service().await;
        let err = svc
            .create_csat_entry(&score("prj-00000000", "2026-05", 80.0))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn deleting_project_removes_its_scores() {
        let svc = test_service().await;
        let p = seed_project(&svc, "Relaunch").await;
        let entry = svc.create_csat_entry(&score(&p.id, "2026-05", 80.0)).await.unwrap();
        svc.delete_project(&p.id).await.unwrap();
        assert!(svc.get_csat_entry(&entry.id).await.unwrap_err().is_not_found());
    }
}
