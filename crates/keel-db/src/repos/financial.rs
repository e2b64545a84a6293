//! Financial record repository.

use chrono::Utc;
use keel_core::entities::{FinancialRecord, NewFinancialRecord};
use keel_core::enums::{AuditAction, EntityType, FinancialCategory};
use keel_core::ids::PREFIX_FINANCIAL;
use keel_core::month::Month;
use keel_core::validation::Validate;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, opt_text, parse_datetime, parse_enum, parse_month};
use crate::service::KeelService;
use crate::updates::Assignments;
use crate::updates::financial::FinancialUpdate;

const SELECT_COLS: &str =
    "id, org_id, project_id, month, category, amount, description, created_at, updated_at";

/// Filter criteria for listing financial records.
#[derive(Debug, Default)]
pub struct FinancialFilter {
    pub month: Option<Month>,
    pub project_id: Option<String>,
    pub category: Option<FinancialCategory>,
    pub limit: Option<u32>,
}

fn row_to_record(row: &libsql::Row) -> Result<FinancialRecord, DatabaseError> {
    Ok(FinancialRecord {
        id: row.get(0)?,
        org_id: row.get(1)?,
        project_id: get_opt_string(row, 2)?,
        month: parse_month(&row.get::<String>(3)?)?,
        category: parse_enum(&row.get::<String>(4)?)?,
        amount: row.get(5)?,
        description: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl KeelService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input and `NotFound`
    /// when the referenced project is not in the tenant.
    pub async fn create_financial_record(
        &self,
        input: &NewFinancialRecord,
    ) -> Result<FinancialRecord, DatabaseError> {
        input.validate()?;
        self.ensure_project(input.project_id.as_deref()).await?;

        let now = Utc::now();
        let record = FinancialRecord {
            id: self.db().generate_id(PREFIX_FINANCIAL).await?,
            org_id: self.org_id().to_string(),
            project_id: input.project_id.clone(),
            month: input.month,
            category: input.category,
            amount: input.amount,
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };

        let params: Vec<libsql::Value> = vec![
            record.id.clone().into(),
            record.org_id.clone().into(),
            opt_text(record.project_id.as_deref()),
            record.month.to_string().into(),
            record.category.as_str().into(),
            record.amount.into(),
            opt_text(record.description.as_deref()),
            now.to_rfc3339().into(),
            now.to_rfc3339().into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO financial_records ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        self.audit(
            EntityType::FinancialRecord,
            &record.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        tracing::info!(
            id = %record.id,
            month = %record.month,
            category = %record.category,
            amount = record.amount,
            "financial record booked"
        );
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such record exists in the tenant.
    pub async fn get_financial_record(&self, id: &str) -> Result<FinancialRecord, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {SELECT_COLS} FROM financial_records WHERE id = ?1 AND org_id = ?2"
                ),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::FinancialRecord, id))?;
        row_to_record(&row)
    }

    /// List records, most recent month first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_financial_records(
        &self,
        filter: &FinancialFilter,
    ) -> Result<Vec<FinancialRecord>, DatabaseError> {
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
        if let Some(category) = filter.category {
            params.push(category.as_str().into());
            conditions.push(format!("category = ?{}", params.len()));
        }
        let limit = filter
            .limit
            .map_or_else(String::new, |n| format!(" LIMIT {n}"));
        let sql = format!(
            "SELECT {SELECT_COLS} FROM financial_records WHERE {}
             ORDER BY month DESC, created_at DESC{limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_record(&row)?);
        }
        Ok(records)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input, `NotFound` if the
    /// record or a newly referenced project does not exist.
    pub async fn update_financial_record(
        &self,
        id: &str,
        update: &FinancialUpdate,
    ) -> Result<FinancialRecord, DatabaseError> {
        update.validate()?;
        let current = self.get_financial_record(id).await?;
        if let Some(ref project_id) = update.project_id {
            self.ensure_project(project_id.as_deref()).await?;
        }

        let mut a = Assignments::default();
        if let Some(ref project_id) = update.project_id {
            a.set_opt("project_id", project_id.clone());
        }
        if let Some(month) = update.month {
            a.set("month", month.to_string());
        }
        if let Some(category) = update.category {
            a.set("category", category.as_str());
        }
        if let Some(amount) = update.amount {
            a.set("amount", amount);
        }
        if let Some(ref description) = update.description {
            a.set_opt("description", description.clone());
        }
        if a.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        let (sql, params) =
            a.into_update("financial_records", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.audit(
            EntityType::FinancialRecord,
            id,
            AuditAction::Updated,
            Some(serde_json::to_value(update)?),
        )
        .await?;
        self.get_financial_record(id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the record does not exist.
    pub async fn delete_financial_record(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .execute_with(
                "DELETE FROM financial_records WHERE id = ?1 AND org_id = ?2",
                || [id, self.org_id()],
            )
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::FinancialRecord, id));
        }
        self.audit(EntityType::FinancialRecord, id, AuditAction::Deleted, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_project, test_service, two_tenants};
    use crate::updates::FinancialUpdateBuilder;

    fn booking(month: &str, category: FinancialCategory, amount: f64) -> NewFinancialRecord {
        NewFinancialRecord {
            project_id: None,
            month: month.parse().unwrap(),
            category,
            amount,
            description: None,
        }
    }

    #[tokio::test]
    async fn create_and_filter_by_month_and_project() {
        let svc = test_service().await;
        let p = seed_project(&svc, "Relaunch").await;
        svc.create_financial_record(&NewFinancialRecord {
            project_id: Some(p.id.clone()),
            ..booking("2026-05", FinancialCategory::Revenue, 10_000.0)
        })
        .await
        .unwrap();
        svc.create_financial_record(&booking("2026-05", FinancialCategory::Opex, 2_000.0))
            .await
            .unwrap();
        svc.create_financial_record(&booking("2026-04", FinancialCategory::Opex, 1_500.0))
            .await
            .unwrap();

        let may = svc
            .list_financial_records(&FinancialFilter {
                month: Some("2026-05".parse().unwrap()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(may.len(), 2);

        let by_project = svc
            .list_financial_records(&FinancialFilter {
                project_id: Some(p.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_project.len(), 1);
        assert_eq!(by_project[0].category, FinancialCategory::Revenue);

        let all = svc
            .list_financial_records(&FinancialFilter::default())
            .await
            .unwrap();
        assert_eq!(all.last().unwrap().month.to_string(), "2026-04");
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_financial_record(&booking("2026-05", FinancialCategory::Cogs, -1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn project_from_another_tenant_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_tenants(dir.path()).await;
        let p = seed_project(&a, "Secret").await;
        let err = b
            .create_financial_record(&NewFinancialRecord {
                project_id: Some(p.id),
                ..booking("2026-05", FinancialCategory::Revenue, 1.0)
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_and_delete() {
        let svc = test_service().await;
        let r = svc
            .create_financial_record(&booking("2026-05", FinancialCategory::Opex, 2_000.0))
            .await
            .unwrap();
        let updated = svc
            .update_financial_record(
                &r.id,
                &FinancialUpdateBuilder::new()
                    .amount(2_500.0)
                    .description(Some("licences".into()))
                    .build(),
            )
            .await
            .unwrap();
        assert!((updated.amount - 2_500.0).abs() < f64::EPSILON);
        assert_eq!(updated.description.as_deref(), Some("licences"));

        svc.delete_financial_record(&r.id).await.unwrap();
        assert!(svc.get_financial_record(&r.id).await.unwrap_err().is_not_found());
    }
}
