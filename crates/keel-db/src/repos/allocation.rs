//! Allocation repository: upsert by (member, month, cost type), listing,
//! removal, and monthly utilization.

use chrono::Utc;
use keel_core::analytics::{MemberUtilization, utilization};
use keel_core::audit_detail::AllocationUpsertDetail;
use keel_core::entities::{Allocation, NewAllocation, UpsertOutcome};
use keel_core::enums::{AuditAction, EntityType};
use keel_core::ids::PREFIX_ALLOCATION;
use keel_core::month::Month;
use keel_core::responses::AllocationUpsertResponse;
use keel_core::validation::Validate;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, opt_text, parse_datetime, parse_enum, parse_month};
use crate::repos::audit::append_audit_on;
use crate::service::KeelService;

const SELECT_COLS: &str = "id, org_id, team_member_id, project_id, month, cost_type, percentage, \
                           created_at, updated_at";

/// Filter criteria for listing allocations.
#[derive(Debug, Default)]
pub struct AllocationFilter {
    pub month: Option<Month>,
    pub team_member_id: Option<String>,
    pub project_id: Option<String>,
}

fn row_to_allocation(row: &libsql::Row) -> Result<Allocation, DatabaseError> {
    Ok(Allocation {
        id: row.get(0)?,
        org_id: row.get(1)?,
        team_member_id: row.get(2)?,
        project_id: get_opt_string(row, 3)?,
        month: parse_month(&row.get::<String>(4)?)?,
        cost_type: parse_enum(&row.get::<String>(5)?)?,
        percentage: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl KeelService {
    /// Set a member's allocation for a month and cost type.
    ///
    /// If an allocation with the same (member, month, cost type) exists it is
    /// updated in place; otherwise a new one is inserted. The lookup, the
    /// write, and the audit entry run in one transaction, and the unique index
    /// on the key rejects a concurrent duplicate insert.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input and `NotFound`
    /// when the member or project is not in the tenant.
    pub async fn upsert_allocation(
        &self,
        input: &NewAllocation,
    ) -> Result<AllocationUpsertResponse, DatabaseError> {
        input.validate()?;
        self.ensure_member(Some(&input.team_member_id)).await?;
        self.ensure_project(input.project_id.as_deref()).await?;

        let month = input.month.to_string();
        let now = Utc::now();
        let tx = self.db().conn().transaction().await?;

        let mut rows = tx
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM allocations
                     WHERE org_id = ?1 AND team_member_id = ?2 AND month = ?3 AND cost_type = ?4"
                ),
                [
                    self.org_id(),
                    input.team_member_id.as_str(),
                    month.as_str(),
                    input.cost_type.as_str(),
                ],
            )
            .await?;
        let existing = match rows.next().await? {
            Some(row) => Some(row_to_allocation(&row)?),
            None => None,
        };
        drop(rows);

        let (outcome, allocation, previous_percentage) = match existing {
            Some(current) => {
                tx.execute(
                    "UPDATE allocations SET project_id = ?1, percentage = ?2, updated_at = ?3
                     WHERE id = ?4 AND org_id = ?5",
                    libsql::params![
                        opt_text(input.project_id.as_deref()),
                        input.percentage,
                        now.to_rfc3339(),
                        current.id.as_str(),
                        self.org_id()
                    ],
                )
                .await?;
                let previous = current.percentage;
                let updated = Allocation {
                    project_id: input.project_id.clone(),
                    percentage: input.percentage,
                    updated_at: now,
                    ..current
                };
                (UpsertOutcome::Updated, updated, Some(previous))
            }
            None => {
                let allocation = Allocation {
                    id: self.db().generate_id(PREFIX_ALLOCATION).await?,
                    org_id: self.org_id().to_string(),
                    team_member_id: input.team_member_id.clone(),
                    project_id: input.project_id.clone(),
                    month: input.month,
                    cost_type: input.cost_type,
                    percentage: input.percentage,
                    created_at: now,
                    updated_at: now,
                };
                tx.execute(
                    &format!(
                        "INSERT INTO allocations ({SELECT_COLS})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                    ),
                    libsql::params![
                        allocation.id.as_str(),
                        allocation.org_id.as_str(),
                        allocation.team_member_id.as_str(),
                        opt_text(allocation.project_id.as_deref()),
                        month.as_str(),
                        allocation.cost_type.as_str(),
                        allocation.percentage,
                        now.to_rfc3339(),
                        now.to_rfc3339()
                    ],
                )
                .await?;
                (UpsertOutcome::Created, allocation, None)
            }
        };

        let detail = AllocationUpsertDetail {
            outcome,
            previous_percentage,
            percentage: allocation.percentage,
        };
        let entry = self
            .audit_entry(
                EntityType::Allocation,
                &allocation.id,
                AuditAction::Upserted,
                Some(serde_json::to_value(&detail)?),
            )
            .await?;
        append_audit_on(&tx, &entry).await?;
        tx.commit().await?;

        tracing::info!(
            id = %allocation.id,
            member = %allocation.team_member_id,
            month = %allocation.month,
            cost_type = %allocation.cost_type,
            percentage = allocation.percentage,
            ?outcome,
            "allocation set"
        );
        self.warn_if_over_allocated(&allocation.team_member_id, input.month)
            .await?;
        Ok(AllocationUpsertResponse {
            outcome,
            allocation,
        })
    }

    async fn warn_if_over_allocated(&self, member_id: &str, month: Month) -> Result<(), DatabaseError> {
        let month_str = month.to_string();
        let mut rows = self
            .db()
            .query_with(
                "SELECT COALESCE(SUM(percentage), 0) FROM allocations
                 WHERE org_id = ?1 AND team_member_id = ?2 AND month = ?3",
                || [self.org_id(), member_id, month_str.as_str()],
            )
            .await?;
        if let Some(row) = rows.next().await? {
            let total: f64 = row.get(0)?;
            if total > 100.0 {
                tracing::warn!(member = member_id, %month, total, "member is over-allocated");
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such allocation exists in the tenant.
    pub async fn get_allocation(&self, id: &str) -> Result<Allocation, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM allocations WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Allocation, id))?;
        row_to_allocation(&row)
    }

    /// List allocations ordered by month, member, then cost type.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_allocations(
        &self,
        filter: &AllocationFilter,
    ) -> Result<Vec<Allocation>, DatabaseError> {
        let mut conditions = vec!["org_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];
        if let Some(month) = filter.month {
            params.push(month.to_string().into());
            conditions.push(format!("month = ?{}", params.len()));
        }
        if let Some(ref member) = filter.team_member_id {
            params.push(member.clone().into());
            conditions.push(format!("team_member_id = ?{}", params.len()));
        }
        if let Some(ref project) = filter.project_id {
            params.push(project.clone().into());
            conditions.push(format!("project_id = ?{}", params.len()));
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM allocations WHERE {}
             ORDER BY month, team_member_id, cost_type",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut allocations = Vec::new();
        while let Some(row) = rows.next().await? {
            allocations.push(row_to_allocation(&row)?);
        }
        Ok(allocations)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the allocation does not exist.
    pub async fn delete_allocation(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .execute_with("DELETE FROM allocations WHERE id = ?1 AND org_id = ?2", || {
                [id, self.org_id()]
            })
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::Allocation, id));
        }
        self.audit(EntityType::Allocation, id, AuditAction::Deleted, None)
            .await
    }

    /// Per-member allocation totals for `month`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn member_utilization(
        &self,
        month: Month,
    ) -> Result<Vec<MemberUtilization>, DatabaseError> {
        let allocations = self
            .list_allocations(&AllocationFilter {
                month: Some(month),
                ..Default::default()
            })
            .await?;
        let members = self.list_team_members(true).await?;
        Ok(utilization(month, &allocations, &members))
    }
}
