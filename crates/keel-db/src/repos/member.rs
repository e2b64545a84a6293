//! Team member repository.

use chrono::Utc;
use keel_core::entities::{NewTeamMember, TeamMember};
use keel_core::enums::{AuditAction, EntityType};
use keel_core::ids::PREFIX_MEMBER;
use keel_core::validation::Validate;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, opt_text, parse_datetime};
use crate::service::KeelService;
use crate::updates::Assignments;
use crate::updates::member::MemberUpdate;

const SELECT_COLS: &str =
    "id, org_id, name, email, role, monthly_cost, active, created_at, updated_at";

fn row_to_member(row: &libsql::Row) -> Result<TeamMember, DatabaseError> {
    Ok(TeamMember {
        id: row.get(0)?,
        org_id: row.get(1)?,
        name: row.get(2)?,
        email: get_opt_string(row, 3)?,
        role: get_opt_string(row, 4)?,
        monthly_cost: row.get(5)?,
        active: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl KeelService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input.
    pub async fn create_team_member(
        &self,
        input: &NewTeamMember,
    ) -> Result<TeamMember, DatabaseError> {
        input.validate()?;
        let now = Utc::now();
        let member = TeamMember {
            id: self.db().generate_id(PREFIX_MEMBER).await?,
            org_id: self.org_id().to_string(),
            name: input.name.trim().to_string(),
            email: input.email.clone(),
            role: input.role.clone(),
            monthly_cost: input.monthly_cost,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let params: Vec<libsql::Value> = vec![
            member.id.clone().into(),
            member.org_id.clone().into(),
            member.name.clone().into(),
            opt_text(member.email.as_deref()),
            opt_text(member.role.as_deref()),
            member.monthly_cost.into(),
            1_i64.into(),
            now.to_rfc3339().into(),
            now.to_rfc3339().into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO team_members ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        self.audit(
            EntityType::TeamMember,
            &member.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        tracing::info!(id = %member.id, name = %member.name, "team member created");
        Ok(member)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such member exists in the tenant.
    pub async fn get_team_member(&self, id: &str) -> Result<TeamMember, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM team_members WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::TeamMember, id))?;
        row_to_member(&row)
    }

    /// List members ordered by name. Inactive members are skipped unless asked for.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_team_members(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<TeamMember>, DatabaseError> {
        let active_clause = if include_inactive { "" } else { " AND active = 1" };
        let sql = format!(
            "SELECT {SELECT_COLS} FROM team_members WHERE org_id = ?1{active_clause}
             ORDER BY name, id"
        );
        let mut rows = self.db().query_with(&sql, || [self.org_id()]).await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row_to_member(&row)?);
        }
        Ok(members)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input, `NotFound` if the
    /// member does not exist.
    pub async fn update_team_member(
        &self,
        id: &str,
        update: &MemberUpdate,
    ) -> Result<TeamMember, DatabaseError> {
        update.validate()?;
        let current = self.get_team_member(id).await?;

        let mut a = Assignments::default();
        if let Some(ref name) = update.name {
            a.set("name", name.trim().to_string());
        }
        if let Some(ref email) = update.email {
            a.set_opt("email", email.clone());
        }
        if let Some(ref role) = update.role {
            a.set_opt("role", role.clone());
        }
        if let Some(cost) = update.monthly_cost {
            a.set("monthly_cost", cost);
        }
        if let Some(active) = update.active {
            a.set("active", i64::from(active));
        }
        if a.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        let (sql, params) = a.into_update("team_members", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.audit(
            EntityType::TeamMember,
            id,
            AuditAction::Updated,
            Some(serde_json::to_value(update)?),
        )
        .await?;
        self.get_team_member(id).await
    }

    /// Delete a member together with their allocations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the member does not exist.
    pub async fn delete_team_member(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .execute_with(
                "DELETE FROM team_members WHERE id = ?1 AND org_id = ?2",
                || [id, self.org_id()],
            )
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::TeamMember, id));
        }
        self.audit(EntityType::TeamMember, id, AuditAction::Deleted, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_member, test_service};
    use crate::updates::MemberUpdateBuilder;

    #[tokio::test]
    async fn create_and_list() {
        let svc = test_service().await;
        seed_member(&svc, "Zoe", 5_000.0).await;
        seed_member(&svc, "Ana", 6_000.0).await;

        let members = svc.list_team_members(false).await.unwrap();
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Zoe"]);
        assert!(members.iter().all(|m| m.active));
    }

    #[tokio::test]
    async fn rejects_bad_email_and_negative_cost() {
        let svc = test_service().await;
        let err = svc
            .create_team_member(&NewTeamMember {
                name: "Ana".into(),
                email: Some("ana-at-example".into()),
                monthly_cost: -1.0,
                ..NewTeamMember::default()
            })
            .await
            .unwrap_err();
        let DatabaseError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.has("email"));
        assert!(errors.has("monthly_cost"));
    }

    #[tokio::test]
    async fn deactivated_members_are_hidden_by_default() {
        let svc = test_service().await;
        let m = seed_member(&svc, "Ana", 6_000.0).await;
        let updated = svc
            .update_team_member(&m.id, &MemberUpdateBuilder::new().active(false).build())
            .await
            .unwrap();
        assert!(!updated.active);

        assert!(svc.list_team_members(false).await.unwrap().is_empty());
        assert_eq!(svc.list_team_members(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_update_is_a_no_op() {
        let svc = test_service().await;
        let m = seed_member(&svc, "Ana", 6_000.0).await;
        let same = svc
            .update_team_member(&m.id, &MemberUpdate::default())
            .await
            .unwrap();
        assert_eq!(same, m);
    }

    #[tokio::test]
    async fn delete_member() {
        let svc = test_service().await;
        let m = seed_member(&svc, "Ana", 6_000.0).await;
        svc.delete_team_member(&m.id).await.unwrap();
        assert!(svc.get_team_member(&m.id).await.unwrap_err().is_not_found());
    }
}
