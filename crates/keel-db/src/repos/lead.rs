//! Lead repository: CRUD, pipeline transitions, FTS search, JSONL/CSV
//! import, and JSONL export.

use std::path::Path;

use chrono::Utc;
use keel_core::audit_detail::{ImportedDetail, StatusChangedDetail};
use keel_core::entities::{Lead, NewLead};
use keel_core::enums::{AuditAction, EntityType, LeadStage};
use keel_core::ids::PREFIX_LEAD;
use keel_core::responses::{ImportRejection, ImportReport};
use keel_core::validation::Validate;
use serde_jsonlines::write_json_lines;

use crate::error::DatabaseError;
use crate::helpers::{
    fts_query, get_opt_string, get_u8, opt_date, opt_text, parse_datetime, parse_enum,
    parse_optional_date,
};
use crate::import::{ImportFormat, read_records};
use crate::repos::audit::append_audit_on;
use crate::service::KeelService;
use crate::updates::Assignments;
use crate::updates::lead::LeadUpdate;

const SELECT_COLS: &str = "id, org_id, company, contact_name, contact_email, stage, value, \
                           probability, owner, expected_close, notes, created_at, updated_at";

const INSERT_SQL: &str = "INSERT INTO leads
     (id, org_id, company, contact_name, contact_email, stage, value, probability, owner,
      expected_close, notes, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

fn row_to_lead(row: &libsql::Row) -> Result<Lead, DatabaseError> {
    Ok(Lead {
        id: row.get(0)?,
        org_id: row.get(1)?,
        company: row.get(2)?,
        contact_name: get_opt_string(row, 3)?,
        contact_email: get_opt_string(row, 4)?,
        stage: parse_enum(&row.get::<String>(5)?)?,
        value: row.get(6)?,
        probability: get_u8(row, 7)?,
        owner: get_opt_string(row, 8)?,
        expected_close: parse_optional_date(get_opt_string(row, 9)?.as_deref())?,
        notes: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

fn lead_params(lead: &Lead) -> Vec<libsql::Value> {
    vec![
        lead.id.clone().into(),
        lead.org_id.clone().into(),
        lead.company.clone().into(),
        opt_text(lead.contact_name.as_deref()),
        opt_text(lead.contact_email.as_deref()),
        lead.stage.as_str().into(),
        lead.value.into(),
        i64::from(lead.probability).into(),
        opt_text(lead.owner.as_deref()),
        opt_date(lead.expected_close),
        opt_text(lead.notes.as_deref()),
        lead.created_at.to_rfc3339().into(),
        lead.updated_at.to_rfc3339().into(),
    ]
}

/// Probability a lead takes on entering `stage`, if the stage fixes it.
const fn stage_probability(stage: LeadStage) -> Option<u8> {
    match stage {
        LeadStage::Won => Some(100),
        LeadStage::Lost => Some(0),
        _ => None,
    }
}

impl KeelService {
    async fn build_lead(&self, input: &NewLead) -> Result<Lead, DatabaseError> {
        let now = Utc::now();
        let stage = input.stage.unwrap_or(LeadStage::New);
        Ok(Lead {
            id: self.db().generate_id(PREFIX_LEAD).await?,
            org_id: self.org_id().to_string(),
            company: input.company.trim().to_string(),
            contact_name: input.contact_name.clone(),
            contact_email: input.contact_email.clone(),
            stage,
            value: input.value,
            probability: stage_probability(stage)
                .or(input.probability)
                .unwrap_or(0),
            owner: input.owner.clone(),
            expected_close: input.expected_close,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input.
    pub async fn create_lead(&self, input: &NewLead) -> Result<Lead, DatabaseError> {
        input.validate()?;
        let lead = self.build_lead(input).await?;
        let params = lead_params(&lead);
        self.db()
            .execute_with(INSERT_SQL, || libsql::params_from_iter(params.clone()))
            .await?;

        self.audit(
            EntityType::Lead,
            &lead.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        tracing::info!(id = %lead.id, company = %lead.company, "lead created");
        Ok(lead)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such lead exists in the tenant.
    pub async fn get_lead(&self, id: &str) -> Result<Lead, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM leads WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Lead, id))?;
        row_to_lead(&row)
    }

    /// List leads, optionally in one stage, newest first. `limit = None`
    /// returns every lead.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_leads(
        &self,
        stage: Option<LeadStage>,
        limit: Option<u32>,
    ) -> Result<Vec<Lead>, DatabaseError> {
        let mut sql = format!("SELECT {SELECT_COLS} FROM leads WHERE org_id = ?1");
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];
        if let Some(stage) = stage {
            params.push(stage.as_str().into());
            sql.push_str(&format!(" AND stage = ?{}", params.len()));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next().await? {
            leads.push(row_to_lead(&row)?);
        }
        Ok(leads)
    }

    /// Apply a partial update. Stage changes go through [`Self::transition_lead`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input, `NotFound` if the
    /// lead does not exist, and `InvalidState` when the update would change
    /// the probability of a won or lost lead.
    pub async fn update_lead(&self, id: &str, update: &LeadUpdate) -> Result<Lead, DatabaseError> {
        update.validate()?;
        let current = self.get_lead(id).await?;
        if let (Some(requested), Some(fixed)) = (update.probability, stage_probability(current.stage)) {
            if requested != fixed {
                return Err(DatabaseError::InvalidState(format!(
                    "Lead {id} is {}; its probability stays at {fixed}",
                    current.stage
                )));
            }
        }

        let mut a = Assignments::default();
        if let Some(ref company) = update.company {
            a.set("company", company.trim().to_string());
        }
        if let Some(ref name) = update.contact_name {
            a.set_opt("contact_name", name.clone());
        }
        if let Some(ref email) = update.contact_email {
            a.set_opt("contact_email", email.clone());
        }
        if let Some(value) = update.value {
            a.set("value", value);
        }
        if let Some(probability) = update.probability {
            a.set("probability", i64::from(probability));
        }
        if let Some(ref owner) = update.owner {
            a.set_opt("owner", owner.clone());
        }
        if let Some(date) = update.expected_close {
            a.set("expected_close", opt_date(date));
        }
        if let Some(ref notes) = update.notes {
            a.set_opt("notes", notes.clone());
        }
        if a.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        let (sql, params) = a.into_update("leads", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        self.audit(
            EntityType::Lead,
            id,
            AuditAction::Updated,
            Some(serde_json::to_value(update)?),
        )
        .await?;
        self.get_lead(id).await
    }

    /// Move a lead through the pipeline. Winning sets probability to 100,
    /// losing sets it to 0.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the transition is not allowed.
    pub async fn transition_lead(
        &self,
        id: &str,
        to: LeadStage,
        reason: Option<&str>,
    ) -> Result<Lead, DatabaseError> {
        let current = self.get_lead(id).await?;
        current.stage.check_transition(to, id)?;

        let now = Utc::now();
        let mut a = Assignments::default();
        a.set("stage", to.as_str());
        if let Some(probability) = stage_probability(to) {
            a.set("probability", i64::from(probability));
        }
        let (sql, params) = a.into_update("leads", id, self.org_id(), &now.to_rfc3339());
        self.db()
            .execute_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let detail = StatusChangedDetail {
            from: current.stage.as_str().to_string(),
            to: to.as_str().to_string(),
            reason: reason.map(String::from),
        };
        self.audit(
            EntityType::Lead,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
        )
        .await?;
        tracing::info!(id, from = %current.stage, %to, "lead stage changed");
        self.get_lead(id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the lead does not exist.
    pub async fn delete_lead(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .execute_with("DELETE FROM leads WHERE id = ?1 AND org_id = ?2", || {
                [id, self.org_id()]
            })
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::Lead, id));
        }
        self.audit(EntityType::Lead, id, AuditAction::Deleted, None)
            .await
    }

    /// Full-text search over company, contact name, and notes, best match first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn search_leads(&self, query: &str, limit: u32) -> Result<Vec<Lead>, DatabaseError> {
        let Some(fts) = fts_query(query) else {
            return Ok(Vec::new());
        };
        let cols = SELECT_COLS
            .split(", ")
            .map(|c| format!("l.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {cols} FROM leads_fts
             JOIN leads l ON l.rowid = leads_fts.rowid
             WHERE leads_fts MATCH ?1 AND l.org_id = ?2
             ORDER BY rank LIMIT ?3"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params![fts.as_str(), self.org_id(), limit])
            .await?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next().await? {
            leads.push(row_to_lead(&row)?);
        }
        Ok(leads)
    }

    /// Import leads from a JSON Lines file (one `new_lead` object per line)
    /// or a CSV file with a header row naming `new_lead` fields. The format
    /// follows the file extension.
    ///
    /// Every record is checked against the `new_lead` schema and field
    /// validation. Records that fail are reported and skipped; the rest are
    /// written in a single transaction, each with an `imported` audit entry.
    /// `on_line` is called after each record is checked.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file cannot be opened or the write
    /// fails. A failed write leaves no imported rows behind.
    pub async fn import_leads(
        &self,
        path: &Path,
        mut on_line: impl FnMut(u32),
    ) -> Result<ImportReport, DatabaseError> {
        let source = path.display().to_string();
        let records = read_records(path, ImportFormat::from_path(path))?;

        let mut accepted: Vec<(u32, NewLead)> = Vec::new();
        let mut report = ImportReport::default();
        for record in records {
            let line_no = record.line;
            let checked = record
                .value
                .and_then(|value| {
                    self.schema()
                        .parse::<NewLead>("new_lead", value)
                        .map_err(|e| e.to_string())
                })
                .and_then(|input| input.validate().map(|()| input).map_err(|e| e.to_string()));
            match checked {
                Ok(input) => accepted.push((line_no, input)),
                Err(error) => {
                    tracing::debug!(line = line_no, %error, "lead import line rejected");
                    report.rejected.push(ImportRejection {
                        line: line_no,
                        error,
                    });
                }
            }
            on_line(line_no);
        }

        if accepted.is_empty() {
            return Ok(report);
        }

        let tx = self.db().conn().transaction().await?;
        for (line, input) in &accepted {
            let lead = self.build_lead(input).await?;
            tx.execute(INSERT_SQL, libsql::params_from_iter(lead_params(&lead)))
                .await?;
            let detail = ImportedDetail {
                source: source.clone(),
                line: *line,
            };
            let entry = self
                .audit_entry(
                    EntityType::Lead,
                    &lead.id,
                    AuditAction::Imported,
                    Some(serde_json::to_value(&detail)?),
                )
                .await?;
            append_audit_on(&tx, &entry).await?;
            report.imported.push(lead);
        }
        tx.commit().await?;

        tracing::info!(
            source = %source,
            imported = report.imported.len(),
            rejected = report.rejected.len(),
            "lead import finished"
        );
        Ok(report)
    }

    /// Write every lead of the tenant to `path` as JSON Lines. Returns the
    /// number of leads written.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or the file write fails.
    pub async fn export_leads(&self, path: &Path) -> Result<usize, DatabaseError> {
        let leads = self.list_leads(None, None).await?;
        write_json_lines(path, &leads).map_err(|e| {
            DatabaseError::Other(anyhow::anyhow!("cannot write {}: {e}", path.display()))
        })?;
        Ok(leads.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::AuditFilter;
    use crate::test_support::helpers::{test_service, two_tenants};
    use crate::updates::LeadUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_defaults_to_new_stage() {
        let svc = test_service().await;
        let lead = svc
            .create_lead(&NewLead {
                value: 12_000.0,
                probability: Some(20),
                ..NewLead::for_company("Initech")
            })
            .await
            .unwrap();
        assert!(lead.id.starts_with("led-"));
        assert_eq!(lead.stage, LeadStage::New);
        assert_eq!(svc.get_lead(&lead.id).await.unwrap(), lead);
    }

    #[tokio::test]
    async fn won_lead_gets_full_probability() {
        let svc = test_service().await;
        let lead = svc
            .create_lead(&NewLead {
                stage: Some(LeadStage::Negotiation),
                probability: Some(60),
                ..NewLead::for_company("Initech")
            })
            .await
            .unwrap();
        let won = svc
            .transition_lead(&lead.id, LeadStage::Won, Some("signed"))
            .await
            .unwrap();
        assert_eq!(won.stage, LeadStage::Won);
        assert_eq!(won.probability, 100);

        let err = svc
            .transition_lead(&lead.id, LeadStage::Lost, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn closed_lead_probability_is_fixed() {
        let svc = test_service().await;
        let lead = svc
            .create_lead(&NewLead {
                stage: Some(LeadStage::Negotiation),
                probability: Some(70),
                ..NewLead::for_company("Initech")
            })
            .await
            .unwrap();
        svc.transition_lead(&lead.id, LeadStage::Lost, None)
            .await
            .unwrap();

        let err = svc
            .update_lead(&lead.id, &LeadUpdateBuilder::new().probability(40).build())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert_eq!(svc.get_lead(&lead.id).await.unwrap().probability, 0);

        let updated = svc
            .update_lead(
                &lead.id,
                &LeadUpdateBuilder::new().probability(0).value(800.0).build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.value, 800.0);

        let won = svc
            .create_lead(&NewLead {
                stage: Some(LeadStage::Won),
                probability: Some(30),
                ..NewLead::for_company("Globex")
            })
            .await
            .unwrap();
        assert_eq!(won.probability, 100);
    }

    #[tokio::test]
    async fn cannot_skip_pipeline_stages() {
        let svc = test_service().await;
        let lead = svc.create_lead(&NewLead::for_company("Initech")).await.unwrap();
        let err = svc
            .transition_lead(&lead.id, LeadStage::Proposal, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn search_matches_notes_and_respects_tenant() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_tenants(dir.path()).await;
        a.create_lead(&NewLead {
            notes: Some("Needs a cloud migration roadmap".into()),
            ..NewLead::for_company("Initech")
        })
        .await
        .unwrap();
        a.create_lead(&NewLead::for_company("Globex")).await.unwrap();
        b.create_lead(&NewLead {
            notes: Some("Also wants a migration".into()),
            ..NewLead::for_company("Umbrella")
        })
        .await
        .unwrap();

        let hits = a.search_leads("migration", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].company, "Initech");
        assert!(a.search_leads("   ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_sees_updates() {
        let svc = test_service().await;
        let lead = svc.create_lead(&NewLead::for_company("Initech")).await.unwrap();
        svc.update_lead(
            &lead.id,
            &LeadUpdateBuilder::new()
                .notes(Some("interested in staffing".into()))
                .build(),
        )
        .await
        .unwrap();
        assert_eq!(svc.search_leads("staffing", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn import_reports_rejected_lines() {
        let svc = test_service().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"company":"Acme","value":1200,"probability":30}"#,
                "\n",
                r#"{"value":50}"#,
                "\n",
                r#"{"company":"Globex","contact_email":"not-an-email"}"#,
                "\n",
                r#"{"company":"Hooli","stage":"proposal"}"#,
                "\n",
            ),
        )
        .unwrap();

        let mut seen = Vec::new();
        let report = svc.import_leads(&path, |line| seen.push(line)).await.unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4]);

        let companies: Vec<_> = report.imported.iter().map(|l| l.company.as_str()).collect();
        assert_eq!(companies, vec!["Acme", "Hooli"]);
        let rejected: Vec<_> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(rejected, vec![2, 3]);
        assert!(report.rejected[1].error.contains("contact_email"));

        assert_eq!(svc.list_leads(None, None).await.unwrap().len(), 2);
        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Imported),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 2);
    }

    #[tokio::test]
    async fn csv_import_skips_bad_rows() {
        let svc = test_service().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.csv");
        std::fs::write(
            &path,
            "company,contact_email,stage,value,probability,expected_close\n\
             Acme,ana@acme.test,qualified,1200,40,2026-11-30\n\
             Globex,not-an-email,new,500,,\n\
             Initech,,proposal,9000,60,\n\
             ,,new,10,,\n\
             Hooli,,negotiation,many,,\n",
        )
        .unwrap();

        let mut seen = Vec::new();
        let report = svc.import_leads(&path, |line| seen.push(line)).await.unwrap();
        assert_eq!(seen, vec![2, 3, 4, 5, 6]);

        let companies: Vec<_> = report.imported.iter().map(|l| l.company.as_str()).collect();
        assert_eq!(companies, vec!["Acme", "Initech"]);
        assert_eq!(report.imported[0].stage, LeadStage::Qualified);
        assert_eq!(report.imported[0].probability, 40);
        assert_eq!(
            report.imported[0].expected_close,
            chrono::NaiveDate::from_ymd_opt(2026, 11, 30)
        );

        let rejected: Vec<_> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(rejected, vec![3, 5, 6]);
        assert!(report.rejected[0].error.contains("contact_email"));
        assert!(report.rejected[2].error.contains("value must be a number"));
        assert_eq!(svc.list_leads(None, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn export_then_import_copies_leads() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_tenants(dir.path()).await;
        a.create_lead(&NewLead {
            value: 5_000.0,
            ..NewLead::for_company("Initech")
        })
        .await
        .unwrap();

        let path = dir.path().join("export.jsonl");
        assert_eq!(a.export_leads(&path).await.unwrap(), 1);

        let report = b.import_leads(&path, |_| {}).await.unwrap();
        assert!(report.rejected.is_empty());
        assert_eq!(report.imported[0].company, "Initech");
        assert_eq!(report.imported[0].org_id, "org_b");
    }

    #[tokio::test]
    async fn missing_import_file_is_an_error() {
        let svc = test_service().await;
        let result = svc
            .import_leads(Path::new("/nonexistent/leads.jsonl"), |_| {})
            .await;
        assert!(result.is_err());
    }
}
