//! The monthly dashboard: every analytics roll-up for one tenant and month.

use keel_core::analytics::{csat_summary, financial_summary, pipeline_summary, utilization};
use keel_core::month::Month;
use keel_core::responses::Dashboard;

use crate::error::DatabaseError;
use crate::repos::{AllocationFilter, CsatFilter, FinancialFilter};
use crate::service::KeelService;

impl KeelService {
    /// Build the dashboard for `month`.
    ///
    /// Project counts and the lead pipeline are point-in-time and ignore the
    /// month; financials, CSAT, and utilization cover `month` only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any underlying query fails.
    pub async fn dashboard(&self, month: Month) -> Result<Dashboard, DatabaseError> {
        let projects = self.project_counts().await?;
        let leads = self.list_leads(None, None).await?;
        let records = self
            .list_financial_records(&FinancialFilter {
                month: Some(month),
                ..FinancialFilter::default()
            })
            .await?;
        let allocations = self
            .list_allocations(&AllocationFilter {
                month: Some(month),
                ..AllocationFilter::default()
            })
            .await?;
        let members = self.list_team_members(true).await?;
        let csat = self
            .list_csat_entries(&CsatFilter {
                month: Some(month),
                ..CsatFilter::default()
            })
            .await?;

        tracing::debug!(
            %month,
            leads = leads.len(),
            records = records.len(),
            allocations = allocations.len(),
            "dashboard inputs loaded"
        );

        Ok(Dashboard {
            month,
            projects,
            pipeline: pipeline_summary(&leads),
            financials: financial_summary(month, &records, &allocations, &members),
            csat: csat_summary(&csat),
            utilization: utilization(month, &allocations, &members),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_member, seed_project, test_service, two_tenants};
    use keel_core::entities::{NewAllocation, NewCsatEntry, NewFinancialRecord, NewLead};
    use keel_core::enums::{CostType, FinancialCategory, LeadStage, ProjectStatus};
    use pretty_assertions::assert_eq;

    fn month(raw: &str) -> Month {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn empty_tenant_has_zeroed_dashboard() {
        let svc = test_service().await;
        let d = svc.dashboard(month("2026-05")).await.unwrap();
        assert_eq!(d.projects.active, 0);
        assert_eq!(d.pipeline.open_count, 0);
        assert_eq!(d.pipeline.win_rate, None);
        assert_eq!(d.financials.net_profit, 0.0);
        assert_eq!(d.csat.count, 0);
        assert!(d.utilization.is_empty());
    }

    #[tokio::test]
    async fn rolls_up_the_month() {
        let svc = test_service().await;
        let may = month("2026-05");
        let p = seed_project(&svc, "Apollo").await;
        svc.transition_project(&p.id, ProjectStatus::Active, None)
            .await
            .unwrap();
        let m = seed_member(&svc, "Bea", 8000.0).await;

        for (m_raw, category, amount) in [
            ("2026-05", FinancialCategory::Revenue, 20_000.0),
            ("2026-05", FinancialCategory::Opex, 1_000.0),
            ("2026-04", FinancialCategory::Revenue, 99_999.0),
        ] {
            svc.create_financial_record(&NewFinancialRecord {
                project_id: Some(p.id.clone()),
                month: month(m_raw),
                category,
                amount,
                description: None,
            })
            .await
            .unwrap();
        }
        svc.upsert_allocation(&NewAllocation {
            team_member_id: m.id.clone(),
            project_id: Some(p.id.clone()),
            month: may,
            cost_type: CostType::Cogs,
            percentage: 50.0,
        })
        .await
        .unwrap();
        svc.create_csat_entry(&NewCsatEntry {
            project_id: p.id.clone(),
            month: may,
            score: 90.0,
            respondent: None,
            comment: None,
        })
        .await
        .unwrap();
        svc.create_lead(&NewLead {
            company: "Initech".into(),
            stage: Some(LeadStage::Proposal),
            value: 10_000.0,
            ..NewLead::default()
        })
        .await
        .unwrap();

        let d = svc.dashboard(may).await.unwrap();
        assert_eq!(d.month, may);
        assert_eq!(d.projects.active, 1);
        assert_eq!(d.pipeline.open_count, 1);
        assert_eq!(d.financials.revenue, 20_000.0);
        assert_eq!(d.financials.team_cogs, 4_000.0);
        assert_eq!(d.financials.gross_profit, 16_000.0);
        assert_eq!(d.financials.net_profit, 15_000.0);
        assert_eq!(d.csat.average, Some(90.0));
        assert_eq!(d.utilization.len(), 1);
        assert_eq!(d.utilization[0].total_pct, 50.0);
    }

    #[tokio::test]
    async fn tenants_see_only_their_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = two_tenants(dir.path()).await;
        let may = month("2026-05");
        a.create_financial_record(&NewFinancialRecord {
            project_id: None,
            month: may,
            category: FinancialCategory::Revenue,
            amount: 500.0,
            description: None,
        })
        .await
        .unwrap();
        seed_member(&a, "Bea", 1000.0).await;

        let d = b.dashboard(may).await.unwrap();
        assert_eq!(d.financials.revenue, 0.0);
        assert!(d.utilization.is_empty());
    }
}
