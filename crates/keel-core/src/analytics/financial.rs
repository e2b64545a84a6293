use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{percent, round2};
use crate::entities::{Allocation, FinancialRecord, TeamMember};
use crate::enums::{CostType, FinancialCategory};
use crate::month::Month;

/// Profit and loss for one month.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FinancialSummary {
    pub month: Month,
    pub revenue: f64,
    pub opex: f64,
    pub cogs: f64,
    /// Team cost allocated as COGS.
    pub team_cogs: f64,
    /// Team cost allocated as OPEX.
    pub team_opex: f64,
    /// Revenue − COGS − team COGS.
    pub gross_profit: f64,
    /// Gross profit − OPEX − team OPEX.
    pub net_profit: f64,
    /// `None` when there is no revenue.
    pub gross_margin_pct: Option<f64>,
}

/// Build the month's P&L from booked records plus allocated team cost.
///
/// Records and allocations outside `month` are skipped. An allocation costs
/// `monthly_cost × percentage / 100` of its member; allocations for unknown
/// members cost nothing.
#[must_use]
pub fn financial_summary(
    month: Month,
    records: &[FinancialRecord],
    allocations: &[Allocation],
    members: &[TeamMember],
) -> FinancialSummary {
    let (mut revenue, mut opex, mut cogs) = (0.0, 0.0, 0.0);
    for record in records.iter().filter(|r| r.month == month) {
        match record.category {
            FinancialCategory::Revenue => revenue += record.amount,
            FinancialCategory::Opex => opex += record.amount,
            FinancialCategory::Cogs => cogs += record.amount,
        }
    }

    let cost_by_member: HashMap<&str, f64> = members
        .iter()
        .map(|m| (m.id.as_str(), m.monthly_cost))
        .collect();
    let (mut team_cogs, mut team_opex) = (0.0, 0.0);
    for allocation in allocations.iter().filter(|a| a.month == month) {
        let cost = cost_by_member
            .get(allocation.team_member_id.as_str())
            .copied()
            .unwrap_or(0.0)
            * allocation.percentage
            / 100.0;
        match allocation.cost_type {
            CostType::Cogs => team_cogs += cost,
            CostType::Opex => team_opex += cost,
        }
    }

    let gross_profit = revenue - cogs - team_cogs;
    let net_profit = gross_profit - opex - team_opex;

    FinancialSummary {
        month,
        revenue: round2(revenue),
        opex: round2(opex),
        cogs: round2(cogs),
        team_cogs: round2(team_cogs),
        team_opex: round2(team_opex),
        gross_profit: round2(gross_profit),
        net_profit: round2(net_profit),
        gross_margin_pct: percent(gross_profit, revenue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn record(month: &str, category: FinancialCategory, amount: f64) -> FinancialRecord {
        let now = Utc::now();
        FinancialRecord {
            id: "fin-00000000".into(),
            org_id: "org".into(),
            project_id: None,
            month: month.parse().unwrap(),
            category,
            amount,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn member(id: &str, monthly_cost: f64) -> TeamMember {
        let now = Utc::now();
        TeamMember {
            id: id.into(),
            org_id: "org".into(),
            name: id.into(),
            email: None,
            role: None,
            monthly_cost,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn allocation(member: &str, cost_type: CostType, percentage: f64) -> Allocation {
        let now = Utc::now();
        Allocation {
            id: "alc-00000000".into(),
            org_id: "org".into(),
            team_member_id: member.into(),
            project_id: None,
            month: "2026-06".parse().unwrap(),
            cost_type,
            percentage,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn combines_records_and_team_cost() {
        let month: Month = "2026-06".parse().unwrap();
        let summary = financial_summary(
            month,
            &[
                record("2026-06", FinancialCategory::Revenue, 50_000.0),
                record("2026-06", FinancialCategory::Cogs, 5_000.0),
                record("2026-06", FinancialCategory::Opex, 8_000.0),
                record("2026-05", FinancialCategory::Revenue, 99_999.0),
            ],
            &[
                allocation("mbr-a", CostType::Cogs, 80.0),
                allocation("mbr-a", CostType::Opex, 20.0),
                allocation("mbr-missing", CostType::Cogs, 100.0),
            ],
            &[member("mbr-a", 10_000.0)],
        );

        assert_eq!(summary.revenue, 50_000.0);
        assert_eq!(summary.team_cogs, 8_000.0);
        assert_eq!(summary.team_opex, 2_000.0);
        assert_eq!(summary.gross_profit, 37_000.0);
        assert_eq!(summary.net_profit, 27_000.0);
        assert_eq!(summary.gross_margin_pct, Some(74.0));
    }

    #[test]
    fn margin_is_none_without_revenue() {
        let month: Month = "2026-06".parse().unwrap();
        let summary = financial_summary(
            month,
            &[record("2026-06", FinancialCategory::Opex, 100.0)],
            &[],
            &[],
        );
        assert_eq!(summary.gross_margin_pct, None);
        assert_eq!(summary.net_profit, -100.0);
    }
}
