use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::round2;
use crate::entities::{Allocation, TeamMember};
use crate::enums::CostType;
use crate::month::Month;

/// How much of one member's month is allocated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MemberUtilization {
    pub team_member_id: String,
    pub name: String,
    pub cogs_pct: f64,
    pub opex_pct: f64,
    pub total_pct: f64,
    /// Total allocation exceeds 100%.
    pub over_allocated: bool,
    pub allocated_cost: f64,
}

/// Per-member allocation totals for `month`.
///
/// Every active member appears, even with nothing allocated; inactive members
/// appear only if they still carry allocations. Sorted by name, then ID.
#[must_use]
pub fn utilization(
    month: Month,
    allocations: &[Allocation],
    members: &[TeamMember],
) -> Vec<MemberUtilization> {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for member in members.iter().filter(|m| m.active) {
        totals.entry(member.id.as_str()).or_default();
    }
    for allocation in allocations.iter().filter(|a| a.month == month) {
        let slot = totals.entry(allocation.team_member_id.as_str()).or_default();
        match allocation.cost_type {
            CostType::Cogs => slot.0 += allocation.percentage,
            CostType::Opex => slot.1 += allocation.percentage,
        }
    }

    let mut rows: Vec<MemberUtilization> = totals
        .into_iter()
        .map(|(id, (cogs, opex))| {
            let member = members.iter().find(|m| m.id == id);
            let total = cogs + opex;
            MemberUtilization {
                team_member_id: id.to_string(),
                name: member.map_or_else(|| id.to_string(), |m| m.name.clone()),
                cogs_pct: round2(cogs),
                opex_pct: round2(opex),
                total_pct: round2(total),
                over_allocated: total > 100.0,
                allocated_cost: round2(member.map_or(0.0, |m| m.monthly_cost) * total / 100.0),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.team_member_id.cmp(&b.team_member_id))
    });
    rows
}
