use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CostType;
use crate::month::Month;
use crate::validation::{Validate, ValidationErrors, Validator};

/// Share of a team member's month assigned to a project under a cost type.
///
/// At most one allocation exists per (team member, month, cost type); writes
/// go through an upsert keyed on that triple.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Allocation {
    pub id: String,
    pub org_id: String,
    pub team_member_id: String,
    pub project_id: Option<String>,
    pub month: Month,
    pub cost_type: CostType,
    /// 0–100.
    pub percentage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Allocation {
    /// The composite key allocations are deduplicated on.
    #[must_use]
    pub fn key(&self) -> AllocationKey {
        AllocationKey {
            team_member_id: self.team_member_id.clone(),
            month: self.month,
            cost_type: self.cost_type,
        }
    }
}

/// (team member, month, cost type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocationKey {
    pub team_member_id: String,
    pub month: Month,
    pub cost_type: CostType,
}

/// Input for setting an allocation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewAllocation {
    pub team_member_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub month: Month,
    pub cost_type: CostType,
    pub percentage: f64,
}

impl NewAllocation {
    #[must_use]
    pub fn key(&self) -> AllocationKey {
        AllocationKey {
            team_member_id: self.team_member_id.clone(),
            month: self.month,
            cost_type: self.cost_type,
        }
    }
}

impl Validate for NewAllocation {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("team_member_id", &self.team_member_id, 64)
            .percentage("percentage", self.percentage)
            .finish()
    }
}

/// Whether an upsert inserted a new allocation or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}
