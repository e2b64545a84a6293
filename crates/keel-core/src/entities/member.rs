use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validation::{MAX_NAME_LEN, Validate, ValidationErrors, Validator};

/// A person whose time is allocated to projects.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TeamMember {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Fully loaded monthly cost; allocations spread it across COGS and OPEX.
    pub monthly_cost: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a team member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewTeamMember {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub monthly_cost: f64,
}

impl Validate for NewTeamMember {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", &self.name, MAX_NAME_LEN)
            .email("email", self.email.as_deref())
            .optional("role", self.role.as_deref(), MAX_NAME_LEN)
            .non_negative("monthly_cost", self.monthly_cost)
            .finish()
    }
}
