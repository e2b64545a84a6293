use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FinancialCategory;
use crate::month::Month;
use crate::validation::{MAX_TEXT_LEN, Validate, ValidationErrors, Validator};

/// A revenue, OPEX, or COGS amount booked in a month, optionally against a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FinancialRecord {
    pub id: String,
    pub org_id: String,
    pub project_id: Option<String>,
    pub month: Month,
    pub category: FinancialCategory,
    pub amount: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for booking a financial record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewFinancialRecord {
    #[serde(default)]
    pub project_id: Option<String>,
    pub month: Month,
    pub category: FinancialCategory,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for NewFinancialRecord {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .non_negative("amount", self.amount)
            .optional("description", self.description.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_is_rejected() {
        let input = NewFinancialRecord {
            project_id: None,
            month: "2026-01".parse().unwrap(),
            category: FinancialCategory::Opex,
            amount: -10.0,
            description: None,
        };
        assert!(input.validate().unwrap_err().has("amount"));
    }
}
