//! Financial record update builder.

use keel_core::enums::FinancialCategory;
use keel_core::month::Month;
use keel_core::validation::{MAX_TEXT_LEN, Validate, ValidationErrors, Validator};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct FinancialUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FinancialCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl Validate for FinancialUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(amount) = self.amount {
            v.non_negative("amount", amount);
        }
        if let Some(description) = &self.description {
            v.optional("description", description.as_deref(), MAX_TEXT_LEN);
        }
        v.finish()
    }
}

pub struct FinancialUpdateBuilder(FinancialUpdate);

impl FinancialUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(FinancialUpdate::default())
    }

    #[must_use]
    pub fn project_id(mut self, project_id: Option<String>) -> Self {
        self.0.project_id = Some(project_id);
        self
    }

    #[must_use]
    pub fn month(mut self, month: Month) -> Self {
        self.0.month = Some(month);
        self
    }

    #[must_use]
    pub fn category(mut self, category: FinancialCategory) -> Self {
        self.0.category = Some(category);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.0.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn build(self) -> FinancialUpdate {
        self.0
    }
}

impl Default for FinancialUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
