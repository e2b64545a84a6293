//! Lead update builder.

use chrono::NaiveDate;
use keel_core::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator};
use serde::Serialize;

/// Stage changes go through `transition_lead`, not here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_close: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl Validate for LeadUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(company) = &self.company {
            v.required("company", company, MAX_NAME_LEN);
        }
        if let Some(name) = &self.contact_name {
            v.optional("contact_name", name.as_deref(), MAX_NAME_LEN);
        }
        if let Some(email) = &self.contact_email {
            v.email("contact_email", email.as_deref());
        }
        if let Some(value) = self.value {
            v.non_negative("value", value);
        }
        if let Some(probability) = self.probability {
            v.percentage("probability", f64::from(probability));
        }
        if let Some(owner) = &self.owner {
            v.optional("owner", owner.as_deref(), MAX_NAME_LEN);
        }
        if let Some(notes) = &self.notes {
            v.optional("notes", notes.as_deref(), MAX_TEXT_LEN);
        }
        v.finish()
    }
}

pub struct LeadUpdateBuilder(LeadUpdate);

impl LeadUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(LeadUpdate::default())
    }

    #[must_use]
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.0.company = Some(company.into());
        self
    }

    #[must_use]
    pub fn contact_name(mut self, name: Option<String>) -> Self {
        self.0.contact_name = Some(name);
        self
    }

    #[must_use]
    pub fn contact_email(mut self, email: Option<String>) -> Self {
        self.0.contact_email = Some(email);
        self
    }

    #[must_use]
    pub fn value(mut self, value: f64) -> Self {
        self.0.value = Some(value);
        self
    }

    #[must_use]
    pub fn probability(mut self, probability: u8) -> Self {
        self.0.probability = Some(probability);
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: Option<String>) -> Self {
        self.0.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn expected_close(mut self, date: Option<NaiveDate>) -> Self {
        self.0.expected_close = Some(date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.0.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn build(self) -> LeadUpdate {
        self.0
    }
}

impl Default for LeadUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
