use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::LeadStage;
use crate::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator};

/// A sales pipeline opportunity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Lead {
    pub id: String,
    pub org_id: String,
    pub company: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub stage: LeadStage,
    /// Expected deal value.
    pub value: f64,
    /// Win probability, 0–100.
    pub probability: u8,
    pub owner: Option<String>,
    pub expected_close: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Value weighted by win probability.
    #[must_use]
    pub fn weighted_value(&self) -> f64 {
        self.value * f64::from(self.probability) / 100.0
    }
}

/// Input for creating a lead. Also the shape of one line in a lead import file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewLead {
    pub company: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub stage: Option<LeadStage>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub probability: Option<u8>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub expected_close: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewLead {
    #[must_use]
    pub fn for_company(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            ..Self::default()
        }
    }
}

impl Validate for NewLead {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("company", &self.company, MAX_NAME_LEN)
            .optional("contact_name", self.contact_name.as_deref(), MAX_NAME_LEN)
            .email("contact_email", self.contact_email.as_deref())
            .non_negative("value", self.value)
            .optional("owner", self.owner.as_deref(), MAX_NAME_LEN)
            .optional("notes", self.notes.as_deref(), MAX_TEXT_LEN);
        if let Some(probability) = self.probability {
            v.percentage("probability", f64::from(probability));
        }
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_value_uses_probability() {
        let now = Utc::now();
        let lead = Lead {
            id: "led-00000001".into(),
            org_id: "org".into(),
            company: "Acme".into(),
            contact_name: None,
            contact_email: None,
            stage: LeadStage::Proposal,
            value: 20_000.0,
            probability: 25,
            owner: None,
            expected_close: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        assert!((lead.weighted_value() - 5_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_bad_email_and_probability() {
        let input = NewLead {
            contact_email: Some("not-an-email".into()),
            probability: Some(120),
            ..NewLead::for_company("Acme")
        };
        let err = input.validate().unwrap_err();
        assert!(err.has("contact_email"));
        assert!(err.has("probability"));
        assert!(!err.has("company"));
    }
}
