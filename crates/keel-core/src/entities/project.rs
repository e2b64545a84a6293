use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ProjectStatus;
use crate::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator};

/// A client or internal project tracked on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Project {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub client: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Planned budget in the configured currency.
    pub budget: Option<f64>,
    /// Completion, 0–100.
    pub progress: u8,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProject {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Validate for NewProject {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required("name", &self.name, MAX_NAME_LEN)
            .optional("client", self.client.as_deref(), MAX_NAME_LEN)
            .optional("description", self.description.as_deref(), MAX_TEXT_LEN)
            .date_order("end_date", self.start_date, self.end_date);
        if let Some(budget) = self.budget {
            v.non_negative("budget", budget);
        }
        if let Some(progress) = self.progress {
            v.percentage("progress", f64::from(progress));
        }
        v.finish()
    }
}
