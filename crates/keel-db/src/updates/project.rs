//! Project update builder.

use chrono::NaiveDate;
use keel_core::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator};
use serde::Serialize;

/// Status changes go through `transition_project`, not here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl Validate for ProjectUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.required("name", name, MAX_NAME_LEN);
        }
        if let Some(client) = &self.client {
            v.optional("client", client.as_deref(), MAX_NAME_LEN);
        }
        if let Some(description) = &self.description {
            v.optional("description", description.as_deref(), MAX_TEXT_LEN);
        }
        if let Some(Some(budget)) = self.budget {
            v.non_negative("budget", budget);
        }
        if let Some(progress) = self.progress {
            v.percentage("progress", f64::from(progress));
        }
        v.finish()
    }
}

pub struct ProjectUpdateBuilder(ProjectUpdate);

impl ProjectUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ProjectUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn client(mut self, client: Option<String>) -> Self {
        self.0.client = Some(client);
        self
    }

    #[must_use]
    pub fn start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.0.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.0.end_date = Some(date);
        self
    }

    #[must_use]
    pub fn budget(mut self, budget: Option<f64>) -> Self {
        self.0.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: u8) -> Self {
        self.0.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn build(self) -> ProjectUpdate {
        self.0
    }
}

impl Default for ProjectUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
