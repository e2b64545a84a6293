//! Daily task update builder.

use chrono::NaiveDate;
use keel_core::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator};
use serde::Serialize;

/// Status changes go through `transition_daily_task`, not here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyTaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_member_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl Validate for DailyTaskUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Some(title) = &self.title {
            v.required("title", title, MAX_NAME_LEN);
        }
        if let Some(hours) = self.hours {
            v.range("hours", hours, 0.0, 24.0);
        }
        if let Some(notes) = &self.notes {
            v.optional("notes", notes.as_deref(), MAX_TEXT_LEN);
        }
        v.finish()
    }
}

pub struct DailyTaskUpdateBuilder(DailyTaskUpdate);

impl DailyTaskUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(DailyTaskUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.0.date = Some(date);
        self
    }

    #[must_use]
    pub fn hours(mut self, hours: f64) -> Self {
        self.0.hours = Some(hours);
        self
    }

    #[must_use]
    pub fn team_member_id(mut self, id: Option<String>) -> Self {
        self.0.team_member_id = Some(id);
        self
    }

    #[must_use]
    pub fn project_id(mut self, id: Option<String>) -> Self {
        self.0.project_id = Some(id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.0.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn build(self) -> DailyTaskUpdate {
        self.0
    }
}

impl Default for DailyTaskUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
