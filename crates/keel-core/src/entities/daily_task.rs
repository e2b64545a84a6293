use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DailyTaskStatus;
use crate::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator};

/// A dated unit of work, optionally tied to a team member and project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DailyTask {
    pub id: String,
    pub org_id: String,
    pub team_member_id: Option<String>,
    pub project_id: Option<String>,
    pub date: NaiveDate,
    pub title: String,
    pub status: DailyTaskStatus,
    /// Hours spent, 0–24.
    pub hours: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewDailyTask {
    #[serde(default)]
    pub team_member_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub hours: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for NewDailyTask {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("title", &self.title, MAX_NAME_LEN)
            .range("hours", self.hours, 0.0, 24.0)
            .optional("notes", self.notes.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}
