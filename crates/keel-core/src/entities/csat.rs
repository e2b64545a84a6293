use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::month::Month;
use crate::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator};

/// One customer satisfaction data point for a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CsatEntry {
    pub id: String,
    pub org_id: String,
    pub project_id: String,
    pub month: Month,
    /// 0–100.
    pub score: f64,
    pub respondent: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a CSAT score.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewCsatEntry {
    pub project_id: String,
    pub month: Month,
    pub score: f64,
    #[serde(default)]
    pub respondent: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Validate for NewCsatEntry {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("project_id", &self.project_id, 64)
            .percentage("score", self.score)
            .optional("respondent", self.respondent.as_deref(), MAX_NAME_LEN)
            .optional("comment", self.comment.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}
