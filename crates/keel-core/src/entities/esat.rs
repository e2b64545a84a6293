use std::collections::HashSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EsatSurveyStatus;
use crate::validation::{
    FieldError, MAX_NAME_LEN, MAX_TEXT_LEN, Validate, ValidationErrors, Validator,
};

/// An employee satisfaction survey. Respondents submit through a public link
/// carrying `public_token`, without a tenant identity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EsatSurvey {
    pub id: String,
    pub org_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: EsatSurveyStatus,
    pub public_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EsatQuestion {
    pub id: String,
    pub org_id: String,
    pub survey_id: String,
    /// Grouping for per-category averages, e.g. `workload`, `growth`.
    pub category: String,
    pub prompt: String,
    pub position: u32,
    pub required: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EsatResponse {
    pub id: String,
    pub org_id: String,
    pub survey_id: String,
    pub respondent: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// A Likert answer (1–5) to one question within one response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EsatAnswer {
    pub id: String,
    pub response_id: String,
    pub question_id: String,
    pub value: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewEsatSurvey {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for NewEsatSurvey {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("title", &self.title, MAX_NAME_LEN)
            .optional("description", self.description.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewEsatQuestion {
    pub category: String,
    pub prompt: String,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Appended after the last question when unset.
    #[serde(default)]
    pub position: Option<u32>,
}

const fn default_required() -> bool {
    true
}

impl Validate for NewEsatQuestion {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("category", &self.category, 64)
            .required("prompt", &self.prompt, MAX_TEXT_LEN)
            .finish()
    }
}

/// One answer in a submission.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnswerInput {
    pub question_id: String,
    pub value: u8,
}

/// A public survey submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EsatSubmission {
    #[serde(default)]
    pub respondent: Option<String>,
    pub answers: Vec<AnswerInput>,
}

impl Validate for EsatSubmission {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.optional("respondent", self.respondent.as_deref(), MAX_NAME_LEN);
        if self.answers.is_empty() {
            v.error("answers", "must contain at least one answer");
        }
        let mut seen = HashSet::new();
        for (i, answer) in self.answers.iter().enumerate() {
            v.likert(&format!("answers[{i}].value"), answer.value);
            if !seen.insert(answer.question_id.as_str()) {
                v.error(
                    &format!("answers[{i}].question_id"),
                    format!("answers question {} more than once", answer.question_id),
                );
            }
        }
        v.finish()
    }
}

impl EsatSubmission {
    /// Check the submission against the survey's questions: every answer must
    /// target one of them and every required question must be answered.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` naming unknown and unanswered questions.
    pub fn validate_against(&self, questions: &[EsatQuestion]) -> Result<(), ValidationErrors> {
        let known: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        let answered: HashSet<&str> = self.answers.iter().map(|a| a.question_id.as_str()).collect();

        let mut errors = Vec::new();
        for (i, answer) in self.answers.iter().enumerate() {
            if !known.contains(answer.question_id.as_str()) {
                errors.push(FieldError {
                    field: format!("answers[{i}].question_id"),
                    message: format!("is not a question of this survey ({})", answer.question_id),
                });
            }
        }
        for question in questions.iter().filter(|q| q.required) {
            if !answered.contains(question.id.as_str()) {
                errors.push(FieldError {
                    field: format!("question {}", question.id),
                    message: "is required".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, required: bool) -> EsatQuestion {
        EsatQuestion {
            id: id.into(),
            org_id: "org".into(),
            survey_id: "esv-00000001".into(),
            category: "workload".into(),
            prompt: "How manageable is your workload?".into(),
            position: 0,
            required,
            created_at: Utc::now(),
        }
    }

    fn answer(question_id: &str, value: u8) -> AnswerInput {
        AnswerInput {
            question_id: question_id.into(),
            value,
        }
    }

    #[test]
    fn duplicate_answers_are_rejected() {
        let submission = EsatSubmission {
            respondent: None,
            answers: vec![answer("esq-1", 4), answer("esq-1", 5)],
        };
        let err = submission.validate().unwrap_err();
        assert!(err.has("answers[1].question_id"));
    }

    #[test]
    fn out_of_scale_values_are_rejected() {
        let submission = EsatSubmission {
            respondent: None,
            answers: vec![answer("esq-1", 0), answer("esq-2", 6)],
        };
        let err = submission.validate().unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn missing_required_and_unknown_questions() {
        let questions = [question("esq-1", true), question("esq-2", false)];
        let submission = EsatSubmission {
            respondent: None,
            answers: vec![answer("esq-2", 3), answer("esq-9", 3)],
        };
        let err = submission.validate_against(&questions).unwrap_err();
        assert!(err.has("answers[1].question_id"));
        assert!(err.has("question esq-1"));
    }

    #[test]
    fn optional_questions_may_be_skipped() {
        let questions = [question("esq-1", true), question("esq-2", false)];
        let submission = EsatSubmission {
            respondent: Some("anon".into()),
            answers: vec![answer("esq-1", 5)],
        };
        assert!(submission.validate().is_ok());
        assert!(submission.validate_against(&questions).is_ok());
    }
}
