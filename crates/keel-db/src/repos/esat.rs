//! ESAT repository: surveys, questions, public submissions, and reports.
//!
//! Surveys are created as drafts with a random URL-safe `public_token`.
//! Respondents submit through that token without a tenant identity, so
//! [`KeelService::submit_public_response`] scopes by the survey's own
//! organization and records `public` as the audit actor.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use keel_core::analytics::{EsatReport, esat_report};
use keel_core::audit_detail::{StatusChangedDetail, SubmittedDetail};
use keel_core::entities::{
    AuditEntry, EsatAnswer, EsatQuestion, EsatResponse, EsatSubmission, EsatSurvey,
    NewEsatQuestion, NewEsatSurvey,
};
use keel_core::enums::{AuditAction, EntityType, EsatSurveyStatus};
use keel_core::ids::{
    PREFIX_ESAT_ANSWER, PREFIX_ESAT_QUESTION, PREFIX_ESAT_RESPONSE, PREFIX_ESAT_SURVEY,
};
use keel_core::responses::EsatSurveyDetail;
use keel_core::validation::Validate;

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_opt_string, get_u8, get_u32, opt_text, parse_datetime, parse_enum,
};
use crate::repos::audit::append_audit_on;
use crate::service::KeelService;

/// Actor recorded on audit entries for public survey submissions.
pub const PUBLIC_ACTOR: &str = "public";

/// Random bytes behind a survey's public token.
const TOKEN_BYTES: usize = 16;

const SURVEY_COLS: &str =
    "id, org_id, title, description, status, public_token, created_at, updated_at";
const QUESTION_COLS: &str =
    "id, org_id, survey_id, category, prompt, position, required, created_at";
const RESPONSE_COLS: &str = "id, org_id, survey_id, respondent, submitted_at";

fn row_to_survey(row: &libsql::Row) -> Result<EsatSurvey, DatabaseError> {
    Ok(EsatSurvey {
        id: row.get(0)?,
        org_id: row.get(1)?,
        title: row.get(2)?,
        description: get_opt_string(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        public_token: row.get(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn row_to_question(row: &libsql::Row) -> Result<EsatQuestion, DatabaseError> {
    Ok(EsatQuestion {
        id: row.get(0)?,
        org_id: row.get(1)?,
        survey_id: row.get(2)?,
        category: row.get(3)?,
        prompt: row.get(4)?,
        position: get_u32(row, 5)?,
        required: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn row_to_response(row: &libsql::Row) -> Result<EsatResponse, DatabaseError> {
    Ok(EsatResponse {
        id: row.get(0)?,
        org_id: row.get(1)?,
        survey_id: row.get(2)?,
        respondent: get_opt_string(row, 3)?,
        submitted_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

/// A fresh URL-safe token from the OS random source.
fn generate_token() -> Result<String, DatabaseError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut bytes)
        .map_err(|e| DatabaseError::Other(anyhow::anyhow!("random source failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

impl KeelService {
    /// Create a survey in `draft` with a new public token.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input.
    pub async fn create_survey(&self, input: &NewEsatSurvey) -> Result<EsatSurvey, DatabaseError> {
        input.validate()?;
        let now = Utc::now();
        let survey = EsatSurvey {
            id: self.db().generate_id(PREFIX_ESAT_SURVEY).await?,
            org_id: self.org_id().to_string(),
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            status: EsatSurveyStatus::Draft,
            public_token: generate_token()?,
            created_at: now,
            updated_at: now,
        };

        let params: Vec<libsql::Value> = vec![
            survey.id.clone().into(),
            survey.org_id.clone().into(),
            survey.title.clone().into(),
            opt_text(survey.description.as_deref()),
            survey.status.as_str().into(),
            survey.public_token.clone().into(),
            now.to_rfc3339().into(),
            now.to_rfc3339().into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO esat_surveys ({SURVEY_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        self.audit(
            EntityType::EsatSurvey,
            &survey.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        tracing::info!(id = %survey.id, title = %survey.title, "survey created");
        Ok(survey)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such survey exists in the tenant.
    pub async fn get_survey(&self, id: &str) -> Result<EsatSurvey, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SURVEY_COLS} FROM esat_surveys WHERE id = ?1 AND org_id = ?2"),
                || [id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::EsatSurvey, id))?;
        row_to_survey(&row)
    }

    /// Look a survey up by its public token, in any organization.
    async fn survey_by_token(&self, token: &str) -> Result<EsatSurvey, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SURVEY_COLS} FROM esat_surveys WHERE public_token = ?1"),
                || [token],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::EsatSurvey, token))?;
        row_to_survey(&row)
    }

    /// Survey with its questions and response count.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the survey does not exist.
    pub async fn get_survey_detail(&self, id: &str) -> Result<EsatSurveyDetail, DatabaseError> {
        let survey = self.get_survey(id).await?;
        let questions = self.list_questions(id).await?;
        let mut rows = self
            .db()
            .query_with(
                "SELECT COUNT(*) FROM esat_responses WHERE survey_id = ?1 AND org_id = ?2",
                || [id, self.org_id()],
            )
            .await?;
        let response_count = match rows.next().await? {
            Some(row) => get_u32(&row, 0)?,
            None => 0,
        };
        Ok(EsatSurveyDetail {
            survey,
            questions,
            response_count,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_surveys(
        &self,
        status: Option<EsatSurveyStatus>,
        limit: u32,
    ) -> Result<Vec<EsatSurvey>, DatabaseError> {
        let mut sql = format!("SELECT {SURVEY_COLS} FROM esat_surveys WHERE org_id = ?1");
        let mut params: Vec<libsql::Value> = vec![self.org_id().into()];
        if let Some(status) = status {
            params.push(status.as_str().into());
            sql.push_str(&format!(" AND status = ?{}", params.len()));
        }
        sql.push_str(&format!(" ORDER BY created_at DESC, rowid DESC LIMIT {limit}"));

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut surveys = Vec::new();
        while let Some(row) = rows.next().await? {
            surveys.push(row_to_survey(&row)?);
        }
        Ok(surveys)
    }

    /// Open, close, or re-open a survey.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the transition is not allowed,
    /// or when opening a survey that has no questions.
    pub async fn transition_survey(
        &self,
        id: &str,
        to: EsatSurveyStatus,
    ) -> Result<EsatSurvey, DatabaseError> {
        let current = self.get_survey(id).await?;
        current.status.check_transition(to, id)?;
        if to == EsatSurveyStatus::Open && self.list_questions(id).await?.is_empty() {
            return Err(DatabaseError::InvalidState(format!(
                "Survey {id} has no questions"
            )));
        }

        let now = Utc::now();
        self.db()
            .execute_with(
                "UPDATE esat_surveys SET status = ?1, updated_at = ?2 WHERE id = ?3 AND org_id = ?4",
                || libsql::params![to.as_str(), now.to_rfc3339(), id, self.org_id()],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: to.as_str().to_string(),
            reason: None,
        };
        self.audit(
            EntityType::EsatSurvey,
            id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
        )
        .await?;
        tracing::info!(id, from = %current.status, %to, "survey status changed");
        self.get_survey(id).await
    }

    /// Delete a survey with its questions, responses, and answers.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the survey does not exist.
    pub async fn delete_survey(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .execute_with("DELETE FROM esat_surveys WHERE id = ?1 AND org_id = ?2", || {
                [id, self.org_id()]
            })
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found(EntityType::EsatSurvey, id));
        }
        self.audit(EntityType::EsatSurvey, id, AuditAction::Deleted, None)
            .await
    }

    fn ensure_editable(survey: &EsatSurvey) -> Result<(), DatabaseError> {
        if survey.status == EsatSurveyStatus::Closed {
            return Err(DatabaseError::InvalidState(format!(
                "Survey {} is closed; re-open it to change its questions",
                survey.id
            )));
        }
        Ok(())
    }

    /// Add a question. Without an explicit position it goes after the last one.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` on invalid input and `InvalidState`
    /// when the survey is closed.
    pub async fn add_question(
        &self,
        survey_id: &str,
        input: &NewEsatQuestion,
    ) -> Result<EsatQuestion, DatabaseError> {
        input.validate()?;
        let survey = self.get_survey(survey_id).await?;
        Self::ensure_editable(&survey)?;

        let position = match input.position {
            Some(p) => p,
            None => {
                let mut rows = self
                    .db()
                    .query_with(
                        "SELECT COALESCE(MAX(position) + 1, 0) FROM esat_questions
                         WHERE survey_id = ?1 AND org_id = ?2",
                        || [survey_id, self.org_id()],
                    )
                    .await?;
                match rows.next().await? {
                    Some(row) => get_u32(&row, 0)?,
                    None => 0,
                }
            }
        };

        let now = Utc::now();
        let question = EsatQuestion {
            id: self.db().generate_id(PREFIX_ESAT_QUESTION).await?,
            org_id: self.org_id().to_string(),
            survey_id: survey_id.to_string(),
            category: input.category.trim().to_lowercase(),
            prompt: input.prompt.trim().to_string(),
            position,
            required: input.required,
            created_at: now,
        };
        let params: Vec<libsql::Value> = vec![
            question.id.clone().into(),
            question.org_id.clone().into(),
            question.survey_id.clone().into(),
            question.category.clone().into(),
            question.prompt.clone().into(),
            i64::from(question.position).into(),
            i64::from(question.required).into(),
            now.to_rfc3339().into(),
        ];
        self.db()
            .execute_with(
                &format!(
                    "INSERT INTO esat_questions ({QUESTION_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                || libsql::params_from_iter(params.clone()),
            )
            .await?;

        self.audit(
            EntityType::EsatQuestion,
            &question.id,
            AuditAction::Created,
            Some(serde_json::to_value(input)?),
        )
        .await?;
        Ok(question)
    }

    /// Questions of a survey in display order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_questions(&self, survey_id: &str) -> Result<Vec<EsatQuestion>, DatabaseError> {
        let org_id = self.org_id().to_string();
        self.questions_in(survey_id, &org_id).await
    }

    async fn questions_in(
        &self,
        survey_id: &str,
        org_id: &str,
    ) -> Result<Vec<EsatQuestion>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {QUESTION_COLS} FROM esat_questions
                     WHERE survey_id = ?1 AND org_id = ?2 ORDER BY position, created_at"
                ),
                || [survey_id, org_id],
            )
            .await?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next().await? {
            questions.push(row_to_question(&row)?);
        }
        Ok(questions)
    }

    /// Remove a question and every answer given to it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the question does not exist and
    /// `InvalidState` when its survey is closed.
    pub async fn remove_question(&self, question_id: &str) -> Result<(), DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT survey_id FROM esat_questions WHERE id = ?1 AND org_id = ?2",
                || [question_id, self.org_id()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::EsatQuestion, question_id))?;
        let survey_id: String = row.get(0)?;
        let survey = self.get_survey(&survey_id).await?;
        Self::ensure_editable(&survey)?;

        self.db()
            .execute_with(
                "DELETE FROM esat_questions WHERE id = ?1 AND org_id = ?2",
                || [question_id, self.org_id()],
            )
            .await?;
        self.audit(
            EntityType::EsatQuestion,
            question_id,
            AuditAction::Deleted,
            None,
        )
        .await
    }

    /// Record a respondent's answers through a survey's public token.
    ///
    /// The survey must be open. Answers must reference the survey's questions
    /// at most once each, hold values 1–5, and cover every required question.
    /// The response, its answers, and the audit entry are written in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown token,
    /// `InvalidState` when the survey is not open, and `Validation` when the
    /// answers do not fit the survey.
    pub async fn submit_public_response(
        &self,
        token: &str,
        submission: &EsatSubmission,
    ) -> Result<EsatResponse, DatabaseError> {
        submission.validate()?;
        let survey = self.survey_by_token(token).await?;
        if survey.status != EsatSurveyStatus::Open {
            return Err(DatabaseError::InvalidState(format!(
                "Survey {} is not accepting responses ({})",
                survey.id, survey.status
            )));
        }
        let questions = self.questions_in(&survey.id, &survey.org_id).await?;
        submission.validate_against(&questions)?;

        let now = Utc::now();
        let response = EsatResponse {
            id: self.db().generate_id(PREFIX_ESAT_RESPONSE).await?,
            org_id: survey.org_id.clone(),
            survey_id: survey.id.clone(),
            respondent: submission.respondent.clone(),
            submitted_at: now,
        };

        let tx = self.db().conn().transaction().await?;
        tx.execute(
            &format!("INSERT INTO esat_responses ({RESPONSE_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
            libsql::params![
                response.id.as_str(),
                response.org_id.as_str(),
                response.survey_id.as_str(),
                opt_text(response.respondent.as_deref()),
                now.to_rfc3339()
            ],
        )
        .await?;
        for answer in &submission.answers {
            let answer_id = self.db().generate_id(PREFIX_ESAT_ANSWER).await?;
            tx.execute(
                "INSERT INTO esat_answers (id, response_id, question_id, value)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    answer_id.as_str(),
                    response.id.as_str(),
                    answer.question_id.as_str(),
                    i64::from(answer.value)
                ],
            )
            .await?;
        }

        let detail = SubmittedDetail {
            survey_id: survey.id.clone(),
            answers: u32::try_from(submission.answers.len()).unwrap_or(u32::MAX),
        };
        let entry = self
            .audit_entry_as(
                PUBLIC_ACTOR,
                EntityType::EsatResponse,
                &response.id,
                AuditAction::Submitted,
                Some(serde_json::to_value(&detail)?),
            )
            .await?;
        let entry = AuditEntry {
            org_id: survey.org_id.clone(),
            ..entry
        };
        append_audit_on(&tx, &entry).await?;
        tx.commit().await?;

        tracing::info!(
            survey = %survey.id,
            response = %response.id,
            answers = submission.answers.len(),
            "survey response submitted"
        );
        Ok(response)
    }

    /// Responses to a survey, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_responses(&self, survey_id: &str) -> Result<Vec<EsatResponse>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!(
                    "SELECT {RESPONSE_COLS} FROM esat_responses
                     WHERE survey_id = ?1 AND org_id = ?2 ORDER BY submitted_at"
                ),
                || [survey_id, self.org_id()],
            )
            .await?;
        let mut responses = Vec::new();
        while let Some(row) = rows.next().await? {
            responses.push(row_to_response(&row)?);
        }
        Ok(responses)
    }

    async fn list_answers(&self, survey_id: &str) -> Result<Vec<EsatAnswer>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT a.id, a.response_id, a.question_id, a.value
                 FROM esat_answers a
                 JOIN esat_responses r ON r.id = a.response_id
                 WHERE r.survey_id = ?1 AND r.org_id = ?2",
                || [survey_id, self.org_id()],
            )
            .await?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next().await? {
            answers.push(EsatAnswer {
                id: row.get(0)?,
                response_id: row.get(1)?,
                question_id: row.get(2)?,
                value: get_u8(&row, 3)?,
            });
        }
        Ok(answers)
    }

    /// Per-category and overall averages plus completion for one survey.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the survey does not exist.
    pub async fn esat_report(&self, survey_id: &str) -> Result<EsatReport, DatabaseError> {
        let survey = self.get_survey(survey_id).await?;
        let questions = self.list_questions(&survey.id).await?;
        let responses = self.list_responses(&survey.id).await?;
        let answers = self.list_answers(&survey.id).await?;
        Ok(esat_report(&survey.id, &questions, &responses, &answers))
    }
}
