//! Status enums, categories, entity types, and audit actions for Keel.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` and
//! `check_transition()` to enforce valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a project.
///
/// ```text
/// planned → active → completed
///         → cancelled
/// active ⇄ on_hold
/// active | on_hold → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planned,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Planned => &[Self::Active, Self::Cancelled],
            Self::Active => &[Self::OnHold, Self::Completed, Self::Cancelled],
            Self::OnHold => &[Self::Active, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` naming `id` when `next` is not
    /// reachable from `self`.
    pub fn check_transition(self, next: Self, id: &str) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::invalid_transition(EntityType::Project, id, self, next))
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FinancialCategory
// ---------------------------------------------------------------------------

/// Bucket a financial record is booked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinancialCategory {
    Revenue,
    Opex,
    Cogs,
}

impl FinancialCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Opex => "opex",
            Self::Cogs => "cogs",
        }
    }
}

impl fmt::Display for FinancialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CostType
// ---------------------------------------------------------------------------

/// Whether an allocation's cost lands in COGS (delivery work) or OPEX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Cogs,
    Opex,
}

impl CostType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cogs => "cogs",
            Self::Opex => "opex",
        }
    }
}

impl fmt::Display for CostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LeadStage
// ---------------------------------------------------------------------------

/// Position of a lead in the sales pipeline.
///
/// ```text
/// new → contacted → qualified → proposal → negotiation → won
/// (any open stage) → lost
/// lost → new (re-opened)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadStage {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl LeadStage {
    /// Pipeline order, used to lay out per-stage summaries.
    pub const ALL: [Self; 7] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::Won,
        Self::Lost,
    ];

    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::New => &[Self::Contacted, Self::Lost],
            Self::Contacted => &[Self::Qualified, Self::Lost],
            Self::Qualified => &[Self::Proposal, Self::Lost],
            Self::Proposal => &[Self::Negotiation, Self::Lost],
            Self::Negotiation => &[Self::Won, Self::Lost],
            Self::Lost => &[Self::New],
            Self::Won => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` naming `id` when `next` is not
    /// reachable from `self`.
    pub fn check_transition(self, next: Self, id: &str) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::invalid_transition(EntityType::Lead, id, self, next))
        }
    }

    /// Won and lost leads are closed; everything else is open pipeline.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Won | Self::Lost)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl fmt::Display for LeadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EsatSurveyStatus
// ---------------------------------------------------------------------------

/// Status of an ESAT survey.
///
/// ```text
/// draft → open → closed
/// closed → open (re-opened)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EsatSurveyStatus {
    Draft,
    Open,
    Closed,
}

impl EsatSurveyStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Open],
            Self::Open => &[Self::Closed],
            Self::Closed => &[Self::Open],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` naming `id` when `next` is not
    /// reachable from `self`.
    pub fn check_transition(self, next: Self, id: &str) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::invalid_transition(EntityType::EsatSurvey, id, self, next))
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for EsatSurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DailyTaskStatus
// ---------------------------------------------------------------------------

/// Status of a daily task.
///
/// ```text
/// todo → in_progress → done
/// in_progress → todo
/// done → in_progress (re-opened)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DailyTaskStatus {
    Todo,
    InProgress,
    Done,
}

impl DailyTaskStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Todo => &[Self::InProgress],
            Self::InProgress => &[Self::Done, Self::Todo],
            Self::Done => &[Self::InProgress],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` naming `id` when `next` is not
    /// reachable from `self`.
    pub fn check_transition(self, next: Self, id: &str) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::invalid_transition(EntityType::DailyTask, id, self, next))
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for DailyTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    Upserted,
    Submitted,
    Restored,
    Imported,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::Upserted => "upserted",
            Self::Submitted => "submitted",
            Self::Restored => "restored",
            Self::Imported => "imported",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of record in the system, used in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    FinancialRecord,
    Lead,
    TeamMember,
    Allocation,
    CsatEntry,
    EsatSurvey,
    EsatQuestion,
    EsatResponse,
    DailyTask,
    Document,
    Attachment,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::FinancialRecord => "financial_record",
            Self::Lead => "lead",
            Self::TeamMember => "team_member",
            Self::Allocation => "allocation",
            Self::CsatEntry => "csat_entry",
            Self::EsatSurvey => "esat_survey",
            Self::EsatQuestion => "esat_question",
            Self::EsatResponse => "esat_response",
            Self::DailyTask => "daily_task",
            Self::Document => "document",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_transition_reports_the_rejected_move() {
        assert!(LeadStage::Negotiation.check_transition(LeadStage::Won, "led-1").is_ok());
        let err = LeadStage::Won
            .check_transition(LeadStage::Lost, "led-1")
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition { entity_type: EntityType::Lead, ref from, ref to, .. }
                if from == "won" && to == "lost"
        ));
        assert_eq!(
            DailyTaskStatus::Todo
                .check_transition(DailyTaskStatus::Done, "dtk-1")
                .unwrap_err()
                .to_string(),
            "Cannot move daily_task dtk-1 from todo to done"
        );
    }

    #[test]
    fn project_terminal_states_have_no_exits() {
        assert!(ProjectStatus::Completed.allowed_next_states().is_empty());
        assert!(ProjectStatus::Cancelled.allowed_next_states().is_empty());
        assert!(ProjectStatus::Planned.can_transition_to(ProjectStatus::Active));
        assert!(!ProjectStatus::Planned.can_transition_to(ProjectStatus::Completed));
    }

    #[test]
    fn every_open_lead_stage_can_be_lost() {
        for stage in LeadStage::ALL.into_iter().filter(|s| s.is_open()) {
            assert!(stage.can_transition_to(LeadStage::Lost), "{stage} -> lost");
        }
        assert!(!LeadStage::Won.can_transition_to(LeadStage::Lost));
        assert!(LeadStage::Lost.can_transition_to(LeadStage::New));
    }

    #[test]
    fn lead_stage_cannot_skip_ahead() {
        assert!(!LeadStage::New.can_transition_to(LeadStage::Proposal));
        assert!(!LeadStage::Contacted.can_transition_to(LeadStage::Won));
    }

    #[test]
    fn survey_can_reopen() {
        assert!(EsatSurveyStatus::Closed.can_transition_to(EsatSurveyStatus::Open));
        assert!(!EsatSurveyStatus::Closed.can_transition_to(EsatSurveyStatus::Draft));
    }

    #[test]
    fn daily_task_reopen_goes_through_in_progress() {
        assert!(DailyTaskStatus::Done.can_transition_to(DailyTaskStatus::InProgress));
        assert!(!DailyTaskStatus::Done.can_transition_to(DailyTaskStatus::Todo));
    }

    #[test]
    fn as_str_matches_serde() {
        let json = serde_json::to_value(ProjectStatus::OnHold).unwrap();
        assert_eq!(json, serde_json::json!(ProjectStatus::OnHold.as_str()));
        let json = serde_json::to_value(EntityType::FinancialRecord).unwrap();
        assert_eq!(json, serde_json::json!(EntityType::FinancialRecord.as_str()));
        let json = serde_json::to_value(DailyTaskStatus::InProgress).unwrap();
        assert_eq!(json, serde_json::json!("in_progress"));
    }
}
