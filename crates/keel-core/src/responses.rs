//! Composite response types returned as JSON by `keel` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{CsatSummary, FinancialSummary, MemberUtilization, PipelineSummary};
use crate::entities::{Allocation, Document, EsatQuestion, EsatSurvey, Lead, UpsertOutcome};
use crate::month::Month;

/// Response from `keel allocation set`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AllocationUpsertResponse {
    pub outcome: UpsertOutcome,
    pub allocation: Allocation,
}

/// Response from `keel esat get`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EsatSurveyDetail {
    pub survey: EsatSurvey,
    pub questions: Vec<EsatQuestion>,
    pub response_count: u32,
}

/// Response from `keel doc render`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RenderedDocument {
    pub document: Document,
    pub html: String,
    pub excerpt: String,
}

/// One rejected line of a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportRejection {
    pub line: u32,
    pub error: String,
}

/// Response from `keel lead import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<Lead>,
    pub rejected: Vec<ImportRejection>,
}

/// Counts of projects by status for the dashboard header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProjectCounts {
    pub planned: u32,
    pub active: u32,
    pub on_hold: u32,
    pub completed: u32,
    pub cancelled: u32,
}

/// Response from `keel dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Dashboard {
    pub month: Month,
    pub projects: ProjectCounts,
    pub pipeline: PipelineSummary,
    pub financials: FinancialSummary,
    pub csat: CsatSummary,
    pub utilization: Vec<MemberUtilization>,
}
