//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! fix the shape of the most common ones.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::UpsertOutcome;

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
}

/// Detail for `AuditAction::Upserted` on allocations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AllocationUpsertDetail {
    pub outcome: UpsertOutcome,
    pub previous_percentage: Option<f64>,
    pub percentage: f64,
}

/// Detail for document writes that produce a new version.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VersionDetail {
    pub version: u32,
    /// Set when the version was produced by restoring an older one.
    pub restored_from: Option<u32>,
}

/// Detail for `AuditAction::Submitted` on ESAT responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubmittedDetail {
    pub survey_id: String,
    pub answers: u32,
}

/// Detail for `AuditAction::Imported`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportedDetail {
    pub source: String,
    pub line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_detail_serializes_outcome_snake_case() {
        let detail = AllocationUpsertDetail {
            outcome: UpsertOutcome::Updated,
            previous_percentage: Some(40.0),
            percentage: 60.0,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["outcome"], "updated");
        assert_eq!(json["previous_percentage"], 40.0);
    }
}
