use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::round2;
use crate::entities::CsatEntry;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProjectScore {
    pub project_id: String,
    pub count: u32,
    pub average: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CsatSummary {
    pub count: u32,
    pub average: Option<f64>,
    /// Sorted by project ID.
    pub by_project: Vec<ProjectScore>,
}

/// Average CSAT scores overall and per project.
#[must_use]
pub fn csat_summary(entries: &[CsatEntry]) -> CsatSummary {
    let mut by_project: BTreeMap<&str, (u32, f64)> = BTreeMap::new();
    let mut total = 0.0;
    for entry in entries {
        let slot = by_project.entry(entry.project_id.as_str()).or_default();
        slot.0 += 1;
        slot.1 += entry.score;
        total += entry.score;
    }

    let count = u32::try_from(entries.len()).unwrap_or(u32::MAX);
    CsatSummary {
        count,
        average: (count > 0).then(|| round2(total / f64::from(count))),
        by_project: by_project
            .into_iter()
            .map(|(project_id, (count, sum))| ProjectScore {
                project_id: project_id.to_string(),
                count,
                average: round2(sum / f64::from(count)),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(project_id: &str, score: f64) -> CsatEntry {
        CsatEntry {
            id: format!("csa-{project_id}-{score}"),
            org_id: "org".into(),
            project_id: project_id.into(),
            month: "2026-05".parse().unwrap(),
            score,
            respondent: None,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn groups_by_project() {
        let summary = csat_summary(&[entry("prj-b", 80.0), entry("prj-a", 90.0), entry("prj-b", 70.0)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Some(80.0));
        assert_eq!(summary.by_project.len(), 2);
        assert_eq!(summary.by_project[0].project_id, "prj-a");
        assert_eq!(summary.by_project[1].average, 75.0);
    }

    #[test]
    fn no_entries_no_average() {
        assert_eq!(csat_summary(&[]), CsatSummary::default());
    }
}
