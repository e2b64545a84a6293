use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{percent, round2};
use crate::entities::Lead;
use crate::enums::LeadStage;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StageSummary {
    pub stage: LeadStage,
    pub count: u32,
    pub total_value: f64,
    pub weighted_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PipelineSummary {
    /// One row per stage, in pipeline order.
    pub stages: Vec<StageSummary>,
    pub open_count: u32,
    pub open_value: f64,
    pub weighted_open_value: f64,
    pub won_value: f64,
    /// Won / (won + lost) × 100; `None` until a lead has closed.
    pub win_rate: Option<f64>,
}

/// Roll leads up per pipeline stage.
#[must_use]
pub fn pipeline_summary(leads: &[Lead]) -> PipelineSummary {
    let mut stages: Vec<StageSummary> = LeadStage::ALL
        .iter()
        .map(|&stage| StageSummary {
            stage,
            count: 0,
            total_value: 0.0,
            weighted_value: 0.0,
        })
        .collect();

    for lead in leads {
        if let Some(slot) = stages.iter_mut().find(|s| s.stage == lead.stage) {
            slot.count += 1;
            slot.total_value += lead.value;
            slot.weighted_value += lead.weighted_value();
        }
    }
    for slot in &mut stages {
        slot.total_value = round2(slot.total_value);
        slot.weighted_value = round2(slot.weighted_value);
    }

    let open = stages.iter().filter(|s| s.stage.is_open());
    let open_count = open.clone().map(|s| s.count).sum();
    let open_value = round2(open.clone().map(|s| s.total_value).sum());
    let weighted_open_value = round2(open.map(|s| s.weighted_value).sum());

    let stage = |st: LeadStage| stages.iter().find(|s| s.stage == st);
    let won = stage(LeadStage::Won).map_or(0, |s| s.count);
    let lost = stage(LeadStage::Lost).map_or(0, |s| s.count);
    let won_value = stage(LeadStage::Won).map_or(0.0, |s| s.total_value);

    PipelineSummary {
        open_count,
        open_value,
        weighted_open_value,
        won_value,
        win_rate: percent(f64::from(won), f64::from(won + lost)),
        stages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead(stage: LeadStage, value: f64, probability: u8) -> Lead {
        let now = Utc::now();
        Lead {
            id: "led-00000000".into(),
            org_id: "org".into(),
            company: "Acme".into(),
            contact_name: None,
            contact_email: None,
            stage,
            value,
            probability,
            owner: None,
            expected_close: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn rolls_up_open_pipeline() {
        let summary = pipeline_summary(&[
            lead(LeadStage::New, 1_000.0, 10),
            lead(LeadStage::Proposal, 10_000.0, 50),
            lead(LeadStage::Won, 4_000.0, 100),
            lead(LeadStage::Lost, 2_000.0, 0),
            lead(LeadStage::Lost, 3_000.0, 0),
        ]);

        assert_eq!(summary.stages.len(), LeadStage::ALL.len());
        assert_eq!(summary.open_count, 2);
        assert_eq!(summary.open_value, 11_000.0);
        assert_eq!(summary.weighted_open_value, 5_100.0);
        assert_eq!(summary.won_value, 4_000.0);
        assert_eq!(summary.win_rate, Some(33.33));
    }

    #[test]
    fn win_rate_is_none_without_closed_leads() {
        let summary = pipeline_summary(&[lead(LeadStage::Qualified, 500.0, 30)]);
        assert_eq!(summary.win_rate, None);
    }
}
