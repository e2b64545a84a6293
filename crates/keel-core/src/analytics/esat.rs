use std::collections::{BTreeMap, HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::round2;
use crate::entities::{EsatAnswer, EsatQuestion, EsatResponse};

/// Average Likert value for one question category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CategoryAverage {
    pub category: String,
    pub questions: u32,
    pub answers: u32,
    /// `None` when nobody answered a question in this category.
    pub average: Option<f64>,
}

/// Aggregated results of one ESAT survey.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EsatReport {
    pub survey_id: String,
    pub response_count: u32,
    pub complete_responses: u32,
    /// Complete responses as a percentage of all responses; 0 with no responses.
    pub completion_rate: f64,
    /// Mean share of questions answered per response, as a percentage.
    pub answer_coverage: f64,
    /// Average over every answer in the survey.
    pub overall_average: Option<f64>,
    /// Sorted by category name.
    pub categories: Vec<CategoryAverage>,
}

/// Aggregate ESAT answers per category and overall.
///
/// A response is complete when it answers every required question; when no
/// question is required, it must answer every question. Answers pointing at
/// questions or responses outside the given slices are ignored, so a question
/// removed after responses came in drops out of the report.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn esat_report(
    survey_id: &str,
    questions: &[EsatQuestion],
    responses: &[EsatResponse],
    answers: &[EsatAnswer],
) -> EsatReport {
    let question_by_id: HashMap<&str, &EsatQuestion> =
        questions.iter().map(|q| (q.id.as_str(), q)).collect();
    let response_ids: HashSet<&str> = responses.iter().map(|r| r.id.as_str()).collect();

    let mut by_category: BTreeMap<&str, (u32, u32, u64)> = BTreeMap::new();
    for question in questions {
        by_category.entry(question.category.as_str()).or_default().0 += 1;
    }

    let mut answered: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut total_sum = 0u64;
    let mut total_count = 0u32;

    for answer in answers {
        let Some(question) = question_by_id.get(answer.question_id.as_str()) else {
            continue;
        };
        if !response_ids.contains(answer.response_id.as_str()) {
            continue;
        }
        let entry = by_category.entry(question.category.as_str()).or_default();
        entry.1 += 1;
        entry.2 += u64::from(answer.value);
        total_sum += u64::from(answer.value);
        total_count += 1;
        answered
            .entry(answer.response_id.as_str())
            .or_default()
            .insert(question.id.as_str());
    }

    let required: Vec<&str> = if questions.iter().any(|q| q.required) {
        questions
            .iter()
            .filter(|q| q.required)
            .map(|q| q.id.as_str())
            .collect()
    } else {
        questions.iter().map(|q| q.id.as_str()).collect()
    };

    let empty = HashSet::new();
    let mut complete = 0u32;
    let mut coverage_sum = 0.0;
    for response in responses {
        let got = answered.get(response.id.as_str()).unwrap_or(&empty);
        if required.iter().all(|id| got.contains(id)) {
            complete += 1;
        }
        if !questions.is_empty() {
            coverage_sum += got.len() as f64 / questions.len() as f64;
        }
    }

    let response_count = u32::try_from(responses.len()).unwrap_or(u32::MAX);
    let (completion_rate, answer_coverage) = if response_count == 0 {
        (0.0, 0.0)
    } else {
        (
            round2(f64::from(complete) / f64::from(response_count) * 100.0),
            round2(coverage_sum / f64::from(response_count) * 100.0),
        )
    };

    let categories = by_category
        .into_iter()
        .map(|(category, (questions, answers, sum))| CategoryAverage {
            category: category.to_string(),
            questions,
            answers,
            average: (answers > 0).then(|| round2(sum as f64 / f64::from(answers))),
        })
        .collect();

    EsatReport {
        survey_id: survey_id.to_string(),
        response_count,
        complete_responses: complete,
        completion_rate,
        answer_coverage,
        overall_average: (total_count > 0).then(|| round2(total_sum as f64 / f64::from(total_count))),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn question(id: &str, category: &str, required: bool) -> EsatQuestion {
        EsatQuestion {
            id: id.into(),
            org_id: "org".into(),
            survey_id: "esv-1".into(),
            category: category.into(),
            prompt: format!("prompt {id}"),
            position: 0,
            required,
            created_at: Utc::now(),
        }
    }

    fn response(id: &str) -> EsatResponse {
        EsatResponse {
            id: id.into(),
            org_id: "org".into(),
            survey_id: "esv-1".into(),
            respondent: None,
            submitted_at: Utc::now(),
        }
    }

    fn answer(response_id: &str, question_id: &str, value: u8) -> EsatAnswer {
        EsatAnswer {
            id: format!("{response_id}-{question_id}"),
            response_id: response_id.into(),
            question_id: question_id.into(),
            value,
        }
    }

    #[test]
    fn empty_survey_reports_zeroes() {
        let report = esat_report("esv-1", &[], &[], &[]);
        assert_eq!(report.response_count, 0);
        assert_eq!(report.completion_rate, 0.0);
        assert_eq!(report.overall_average, None);
        assert!(report.categories.is_empty());
    }

    #[test]
    fn averages_per_category_and_overall() {
        let questions = [
            question("q1", "workload", true),
            question("q2", "workload", true),
            question("q3", "growth", false),
        ];
        let responses = [response("r1"), response("r2")];
        let answers = [
            answer("r1", "q1", 4),
            answer("r1", "q2", 2),
            answer("r1", "q3", 5),
            answer("r2", "q1", 3),
        ];

        let report = esat_report("esv-1", &questions, &responses, &answers);

        assert_eq!(report.response_count, 2);
        assert_eq!(report.complete_responses, 1);
        assert_eq!(report.completion_rate, 50.0);
        // (3/3 + 1/3) / 2
        assert_eq!(report.answer_coverage, 66.67);
        assert_eq!(report.overall_average, Some(3.5));
        assert_eq!(
            report.categories,
            vec![
                CategoryAverage {
                    category: "growth".into(),
                    questions: 1,
                    answers: 1,
                    average: Some(5.0),
                },
                CategoryAverage {
                    category: "workload".into(),
                    questions: 2,
                    answers: 3,
                    average: Some(3.0),
                },
            ]
        );
    }

    #[test]
    fn unanswered_category_has_no_average() {
        let questions = [question("q1", "workload", true), question("q2", "pay", false)];
        let responses = [response("r1")];
        let answers = [answer("r1", "q1", 5)];
        let report = esat_report("esv-1", &questions, &responses, &answers);
        let pay = report.categories.iter().find(|c| c.category == "pay").unwrap();
        assert_eq!(pay.average, None);
        assert_eq!(report.completion_rate, 100.0);
    }

    #[test]
    fn without_required_questions_all_must_be_answered() {
        let questions = [question("q1", "a", false), question("q2", "a", false)];
        let responses = [response("r1"), response("r2")];
        let answers = [
            answer("r1", "q1", 5),
            answer("r1", "q2", 5),
            answer("r2", "q1", 1),
        ];
        let report = esat_report("esv-1", &questions, &responses, &answers);
        assert_eq!(report.complete_responses, 1);
    }

    #[test]
    fn orphaned_answers_are_ignored() {
        let questions = [question("q1", "a", true)];
        let responses = [response("r1")];
        let answers = [
            answer("r1", "q1", 4),
            answer("r1", "removed", 1),
            answer("ghost", "q1", 1),
        ];
        let report = esat_report("esv-1", &questions, &responses, &answers);
        assert_eq!(report.overall_average, Some(4.0));
        assert_eq!(report.categories[0].answers, 1);
    }
}
