use anyhow::Context;
use keel_core::entities::{AnswerInput, EsatSubmission};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// `keel esat submit <token> --answer Q=V ...`: the public submission path,
/// addressed by survey token rather than tenant.
pub async fn run(
    token: &str,
    answers: &[String],
    respondent: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if answers.is_empty() {
        anyhow::bail!("At least one --answer QUESTION_ID=VALUE must be provided");
    }
    let submission = EsatSubmission {
        respondent: respondent.map(str::to_string),
        answers: answers
            .iter()
            .map(|raw| parse_answer(raw))
            .collect::<anyhow::Result<Vec<_>>>()?,
    };

    let response = ctx.service.submit_public_response(token, &submission).await?;
    output(&response, flags.format)
}

/// `esq-1a2b3c4d=4` → answer 4 to that question.
fn parse_answer(raw: &str) -> anyhow::Result<AnswerInput> {
    let (question, value) = raw
        .split_once('=')
        .with_context(|| format!("invalid answer '{raw}': expected QUESTION_ID=VALUE"))?;
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("invalid answer '{raw}': question id is empty");
    }
    let value = value
        .trim()
        .parse::<u8>()
        .with_context(|| format!("invalid answer '{raw}': value must be a number from 1 to 5"))?;
    Ok(AnswerInput {
        question_id: question.to_string(),
        value,
    })
}
