mod submit;

use keel_core::entities::{NewEsatQuestion, NewEsatSurvey};
use keel_core::enums::EsatSurveyStatus;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{EsatCommands, QuestionCommands};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_optional_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel esat`.
pub async fn handle(action: &EsatCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        EsatCommands::Create { title, description } => {
            let input = NewEsatSurvey {
                title: title.clone(),
                description: description.clone(),
            };
            output(&ctx.service.create_survey(&input).await?, flags.format)
        }
        EsatCommands::List { status, limit } => {
            let status = parse_optional_enum::<EsatSurveyStatus>(status.as_deref(), "status")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&ctx.service.list_surveys(status, limit).await?, flags.format)
        }
        EsatCommands::Get { id } => output(&ctx.service.get_survey_detail(id).await?, flags.format),
        EsatCommands::Open { id } => {
            let survey = ctx.service.transition_survey(id, EsatSurveyStatus::Open).await?;
            let link = ctx.config.survey.public_link(&survey.public_token);
            output(&json!({ "survey": survey, "link": link }), flags.format)
        }
        EsatCommands::Close { id } => {
            let survey = ctx.service.transition_survey(id, EsatSurveyStatus::Closed).await?;
            output(&survey, flags.format)
        }
        EsatCommands::Delete { id } => {
            ctx.service.delete_survey(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        EsatCommands::Question { action } => handle_question(action, ctx, flags).await,
        EsatCommands::Submit {
            token,
            answer,
            respondent,
        } => submit::run(token, answer, respondent.as_deref(), ctx, flags).await,
        EsatCommands::Responses { id } => output(&ctx.service.list_responses(id).await?, flags.format),
        EsatCommands::Report { id } => output(&ctx.service.esat_report(id).await?, flags.format),
        EsatCommands::Link { id } => {
            let survey = ctx.service.get_survey(id).await?;
            if survey.status != EsatSurveyStatus::Open {
                tracing::warn!(
                    survey = %survey.id,
                    status = %survey.status,
                    "survey is not open; submissions will be refused"
                );
            }
            let link = ctx.config.survey.public_link(&survey.public_token);
            output(
                &json!({
                    "survey_id": survey.id,
                    "status": survey.status,
                    "token": survey.public_token,
                    "link": link,
                }),
                flags.format,
            )
        }
    }
}

async fn handle_question(
    action: &QuestionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        QuestionCommands::Add {
            survey,
            category,
            prompt,
            optional,
            position,
        } => {
            let input = NewEsatQuestion {
                category: category.clone(),
                prompt: prompt.clone(),
                required: !optional,
                position: *position,
            };
            output(&ctx.service.add_question(survey, &input).await?, flags.format)
        }
        QuestionCommands::List { survey } => {
            output(&ctx.service.list_questions(survey).await?, flags.format)
        }
        QuestionCommands::Remove { id } => {
            ctx.service.remove_question(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
