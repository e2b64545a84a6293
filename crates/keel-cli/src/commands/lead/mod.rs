mod import;

use std::path::Path;

use keel_core::analytics::pipeline_summary;
use keel_core::entities::NewLead;
use keel_core::enums::LeadStage;
use keel_db::updates::LeadUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::LeadCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{
    clearable, non_blank, parse_enum, parse_optional_date, parse_optional_enum,
};
use crate::commands::shared::update::require_any_field;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel lead`.
pub async fn handle(action: &LeadCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        LeadCommands::Create {
            company,
            contact_name,
            contact_email,
            stage,
            value,
            probability,
            owner,
            expected_close,
            notes,
        } => {
            let input = NewLead {
                company: company.clone(),
                contact_name: contact_name.clone(),
                contact_email: contact_email.clone(),
                stage: parse_optional_enum::<LeadStage>(stage.as_deref(), "stage")?,
                value: *value,
                probability: *probability,
                owner: owner.clone(),
                expected_close: parse_optional_date(expected_close.as_deref(), "expected close")?,
                notes: notes.clone(),
            };
            output(&ctx.service.create_lead(&input).await?, flags.format)
        }
        LeadCommands::List { stage, limit } => {
            let stage = parse_optional_enum::<LeadStage>(stage.as_deref(), "stage")?;
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&ctx.service.list_leads(stage, Some(limit)).await?, flags.format)
        }
        LeadCommands::Get { id } => output(&ctx.service.get_lead(id).await?, flags.format),
        LeadCommands::Update {
            id,
            company,
            contact_name,
            contact_email,
            value,
            probability,
            owner,
            expected_close,
            notes,
        } => {
            require_any_field(&[
                ("--company", company.is_some()),
                ("--contact-name", contact_name.is_some()),
                ("--contact-email", contact_email.is_some()),
                ("--value", value.is_some()),
                ("--probability", probability.is_some()),
                ("--owner", owner.is_some()),
                ("--expected-close", expected_close.is_some()),
                ("--notes", notes.is_some()),
            ])?;

            let mut builder = LeadUpdateBuilder::new();
            if let Some(company) = company {
                builder = builder.company(company.as_str());
            }
            if let Some(name) = clearable(contact_name.as_deref()) {
                builder = builder.contact_name(name);
            }
            if let Some(email) = clearable(contact_email.as_deref()) {
                builder = builder.contact_email(email);
            }
            if let Some(value) = value {
                builder = builder.value(*value);
            }
            if let Some(probability) = probability {
                builder = builder.probability(*probability);
            }
            if let Some(owner) = clearable(owner.as_deref()) {
                builder = builder.owner(owner);
            }
            if let Some(date) = expected_close {
                builder = builder
                    .expected_close(parse_optional_date(non_blank(date), "expected close")?);
            }
            if let Some(notes) = clearable(notes.as_deref()) {
                builder = builder.notes(notes);
            }

            output(&ctx.service.update_lead(id, &builder.build()).await?, flags.format)
        }
        LeadCommands::Stage { id, stage, reason } => {
            let to = parse_enum::<LeadStage>(stage, "stage")?;
            let lead = ctx.service.transition_lead(id, to, reason.as_deref()).await?;
            output(&lead, flags.format)
        }
        LeadCommands::Delete { id } => {
            ctx.service.delete_lead(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        LeadCommands::Search { query, limit } => {
            let limit = effective_limit(*limit, flags.limit, ctx.default_limit());
            output(&ctx.service.search_leads(query, limit).await?, flags.format)
        }
        LeadCommands::Import { path } => import::run(Path::new(path), ctx, flags).await,
        LeadCommands::Export { path } => {
            let written = ctx.service.export_leads(Path::new(path)).await?;
            output(&json!({ "path": path, "exported": written }), flags.format)
        }
        LeadCommands::Pipeline => {
            let leads = ctx.service.list_leads(None, None).await?;
            output(&pipeline_summary(&leads), flags.format)
        }
    }
}
