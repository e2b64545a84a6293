use keel_core::analytics::financial_summary;
use keel_core::entities::NewFinancialRecord;
use keel_core::enums::FinancialCategory;
use keel_db::repos::{AllocationFilter, FinancialFilter};
use keel_db::updates::FinancialUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FinanceCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{
    clearable, month_or_current, parse_enum, parse_month, parse_optional_enum,
    parse_optional_month,
};
use crate::commands::shared::update::require_any_field;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel finance`.
pub async fn handle(
    action: &FinanceCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FinanceCommands::Add {
            month,
            category,
            amount,
            project,
            description,
        } => {
            let input = NewFinancialRecord {
                project_id: project.clone(),
                month: parse_month(month)?,
                category: parse_enum::<FinancialCategory>(category, "category")?,
                amount: *amount,
                description: description.clone(),
            };
            let record = ctx.service.create_financial_record(&input).await?;
            output(&record, flags.format)
        }
        FinanceCommands::List {
            month,
            project,
            category,
            limit,
        } => {
            let filter = FinancialFilter {
                month: parse_optional_month(month.as_deref())?,
                project_id: project.clone(),
                category: parse_optional_enum(category.as_deref(), "category")?,
                limit: Some(effective_limit(*limit, flags.limit, ctx.default_limit())),
            };
            let records = ctx.service.list_financial_records(&filter).await?;
            output(&records, flags.format)
        }
        FinanceCommands::Get { id } => {
            output(&ctx.service.get_financial_record(id).await?, flags.format)
        }
        FinanceCommands::Update {
            id,
            month,
            category,
            amount,
            project,
            no_project,
            description,
        } => {
            require_any_field(&[
                ("--month", month.is_some()),
                ("--category", category.is_some()),
                ("--amount", amount.is_some()),
                ("--project", project.is_some()),
                ("--no-project", *no_project),
                ("--description", description.is_some()),
            ])?;

            let mut builder = FinancialUpdateBuilder::new();
            if let Some(month) = month {
                builder = builder.month(parse_month(month)?);
            }
            if let Some(category) = category {
                builder = builder.category(parse_enum(category, "category")?);
            }
            if let Some(amount) = amount {
                builder = builder.amount(*amount);
            }
            if *no_project {
                builder = builder.project_id(None);
            } else if let Some(project) = project {
                builder = builder.project_id(Some(project.clone()));
            }
            if let Some(description) = clearable(description.as_deref()) {
                builder = builder.description(description);
            }

            let record = ctx
                .service
                .update_financial_record(id, &builder.build())
                .await?;
            output(&record, flags.format)
        }
        FinanceCommands::Delete { id } => {
            ctx.service.delete_financial_record(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        FinanceCommands::Summary { month } => {
            let month = month_or_current(month.as_deref())?;
            let records = ctx
                .service
                .list_financial_records(&FinancialFilter {
                    month: Some(month),
                    ..FinancialFilter::default()
                })
                .await?;
            let allocations = ctx
                .service
                .list_allocations(&AllocationFilter {
                    month: Some(month),
                    ..AllocationFilter::default()
                })
                .await?;
            let members = ctx.service.list_team_members(true).await?;

            let summary = financial_summary(month, &records, &allocations, &members);
            let mut value = serde_json::to_value(summary)?;
            if let Some(fields) = value.as_object_mut() {
                fields.insert("currency".into(), json!(ctx.config.general.currency));
            }
            output(&value, flags.format)
        }
    }
}
