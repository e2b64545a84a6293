use keel_core::entities::NewTeamMember;
use keel_db::updates::MemberUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MemberCommands;
use crate::commands::shared::parse::clearable;
use crate::commands::shared::update::require_any_field;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel member`.
pub async fn handle(
    action: &MemberCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MemberCommands::Create {
            name,
            email,
            role,
            monthly_cost,
        } => {
            let input = NewTeamMember {
                name: name.clone(),
                email: email.clone(),
                role: role.clone(),
                monthly_cost: *monthly_cost,
            };
            let member = ctx.service.create_team_member(&input).await?;
            output(&member, flags.format)
        }
        MemberCommands::List { all } => {
            let mut members = ctx.service.list_team_members(*all).await?;
            if let Some(limit) = flags.limit {
                members.truncate(usize::try_from(limit)?);
            }
            output(&members, flags.format)
        }
        MemberCommands::Get { id } => output(&ctx.service.get_team_member(id).await?, flags.format),
        MemberCommands::Update {
            id,
            name,
            email,
            role,
            monthly_cost,
            active,
        } => {
            require_any_field(&[
                ("--name", name.is_some()),
                ("--email", email.is_some()),
                ("--role", role.is_some()),
                ("--monthly-cost", monthly_cost.is_some()),
                ("--active", active.is_some()),
            ])?;

            let mut builder = MemberUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if let Some(email) = clearable(email.as_deref()) {
                builder = builder.email(email);
            }
            if let Some(role) = clearable(role.as_deref()) {
                builder = builder.role(role);
            }
            if let Some(cost) = monthly_cost {
                builder = builder.monthly_cost(*cost);
            }
            if let Some(active) = active {
                builder = builder.active(*active);
            }

            let member = ctx.service.update_team_member(id, &builder.build()).await?;
            output(&member, flags.format)
        }
        MemberCommands::Delete { id } => {
            ctx.service.delete_team_member(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
