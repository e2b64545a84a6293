use keel_core::enums::{AuditAction, EntityType};
use keel_db::repos::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_optional_enum;
use crate::context::AppContext;
use crate::output::output;

const AUDIT_FALLBACK_LIMIT: u32 = 50;

/// Handle `keel audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        entity_type: parse_optional_enum::<EntityType>(args.entity_type.as_deref(), "entity-type")?,
        entity_id: args.entity_id.clone(),
        action: parse_optional_enum::<AuditAction>(args.action.as_deref(), "action")?,
        actor: args.actor.clone(),
        limit: Some(effective_limit(None, flags.limit, AUDIT_FALLBACK_LIMIT)),
    };

    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}
