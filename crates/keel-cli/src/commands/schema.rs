use keel_schema::SchemaRegistry;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `keel schema`. Needs no project or database.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    let Some(name) = args.type_name.as_deref() else {
        return output(&json!({ "schemas": registry.list() }), flags.format);
    };

    let normalized = name.trim().replace('-', "_");
    match registry.get(&normalized) {
        Some(schema) => output(schema, flags.format),
        None => anyhow::bail!(
            "unknown schema '{name}'. Available: {}",
            registry.list().join(", ")
        ),
    }
}
