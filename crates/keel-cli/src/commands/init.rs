use std::path::{Path, PathBuf};

use anyhow::Context;
use keel_config::{IdentityConfig, KeelConfig, PROJECT_DIR};
use serde_json::json;

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `keel init`: create `.keel/config.toml` and the local database.
pub async fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = init_root(flags.project_dir.as_deref())?;
    let config_path = KeelConfig::project_config_path(&root);
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        );
    }

    // Flags win over whatever identity the environment or global config carries.
    let layered = bootstrap::load_config(&root)?;
    let identity = IdentityConfig {
        org_id: args.org.clone().unwrap_or_else(|| layered.identity.org_id.clone()),
        user_id: args.user.clone().unwrap_or_else(|| layered.identity.user_id.clone()),
    };
    identity
        .tenant()
        .context("keel init needs --org and --user (or KEEL_IDENTITY__ORG_ID and KEEL_IDENTITY__USER_ID)")?;

    // The starter file carries identity only; credentials stay in env or .env.
    let starter = KeelConfig {
        identity: identity.clone(),
        ..KeelConfig::default()
    };
    std::fs::create_dir_all(root.join(PROJECT_DIR))
        .with_context(|| format!("failed to create {}", root.join(PROJECT_DIR).display()))?;
    std::fs::write(&config_path, starter.to_toml()?)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "wrote project config");

    let effective = KeelConfig {
        identity,
        ..layered
    };
    let remote = effective.database.is_remote();
    let ctx = AppContext::init(root.clone(), effective)
        .await
        .context("config written, but the database could not be opened")?;

    output(
        &json!({
            "root": root.display().to_string(),
            "config": config_path.display().to_string(),
            "org_id": ctx.service.org_id(),
            "user_id": ctx.service.actor(),
            "database": if remote { "remote" } else { "local" },
        }),
        flags.format,
    )
}

/// `-C` (or its parent when it names `.keel` itself), else the cwd.
fn init_root(project_dir: Option<&str>) -> anyhow::Result<PathBuf> {
    let Some(dir) = project_dir else {
        return std::env::current_dir().context("failed to read current directory");
    };
    let dir = PathBuf::from(dir);
    if dir.file_name().is_some_and(|name| name == PROJECT_DIR) {
        return dir
            .parent()
            .map(Path::to_path_buf)
            .context("invalid --project-dir: '.keel' directory has no parent");
    }
    if !dir.is_dir() {
        anyhow::bail!("invalid --project-dir '{}': directory does not exist", dir.display());
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::init_root;

    #[test]
    fn keel_dir_argument_resolves_to_parent() {
        let temp = TempDir::new().expect("tempdir should create");
        let keel = temp.path().join(".keel");
        let root = init_root(keel.to_str()).expect("root should resolve");
        assert_eq!(root, temp.path());
    }

    #[test]
    fn missing_directory_is_rejected() {
        let temp = TempDir::new().expect("tempdir should create");
        let missing = temp.path().join("nope");
        let err = init_root(missing.to_str()).expect_err("should fail");
        assert!(err.to_string().contains("does not exist"));
    }
}
