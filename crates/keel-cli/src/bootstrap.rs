use std::path::{Path, PathBuf};

use anyhow::Context;
use keel_config::{KeelConfig, PROJECT_DIR};

use crate::context;

/// Read `<root>/.env` (if any) into the process environment, then layer the
/// config sources for `root`.
pub fn load_config(root: &Path) -> anyhow::Result<KeelConfig> {
    load_project_dotenv(root)?;
    KeelConfig::load_in(root).context("failed to load keel configuration")
}

fn load_project_dotenv(root: &Path) -> anyhow::Result<()> {
    let env_path = root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}

/// The project root from `-C`, or the nearest ancestor of the cwd holding `.keel`.
pub fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);
        if explicit.file_name().is_some_and(|name| name == PROJECT_DIR) {
            return explicit
                .parent()
                .map(Path::to_path_buf)
                .context("invalid --project-dir: '.keel' directory has no parent");
        }
        if explicit.join(PROJECT_DIR).is_dir() {
            return Ok(explicit);
        }
        anyhow::bail!(
            "not a keel project: '{}' has no .keel directory. Run 'keel init' there first.",
            explicit.display()
        );
    }

    let start = std::env::current_dir().context("failed to read current directory")?;
    context::find_project_root(&start)
        .context("not a keel project (no .keel directory found). Run 'keel init' first.")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::resolve_project_root;

    #[test]
    fn explicit_dir_with_keel_is_accepted() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir(temp.path().join(".keel")).expect(".keel should create");

        let root = resolve_project_root(temp.path().to_str()).expect("root should resolve");
        assert_eq!(root, temp.path());
    }

    #[test]
    fn explicit_keel_dir_resolves_to_its_parent() {
        let temp = TempDir::new().expect("tempdir should create");
        let keel_dir = temp.path().join(".keel");
        std::fs::create_dir(&keel_dir).expect(".keel should create");

        let root = resolve_project_root(keel_dir.to_str()).expect("root should resolve");
        assert_eq!(root, temp.path());
    }

    #[test]
    fn explicit_dir_without_keel_is_rejected() {
        let temp = TempDir::new().expect("tempdir should create");
        let err = resolve_project_root(temp.path().to_str()).expect_err("should fail");
        assert!(err.to_string().contains("no .keel directory"));
    }
}
