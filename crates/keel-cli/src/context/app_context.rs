use std::path::{Path, PathBuf};

use anyhow::Context;
use keel_config::KeelConfig;
use keel_db::service::KeelService;
use keel_storage::AttachmentStore;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: KeelService,
    pub config: KeelConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Open the tenant's database described by `config`.
    pub async fn init(project_root: PathBuf, config: KeelConfig) -> anyhow::Result<Self> {
        let tenant = config
            .identity
            .tenant()
            .context("set [identity] in .keel/config.toml or run 'keel init --org <ORG> --user <USER>'")?;

        let service = if config.database.is_remote() {
            if !config.database.remote_is_complete() {
                anyhow::bail!("database.url is set but database.auth_token is empty");
            }
            tracing::debug!(url = %config.database.url, org = %tenant.org_id, "using remote database");
            KeelService::new_remote(&config.database.url, &config.database.auth_token, tenant)
                .await
                .context("failed to connect to remote keel database")?
        } else {
            let path = resolve_local_path(&project_root, &config.database.local_path());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            tracing::debug!(path = %path.display(), org = %tenant.org_id, "using local database");
            KeelService::new_local(&path.to_string_lossy(), tenant)
                .await
                .context("failed to open local keel database")?
        };

        Ok(Self {
            service,
            config,
            project_root,
        })
    }

    /// Attachment store for `[storage]`; local paths resolve against the project root.
    pub fn storage(&self) -> anyhow::Result<AttachmentStore> {
        AttachmentStore::from_config(&self.config.storage, &self.project_root)
            .context("failed to initialize attachment storage")
    }

    /// Default page size when neither the command nor `--limit` sets one.
    pub const fn default_limit(&self) -> u32 {
        self.config.general.default_limit
    }
}

/// Relative database paths are taken from the project root, not the cwd.
fn resolve_local_path(project_root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() || configured.as_os_str() == ":memory:" {
        configured.to_path_buf()
    } else {
        project_root.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::resolve_local_path;

    #[test]
    fn relative_database_path_joins_project_root() {
        let resolved = resolve_local_path(Path::new("/srv/acme"), Path::new(".keel/keel.db"));
        assert_eq!(resolved, Path::new("/srv/acme/.keel/keel.db"));
    }

    #[test]
    fn absolute_and_memory_paths_are_kept() {
        assert_eq!(
            resolve_local_path(Path::new("/srv/acme"), Path::new("/data/keel.db")),
            Path::new("/data/keel.db")
        );
        assert_eq!(
            resolve_local_path(Path::new("/srv/acme"), Path::new(":memory:")),
            Path::new(":memory:")
        );
    }
}
