use keel_config::KeelConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &KeelConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &KeelConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let sections = [
        (
            "Database",
            "KEEL_DATABASE",
            config.database.is_remote(),
            "KEEL_DATABASE__URL",
        ),
        (
            "Identity",
            "KEEL_IDENTITY",
            config.identity.is_configured(),
            "KEEL_IDENTITY__ORG_ID",
        ),
        (
            "Storage",
            "KEEL_STORAGE",
            config.storage.is_s3_configured(),
            "KEEL_STORAGE__BUCKET",
        ),
    ];

    sections
        .into_iter()
        .filter(|(_, prefix, configured, _)| !configured && has_single_underscore_key(&env_keys, prefix))
        .map(|(name, prefix, _, example)| {
            format!(
                "{name} config appears default while {prefix}_* env vars exist. Use double underscores (example: {example})."
            )
        })
        .collect()
}

/// `KEEL_DATABASE_URL` instead of `KEEL_DATABASE__URL`.
fn has_single_underscore_key(keys: &[String], prefix: &str) -> bool {
    let nested = format!("{prefix}__");
    keys.iter()
        .any(|key| key.starts_with(prefix) && !key.starts_with(&nested))
}
