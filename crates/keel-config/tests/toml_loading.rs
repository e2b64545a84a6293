//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use keel_config::KeelConfig;
use pretty_assertions::assert_eq;

#[test]
fn loads_database_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
url = "libsql://keel-acme.turso.io"
auth_token = "db-token"
"#,
        )?;

        let config: KeelConfig = Figment::from(Serialized::defaults(KeelConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.url, "libsql://keel-acme.turso.io");
        assert_eq!(config.database.auth_token, "db-token");
        assert_eq!(config.database.path, ".keel/keel.db");
        assert!(config.database.remote_is_complete());
        Ok(())
    });
}

#[test]
fn loads_storage_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[storage]
bucket = "keel-files"
endpoint = "http://localhost:9000"
region = "us-east-1"
access_key_id = "minio"
secret_access_key = "minio-secret"
signed_url_ttl_secs = 600
"#,
        )?;

        let config: KeelConfig = Figment::from(Serialized::defaults(KeelConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.storage.bucket, "keel-files");
        assert_eq!(config.storage.endpoint, "http://localhost:9000");
        assert_eq!(config.storage.signed_url_ttl_secs, 600);
        assert_eq!(config.storage.local_dir, ".keel/attachments");
        assert!(config.storage.is_s3_configured());
        Ok(())
    });
}

#[test]
fn loads_identity_and_general_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[identity]
org_id = "org_acme"
user_id = "usr_ana"

[survey]
public_base_url = "https://keel.example.com/s"

[general]
default_limit = 50
currency = "EUR"
"#,
        )?;

        let config: KeelConfig = Figment::from(Serialized::defaults(KeelConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        let tenant = config.identity.tenant().expect("identity configured");
        assert_eq!(tenant.org_id, "org_acme");
        assert_eq!(tenant.user_id, "usr_ana");
        assert_eq!(config.general.default_limit, 50);
        assert_eq!(config.general.currency, "EUR");
        assert_eq!(
            config.survey.public_link("tok"),
            "https://keel.example.com/s/tok"
        );
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[identity]
org_id = "org_from_toml"
user_id = "usr_toml"
"#,
        )?;
        jail.set_env("KEEL_IDENTITY__ORG_ID", "org_from_env");

        let config: KeelConfig = Figment::from(Serialized::defaults(KeelConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("KEEL_").split("__"))
            .extract()?;

        assert_eq!(config.identity.org_id, "org_from_env");
        assert_eq!(config.identity.user_id, "usr_toml");
        Ok(())
    });
}

#[test]
fn project_config_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        jail.create_dir(".keel")?;
        jail.create_file(
            ".keel/config.toml",
            r#"
[general]
default_limit = 7
"#,
        )?;

        let config: KeelConfig = KeelConfig::figment().extract()?;
        assert_eq!(config.general.default_limit, 7);
        Ok(())
    });
}

#[test]
fn wrong_type_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[general]
default_limit = "many"
"#,
        )?;

        let result: Result<KeelConfig, _> =
            Figment::from(Serialized::defaults(KeelConfig::default()))
                .merge(Toml::file("config.toml"))
                .extract();
        assert!(result.is_err());
        Ok(())
    });
}
