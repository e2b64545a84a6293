//! libSQL database configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    String::from(".keel/keel.db")
}

/// Where the database lives.
///
/// When `url` is set the CLI connects to a remote libSQL server (e.g. Turso)
/// with `auth_token`; otherwise it opens the local file at `path`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Local database file, relative to the working directory.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote database URL (e.g., `libsql://keel-acme.turso.io`).
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub auth_token: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty()
    }

    /// A remote URL without a token cannot connect.
    #[must_use]
    pub fn remote_is_complete(&self) -> bool {
        self.is_remote() && !self.auth_token.is_empty()
    }

    #[must_use]
    pub fn local_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}
