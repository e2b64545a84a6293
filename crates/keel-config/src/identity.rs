//! Tenant identity the CLI runs as.

use keel_core::identity::Tenant;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Organization every query is scoped to.
    #[serde(default)]
    pub org_id: String,

    /// Recorded as the actor on audit entries.
    #[serde(default)]
    pub user_id: String,
}

impl IdentityConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.org_id.trim().is_empty() && !self.user_id.trim().is_empty()
    }

    /// The tenant to scope service calls to.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` naming the missing fields.
    pub fn tenant(&self) -> Result<Tenant, ConfigError> {
        let mut missing = Vec::new();
        if self.org_id.trim().is_empty() {
            missing.push("org_id");
        }
        if self.user_id.trim().is_empty() {
            missing.push("user_id");
        }
        if !missing.is_empty() {
            return Err(ConfigError::NotConfigured {
                section: "identity".into(),
                missing: missing.join(", "),
            });
        }
        Ok(Tenant::new(self.org_id.trim(), self.user_id.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_requires_both_ids() {
        let config = IdentityConfig {
            org_id: "org_acme".into(),
            user_id: "  ".into(),
        };
        let err = config.tenant().unwrap_err();
        assert!(err.to_string().contains("user_id"));
        assert!(!err.to_string().contains("org_id"));
    }

    #[test]
    fn tenant_trims_ids() {
        let config = IdentityConfig {
            org_id: " org_acme ".into(),
            user_id: "usr_1".into(),
        };
        assert_eq!(config.tenant().unwrap(), Tenant::new("org_acme", "usr_1"));
    }
}
