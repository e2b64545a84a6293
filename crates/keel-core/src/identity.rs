use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The tenant a service call runs as.
///
/// Every read and write in `keel-db` is scoped to `org_id`; `user_id` is
/// recorded as the actor on audit entries. Produced from the `[identity]`
/// config section by `keel-cli`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tenant {
    pub org_id: String,
    pub user_id: String,
}

impl Tenant {
    #[must_use]
    pub fn new(org_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            user_id: user_id.into(),
        }
    }
}
