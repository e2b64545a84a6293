//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

fn default_currency() -> String {
    String::from("USD")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Default result limit for list/search commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// ISO currency code shown next to amounts in table output.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            currency: default_currency(),
        }
    }
}
