//! Public survey link configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SurveyConfig {
    /// Base URL respondents open, e.g. `https://keel.example.com/s`.
    #[serde(default)]
    pub public_base_url: String,
}

impl SurveyConfig {
    /// The shareable link for a survey token, or the bare token when no base URL is set.
    #[must_use]
    pub fn public_link(&self, token: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        if base.is_empty() {
            token.to_string()
        } else {
            format!("{base}/{token}")
        }
    }
}
