//! ID prefix constants.
//!
//! Every Keel record ID has the form `{prefix}-{8 hex chars}`, e.g. `prj-a3f8b2c1`.
//! The random part is generated by the database (`randomblob(4)`).

pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_FINANCIAL: &str = "fin";
pub const PREFIX_LEAD: &str = "led";
pub const PREFIX_MEMBER: &str = "mbr";
pub const PREFIX_ALLOCATION: &str = "alc";
pub const PREFIX_CSAT: &str = "csa";
pub const PREFIX_ESAT_SURVEY: &str = "esv";
pub const PREFIX_ESAT_QUESTION: &str = "esq";
pub const PREFIX_ESAT_RESPONSE: &str = "esr";
pub const PREFIX_ESAT_ANSWER: &str = "esa";
pub const PREFIX_DAILY_TASK: &str = "dtk";
pub const PREFIX_DOCUMENT: &str = "doc";
pub const PREFIX_DOCUMENT_VERSION: &str = "dvr";
pub const PREFIX_ATTACHMENT: &str = "att";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_PROJECT,
    PREFIX_FINANCIAL,
    PREFIX_LEAD,
    PREFIX_MEMBER,
    PREFIX_ALLOCATION,
    PREFIX_CSAT,
    PREFIX_ESAT_SURVEY,
    PREFIX_ESAT_QUESTION,
    PREFIX_ESAT_RESPONSE,
    PREFIX_ESAT_ANSWER,
    PREFIX_DAILY_TASK,
    PREFIX_DOCUMENT,
    PREFIX_DOCUMENT_VERSION,
    PREFIX_ATTACHMENT,
    PREFIX_AUDIT,
];

/// Check that `id` looks like `{prefix}-{8 hex}`.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn prefixes_are_unique() {
        let set: HashSet<_> = ALL_PREFIXES.iter().collect();
        assert_eq!(set.len(), ALL_PREFIXES.len());
    }

    #[test]
    fn has_prefix_checks_shape() {
        assert!(has_prefix("prj-a3f8b2c1", PREFIX_PROJECT));
        assert!(!has_prefix("prj-a3f8", PREFIX_PROJECT));
        assert!(!has_prefix("led-a3f8b2c1", PREFIX_PROJECT));
        assert!(!has_prefix("prj-zzzzzzzz", PREFIX_PROJECT));
    }
}
