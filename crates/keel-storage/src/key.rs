//! Object key layout: `{org_id}/{scope}/{owner_id}/{stamp}-{file_name}`.
//!
//! Every segment is sanitized so user-supplied names cannot escape their
//! prefix or collide with path syntax.

use chrono::Utc;

const MAX_SEGMENT_LEN: usize = 128;

/// Which kind of record owns an attachment. Used as the key's scope segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    Document,
    Project,
}

impl KeyScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "documents",
            Self::Project => "projects",
        }
    }
}

/// Replace anything other than ASCII alphanumerics, `.`, `-`, and `_` with a
/// single `_`, strip leading dots and underscores, and cap the length.
#[must_use]
pub fn sanitize_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
            out.push(ch);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let trimmed = out.trim_start_matches(['.', '_']).trim_end_matches('_');
    if trimmed.is_empty() {
        return "_".to_string();
    }
    trimmed.chars().take(MAX_SEGMENT_LEN).collect()
}

/// Build a fresh key for an upload. The millisecond stamp keeps repeated
/// uploads of the same file name apart.
#[must_use]
pub fn attachment_key(org_id: &str, scope: KeyScope, owner_id: &str, file_name: &str) -> String {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
    format!(
        "{}/{}/{}/{stamp}-{}",
        sanitize_segment(org_id),
        scope.as_str(),
        sanitize_segment(owner_id),
        sanitize_segment(file_name)
    )
}
