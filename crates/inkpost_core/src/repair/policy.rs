//! Pure author repair policies.
//!
//! Nothing here touches storage: the batch drivers classify each post, perform
//! any user lookup themselves, and hand the results to these functions.

use crate::constants::{ANONYMOUS_AUTHOR_NAME, DEFAULT_AVATAR, PLACEHOLDER_EMAIL_DOMAIN};
use crate::models::post::{
    AUTHOR_EMAIL_PATH, AUTHOR_FIELD, LEGACY_AVATAR_FIELD, LEGACY_EMAIL_FIELDS,
    LEGACY_NAME_FIELDS,
};
use crate::models::{Author, Document};
use regex::Regex;
use std::sync::OnceLock;

/// Shape of a post's `author` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorState {
    /// Absent, or present but not a JSON object.
    Missing,
    /// An object without a non-empty `email`.
    MissingEmail,
    /// An object with a non-empty `email`.
    Complete,
}

/// Classify the `author` field of a post.
pub fn classify_author(post: &Document) -> AuthorState {
    match post.field(AUTHOR_FIELD) {
        Some(value) if value.is_object() => {
            if post.present_str(AUTHOR_EMAIL_PATH).is_some() {
                AuthorState::Complete
            } else {
                AuthorState::MissingEmail
            }
        }
        _ => AuthorState::Missing,
    }
}

/// Outcome of the email precedence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailResolution {
    /// The author already has an email; it is never replaced.
    Existing,
    /// Taken from the referenced user record.
    FromUser(String),
    /// Synthesized from the author's display name.
    Placeholder(String),
}

impl EmailResolution {
    /// Address to write, or `None` when the existing email stays.
    pub fn new_address(&self) -> Option<&str> {
        match self {
            Self::Existing => None,
            Self::FromUser(address) | Self::Placeholder(address) => Some(address),
        }
    }

    /// Short label for log lines.
    pub fn source(&self) -> &'static str {
        match self {
            Self::Existing => "existing",
            Self::FromUser(_) => "user record",
            Self::Placeholder(_) => "placeholder",
        }
    }
}

/// Apply email precedence: existing, then user record, then placeholder.
///
/// Empty strings count as absent at every level. Values are not trimmed.
pub fn resolve_email(
    existing: Option<&str>,
    user_email: Option<&str>,
    author_name: Option<&str>,
) -> EmailResolution {
    fn present(value: Option<&str>) -> Option<&str> {
        value.filter(|value| !value.is_empty())
    }
    if present(existing).is_some() {
        return EmailResolution::Existing;
    }
    if let Some(email) = present(user_email) {
        return EmailResolution::FromUser(email.to_string());
    }
    EmailResolution::Placeholder(placeholder_email(author_name))
}

fn whitespace_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("static whitespace pattern"))
}

/// Synthesize `<name>@example.com` from a display name.
///
/// The name (or `Anonymous` when missing or empty) is lowercased and every
/// whitespace run becomes a single `.`, leading and trailing runs included.
/// Other characters, periods included, are kept as-is.
pub fn placeholder_email(author_name: Option<&str>) -> String {
    let name = author_name
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_AUTHOR_NAME);
    let local = whitespace_runs().replace_all(&name.to_lowercase(), ".").into_owned();
    format!("{}@{}", local, PLACEHOLDER_EMAIL_DOMAIN)
}

/// Build an author object from the flat fields older posts carry.
///
/// `email` stays `None` when no legacy email field is set.
pub fn author_from_legacy_fields(post: &Document) -> Author {
    Author {
        name: post
            .first_nonempty_str(LEGACY_NAME_FIELDS)
            .unwrap_or(ANONYMOUS_AUTHOR_NAME)
            .to_string(),
        avatar: post
            .nonempty_str(LEGACY_AVATAR_FIELD)
            .unwrap_or(DEFAULT_AVATAR)
            .to_string(),
        email: post
            .first_nonempty_str(LEGACY_EMAIL_FIELDS)
            .map(str::to_string),
    }
}
