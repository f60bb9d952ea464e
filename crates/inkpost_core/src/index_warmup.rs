//! Composite index probe for the notifications feed.
//!
//! The feed query filters on `recipientEmail` and orders by `createdAt`, which
//! needs a composite index. Running the probe surfaces whether that index
//! exists and, if not, the console link that creates it. The probe never
//! creates the index itself.

use crate::constants::{DEFAULT_PROBE_RECIPIENT, NOTIFICATIONS_COLLECTION};
use crate::db::{Direction, DocumentStore, Query};
use crate::error::AppError;
use crate::models::notification::{CREATED_AT_FIELD, RECIPIENT_EMAIL_FIELD};
use regex::Regex;
use std::sync::OnceLock;

/// The notifications feed query: newest notification for `recipient`.
pub fn notification_feed_query(recipient: &str) -> Query {
    Query::new()
        .where_eq(RECIPIENT_EMAIL_FIELD, recipient)
        .order_by(CREATED_AT_FIELD, Direction::Desc)
        .limit(1)
}

/// Run the feed query once against `notifications`.
///
/// # Returns
/// `true` when the query executes. `false` when the index is missing (the
/// creation link is logged) or the query fails for any other reason.
pub fn warm_up_notification_index<S: DocumentStore + ?Sized>(store: &S, recipient: &str) -> bool {
    match store.query(NOTIFICATIONS_COLLECTION, &notification_feed_query(recipient)) {
        Ok(found) => {
            tracing::info!(
                "Notifications index is available ({} matching document(s))",
                found.len()
            );
            true
        }
        Err(err) => {
            if let Some(link) = missing_index_link(&err) {
                tracing::warn!("Notifications query needs a composite index. Create it here: {}", link);
            } else if is_missing_index(&err) {
                tracing::warn!("Notifications query needs a composite index: {}", err);
            } else {
                tracing::error!("Notifications index probe failed: {}", err);
            }
            false
        }
    }
}

/// Probe with the default recipient.
pub fn warm_up_default_notification_index<S: DocumentStore + ?Sized>(store: &S) -> bool {
    warm_up_notification_index(store, DEFAULT_PROBE_RECIPIENT)
}

/// `true` for the structured missing-index kind, or for errors whose text
/// carries the missing-index wording.
pub fn is_missing_index(err: &AppError) -> bool {
    err.is_missing_index() || message_reports_missing_index(&err.to_string())
}

/// Index-creation link for a missing-index error.
///
/// Uses the structured field when present and falls back to scanning the
/// message text for the first `https://` URL.
pub fn missing_index_link(err: &AppError) -> Option<String> {
    match err {
        AppError::MissingIndex { create_url, .. } => Some(create_url.clone()),
        other => link_from_message(&other.to_string()),
    }
}

// Compatibility shim for errors that only carry text (for example a
// `StorageMessage` relayed from another process).
fn message_reports_missing_index(message: &str) -> bool {
    message.to_ascii_lowercase().contains("requires an index")
}

fn link_from_message(message: &str) -> Option<String> {
    static URL: OnceLock<Regex> = OnceLock::new();
    if !message_reports_missing_index(message) {
        return None;
    }
    let url = URL.get_or_init(|| Regex::new(r"https://\S+").expect("static url pattern"));
    url.find(message).map(|found| {
        found
            .as_str()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ')' | '"' | '\''))
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FieldUpdate, IndexDefinition};
    use crate::models::Document;
    use crate::test_support::setup_temp_db;
    use serde_json::json;

    /// Store whose queries fail with a text-only missing-index message.
    struct TextOnlyErrors;

    impl DocumentStore for TextOnlyErrors {
        fn list(&self, _collection: &str) -> Result<Vec<Document>, AppError> {
            Ok(Vec::new())
        }
        fn query(&self, _collection: &str, _query: &Query) -> Result<Vec<Document>, AppError> {
            Err(AppError::StorageMessage(
                "FAILED_PRECONDITION: The query requires an index. You can create it here: https://console.example.com/indexes?create=abc."
                    .to_string(),
            ))
        }
        fn get(&self, _collection: &str, _id: &str) -> Result<Option<Document>, AppError> {
            Ok(None)
        }
        fn update(&self, _c: &str, _id: &str, _update: &FieldUpdate) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn probe_returns_false_without_panicking_when_index_is_missing() {
        let (db, _temp) = setup_temp_db();
        assert!(!warm_up_default_notification_index(&db));
    }

    #[test]
    fn probe_returns_true_once_index_exists() {
        let (db, _temp) = setup_temp_db();
        let mut data = serde_json::Map::new();
        data.insert("recipientEmail".to_string(), json!("probe@example.com"));
        data.insert("createdAt".to_string(), json!("2024-01-01T00:00:00Z"));
        db.put("notifications", "n1", data).expect("seed");

        let index = IndexDefinition::parse("notifications", "recipientEmail:asc,createdAt:desc")
            .expect("index");
        db.create_index(&index).expect("create index");

        assert!(warm_up_default_notification_index(&db));
    }

    #[test]
    fn structured_error_exposes_link_directly() {
        let err = AppError::MissingIndex {
            collection: "notifications".to_string(),
            fields: "recipientEmail:asc,createdAt:desc".to_string(),
            create_url: "https://console.inkpost.dev/project/p/indexes/new".to_string(),
        };
        assert!(is_missing_index(&err));
        assert_eq!(
            missing_index_link(&err).as_deref(),
            Some("https://console.inkpost.dev/project/p/indexes/new")
        );
    }

    #[test]
    fn text_only_errors_are_recognized_by_the_shim() {
        let err = TextOnlyErrors
            .query("notifications", &notification_feed_query("a@b.c"))
            .expect_err("always fails");
        assert!(is_missing_index(&err));
        assert_eq!(
            missing_index_link(&err).as_deref(),
            Some("https://console.example.com/indexes?create=abc")
        );
        assert!(!warm_up_notification_index(&TextOnlyErrors, "a@b.c"));
    }

    #[test]
    fn unrelated_errors_yield_no_link() {
        let err = AppError::StorageMessage("disk full, see https://status.example.com".to_string());
        assert!(!is_missing_index(&err));
        assert!(missing_index_link(&err).is_none());
    }
}
