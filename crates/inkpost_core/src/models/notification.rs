//! Notification documents.

use serde::Serialize;

/// Field filtered on by the notifications feed query.
pub const RECIPIENT_EMAIL_FIELD: &str = "recipientEmail";
/// Field the notifications feed is ordered by (newest first).
pub const CREATED_AT_FIELD: &str = "createdAt";

/// A reader notification as stored in the `notifications` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub recipient_email: String,
    pub created_at: String,
    pub kind: String,
    pub message: String,
    pub read: bool,
}
