//! User documents (read-only for the maintenance tools).

use super::Document;
use serde::Serialize;

/// Field holding the external user id that posts reference through `userId`.
pub const USER_UID_FIELD: &str = "uid";

/// A user profile as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    /// Project a stored document into a [`User`], treating empty strings as absent.
    pub fn from_document(doc: &Document) -> Self {
        Self {
            uid: doc.str_field(USER_UID_FIELD).unwrap_or_default().to_string(),
            email: doc.present_str("email").map(str::to_string),
            display_name: doc.nonempty_str("displayName").map(str::to_string),
        }
    }
}
