//! Post documents: the nested author object and the normalized post view.

use serde::Serialize;

/// Field holding the nested author object.
pub const AUTHOR_FIELD: &str = "author";
/// Dotted path of the nested author email.
pub const AUTHOR_EMAIL_PATH: &str = "author.email";
/// Dotted path of the nested author display name.
pub const AUTHOR_NAME_PATH: &str = "author.name";
/// Field referencing the owning user's `uid`.
pub const USER_ID_FIELD: &str = "userId";

/// Flat name fields written by older versions of the blog, in priority order.
pub const LEGACY_NAME_FIELDS: &[&str] = &["userName", "authorName"];
/// Flat avatar field written by older versions of the blog.
pub const LEGACY_AVATAR_FIELD: &str = "authorAvatar";
/// Flat email fields written by older versions of the blog, in priority order.
pub const LEGACY_EMAIL_FIELDS: &[&str] = &["userEmail", "authorEmail"];

/// Author object nested on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A post with every field defaulted, as returned by the post reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author: Author,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub categories: Vec<String>,
    pub published_at: String,
    pub cover_image: String,
    pub reading_time: String,
}
