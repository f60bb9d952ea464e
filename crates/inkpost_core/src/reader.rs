//! Normalized post listing.

use crate::constants::{
    DEFAULT_AVATAR, POSTS_COLLECTION, READING_WORDS_PER_MINUTE, UNKNOWN_AUTHOR_NAME,
};
use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::post::{AUTHOR_FIELD, USER_ID_FIELD};
use crate::models::{Author, Document, Post};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// List every post with defaults applied to missing fields.
///
/// Reads the whole collection in one pass; there is no pagination.
///
/// # Returns
/// Posts in store order.
///
/// # Errors
/// Propagates the underlying read failure.
pub fn list_posts<S: DocumentStore + ?Sized>(store: &S) -> Result<Vec<Post>, AppError> {
    let now = Utc::now();
    let posts = store
        .list(POSTS_COLLECTION)?
        .iter()
        .map(|doc| normalize_post(doc, now))
        .collect::<Vec<_>>();
    tracing::debug!("Loaded {} posts", posts.len());
    Ok(posts)
}

/// Project a raw post document into a [`Post`].
///
/// `now` stands in for a missing `publishedAt`.
pub fn normalize_post(doc: &Document, now: DateTime<Utc>) -> Post {
    let text = |field: &str| doc.str_field(field).unwrap_or_default().to_string();
    let content = text("content");

    Post {
        id: doc.id.clone(),
        title: text("title"),
        slug: text("slug"),
        excerpt: text("excerpt"),
        author: project_author(doc.field(AUTHOR_FIELD)),
        user_id: doc.nonempty_str(USER_ID_FIELD).map(str::to_string),
        categories: doc
            .field("categories")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        published_at: published_at(doc.field("publishedAt"), now),
        cover_image: text("coverImage"),
        reading_time: doc
            .nonempty_str("readingTime")
            .map(str::to_string)
            .unwrap_or_else(|| estimate_reading_time(&content)),
        content,
    }
}

fn project_author(value: Option<&Value>) -> Author {
    let Some(author) = value.and_then(Value::as_object) else {
        return Author {
            name: UNKNOWN_AUTHOR_NAME.to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            email: None,
        };
    };
    let nonempty = |key: &str| {
        author
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    Author {
        name: nonempty("name").unwrap_or_else(|| UNKNOWN_AUTHOR_NAME.to_string()),
        avatar: nonempty("avatar").unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        email: author
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .map(str::to_string),
    }
}

/// Accepts an ISO-8601 string or a stored `{ seconds, nanoseconds }` timestamp.
fn published_at(value: Option<&Value>, now: DateTime<Utc>) -> String {
    let parsed = match value {
        Some(Value::String(raw)) if !raw.trim().is_empty() => return raw.clone(),
        Some(Value::Object(stamp)) => stamp
            .get("seconds")
            .and_then(Value::as_i64)
            .and_then(|seconds| {
                let nanos = stamp
                    .get("nanoseconds")
                    .and_then(Value::as_u64)
                    .and_then(|nanos| u32::try_from(nanos).ok())
                    .unwrap_or(0);
                DateTime::from_timestamp(seconds, nanos)
            }),
        _ => None,
    };
    parsed
        .unwrap_or(now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `"<n> min read"` at a fixed reading speed, never below one minute.
pub fn estimate_reading_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(READING_WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}
