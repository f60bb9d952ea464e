//! Demo data generator covering every author shape the repair utilities handle.

use chrono::{Duration, Utc};
use inkpost_core::constants::{NOTIFICATIONS_COLLECTION, POSTS_COLLECTION, USERS_COLLECTION};
use inkpost_core::models::{Notification, User};
use inkpost_core::{AppError, Database};
use rand::prelude::*;
use serde::Serialize;
use serde_json::{json, Map, Value};

const AUTHORS: &[&str] = &[
    "Ada Lovelace",
    "Grace Hopper",
    "John Q. Public",
    "Linus  Torvalds",
    "Margaret Hamilton",
    "Ken Thompson",
];

const TOPICS: &[&str] = &["rust", "databases", "writing", "tooling", "travel", "notes"];

/// Counts of written demo documents.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub posts: usize,
    pub users: usize,
    pub notifications: usize,
}

/// Author shapes found in older blog data.
#[derive(Debug, Clone, Copy)]
enum PostShape {
    Complete,
    MissingEmailWithUser,
    MissingEmailNoUser,
    LegacyFlat,
    NoAuthor,
}

impl PostShape {
    /// 40% complete, 20% linked without email, 15% unlinked without email,
    /// 15% legacy flat, 10% author-less.
    fn pick(rng: &mut impl Rng) -> Self {
        match rng.gen_range(0..100) {
            0..=39 => Self::Complete,
            40..=59 => Self::MissingEmailWithUser,
            60..=74 => Self::MissingEmailNoUser,
            75..=89 => Self::LegacyFlat,
            _ => Self::NoAuthor,
        }
    }
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::StorageMessage(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Write `post_count` posts plus one user per author and a few notifications.
///
/// # Errors
/// Returns the first storage failure.
pub fn seed_demo_data(
    db: &Database,
    post_count: usize,
    clear: bool,
) -> Result<SeedReport, AppError> {
    if clear {
        for collection in [POSTS_COLLECTION, USERS_COLLECTION, NOTIFICATIONS_COLLECTION] {
            let removed = db.clear_collection(collection)?;
            tracing::info!("Cleared {} documents from {}", removed, collection);
        }
    }

    let mut rng = rand::thread_rng();
    let mut report = SeedReport::default();

    // Every third user has no email so lookups can miss.
    for (position, name) in AUTHORS.iter().enumerate() {
        let user = User {
            uid: format!("demo-user-{}", position),
            email: (position % 3 != 2).then(|| {
                format!("{}@inkpost.dev", name.split_whitespace().collect::<Vec<_>>().join("."))
                    .to_lowercase()
            }),
            display_name: Some((*name).to_string()),
        };
        db.put(USERS_COLLECTION, &user.uid, to_object(&user)?)?;
        report.users += 1;
    }

    let now = Utc::now();
    for number in 0..post_count {
        let author_index = rng.gen_range(0..AUTHORS.len());
        let name = AUTHORS[author_index];
        let topic = TOPICS.choose(&mut rng).copied().unwrap_or("notes");
        let title = format!("Notes on {} #{}", topic, number + 1);
        let published = now - Duration::days(rng.gen_range(0..365));

        let mut post = json!({
            "title": title,
            "slug": slugify(&title),
            "excerpt": format!("A short piece about {}.", topic),
            "content": format!("{} ", topic).repeat(rng.gen_range(50..900)),
            "categories": [topic],
            "publishedAt": published.to_rfc3339(),
        });
        let user_id = format!("demo-user-{}", author_index);
        let email = format!("{}@inkpost.dev", slugify(name));

        let extra = match PostShape::pick(&mut rng) {
            PostShape::Complete => json!({
                "userId": user_id,
                "author": { "name": name, "avatar": "/avatars/demo.png", "email": email },
            }),
            PostShape::MissingEmailWithUser => json!({
                "userId": user_id,
                "author": { "name": name, "avatar": "/avatars/demo.png" },
            }),
            PostShape::MissingEmailNoUser => json!({
                "author": { "name": name },
            }),
            PostShape::LegacyFlat => json!({
                "userId": user_id,
                "userName": name,
                "authorAvatar": "/avatars/legacy.png",
                "userEmail": email,
            }),
            PostShape::NoAuthor => json!({}),
        };
        if let (Some(target), Value::Object(fields)) = (post.as_object_mut(), extra) {
            target.extend(fields);
        }

        db.put(POSTS_COLLECTION, &format!("demo-post-{:04}", number), to_object(&post)?)?;
        report.posts += 1;
    }

    for hours_ago in [1_i64, 5, 30] {
        let notification = Notification {
            recipient_email: "probe@example.com".to_string(),
            created_at: (now - Duration::hours(hours_ago)).to_rfc3339(),
            kind: "comment".to_string(),
            message: format!("New comment {} hour(s) ago", hours_ago),
            read: false,
        };
        db.insert(NOTIFICATIONS_COLLECTION, to_object(&notification)?)?;
        report.notifications += 1;
    }

    Ok(report)
}
