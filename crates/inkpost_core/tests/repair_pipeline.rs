//! End-to-end maintenance runs through the public API.

use inkpost_core::constants::{NOTIFICATIONS_COLLECTION, POSTS_COLLECTION, USERS_COLLECTION};
use inkpost_core::db::IndexDefinition;
use inkpost_core::index_warmup::warm_up_default_notification_index;
use inkpost_core::reader::list_posts;
use inkpost_core::repair::{
    backfill_author_emails, refresh_author_emails, repair_all, repair_author_structure,
    RepairOptions, RepairSummary,
};
use inkpost_core::{Config, Database, DocumentStore};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

fn open_db() -> (Database, TempDir) {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("db");
    let db = Database::open(&Config::for_path(path.to_str().expect("path"))).expect("open");
    (db, temp)
}

fn object(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

fn seed_blog(db: &Database) {
    let posts = [
        ("legacy", json!({ "title": "Old", "userName": "Alice", "userEmail": "a@x.com" })),
        ("orphan", json!({ "title": "No author at all" })),
        (
            "linked",
            json!({ "title": "Linked", "userId": "u1", "author": { "name": "Jane Doe" } }),
        ),
        (
            "nameless",
            json!({ "title": "Nameless", "author": { "avatar": "/n.png" } }),
        ),
        (
            "complete",
            json!({ "title": "Done", "author": { "name": "Bo", "email": "bo@co.com" } }),
        ),
    ];
    for (id, data) in posts {
        db.put(POSTS_COLLECTION, id, object(data)).expect("seed post");
    }
    db.put(
        USERS_COLLECTION,
        "jane",
        object(json!({ "uid": "u1", "email": "jane@co.com" })),
    )
    .expect("seed user");
}

#[test]
fn refresh_then_structure_then_backfill_converges() {
    let (db, _temp) = open_db();
    seed_blog(&db);
    let live = RepairOptions::default();

    let refreshed = refresh_author_emails(&db, live).expect("refresh");
    assert_eq!(refreshed, RepairSummary { updated: 1, skipped: 4 });

    let structured = repair_author_structure(&db, live).expect("structure");
    assert_eq!(structured, RepairSummary { updated: 2, skipped: 3 });

    let backfilled = backfill_author_emails(&db, live).expect("backfill");
    assert_eq!(backfilled, RepairSummary { updated: 2, skipped: 3 });

    let posts = list_posts(&db).expect("list");
    assert_eq!(posts.len(), 5);
    for post in &posts {
        assert!(
            post.author.email.as_deref().is_some_and(|email| !email.is_empty()),
            "post {} still lacks an author email",
            post.id
        );
    }

    let by_id = |id: &str| {
        posts
            .iter()
            .find(|post| post.id == id)
            .unwrap_or_else(|| panic!("post {} missing", id))
    };
    assert_eq!(by_id("legacy").author.email.as_deref(), Some("a@x.com"));
    assert_eq!(by_id("linked").author.email.as_deref(), Some("jane@co.com"));
    assert_eq!(by_id("orphan").author.email.as_deref(), Some("anonymous@example.com"));
    assert_eq!(by_id("nameless").author.email.as_deref(), Some("anonymous@example.com"));
    assert_eq!(by_id("complete").author.email.as_deref(), Some("bo@co.com"));
}

#[test]
fn repair_all_dry_run_reports_without_writing() {
    let (db, _temp) = open_db();
    seed_blog(&db);
    let before = db.list(POSTS_COLLECTION).expect("before");

    let summary = repair_all(&db, RepairOptions { dry_run: true }).expect("dry run");
    assert_eq!(summary.structure.updated, 3);
    assert!(summary.emails.updated >= 2);

    assert_eq!(db.list(POSTS_COLLECTION).expect("after"), before);
}

#[test]
fn index_probe_flips_after_admin_creates_index() {
    let (db, _temp) = open_db();
    assert!(!warm_up_default_notification_index(&db));

    let index = IndexDefinition::parse(NOTIFICATIONS_COLLECTION, "recipientEmail,createdAt:desc")
        .expect("index");
    assert!(db.create_index(&index).expect("create"));
    assert!(warm_up_default_notification_index(&db));
}
