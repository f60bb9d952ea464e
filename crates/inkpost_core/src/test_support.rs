//! Shared test-only helpers for inkpost_core.

use crate::constants::{POSTS_COLLECTION, USERS_COLLECTION};
use crate::models::Document;
use crate::{Config, Database};
use serde_json::Value;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing file.
///
/// # Panics
/// Panics if temp-dir creation or database initialization fails.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let config = Config::for_path(db_path.to_str().expect("db path"));
    let db = Database::open(&config).expect("db");
    (db, temp_dir)
}

/// Write a post document from a JSON literal.
pub(crate) fn seed_post(db: &Database, id: &str, data: Value) {
    db.put(POSTS_COLLECTION, id, json_object(data))
        .expect("seed post");
}

/// Write a user document from a JSON literal.
pub(crate) fn seed_user(db: &Database, id: &str, data: Value) {
    db.put(USERS_COLLECTION, id, json_object(data))
        .expect("seed user");
}

/// Read a post back, panicking when it is missing.
pub(crate) fn load_post(db: &Database, id: &str) -> Document {
    use crate::DocumentStore;
    db.get(POSTS_COLLECTION, id)
        .expect("get post")
        .expect("post should exist")
}

fn json_object(data: Value) -> serde_json::Map<String, Value> {
    match data {
        Value::Object(map) => map,
        other => panic!("seed data must be a JSON object, got {}", other),
    }
}

/// Return the lock used to serialize environment mutation in tests.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Restores an environment variable value on drop.
pub(crate) struct EnvGuard {
    key: &'static str,
    previous: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        write_env(key, Some(value));
        Self { key, previous }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        let previous = std::env::var(key).ok();
        write_env(key, None);
        Self { key, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_env(self.key, self.previous.as_deref());
    }
}

#[allow(unused_unsafe)]
fn write_env(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock()` while mutating the environment.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}
