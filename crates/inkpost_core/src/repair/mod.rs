//! Author repair policies and the batch drivers that apply them to `posts`.
//!
//! Every driver lists the whole collection, classifies each post on its own,
//! and issues at most one point update per post. Runs are idempotent and keep
//! no state between invocations; a crashed run is resumed by running again.

/// Author email backfill driver.
pub mod backfill;
/// Pure classification and resolution policies.
pub mod policy;
/// Author email refresh driver.
pub mod refresh;
/// Author structure repair driver.
pub mod structure;


pub use backfill::backfill_author_emails;
pub use refresh::refresh_author_emails;
pub use structure::repair_author_structure;

use crate::constants::{POSTS_COLLECTION, USERS_COLLECTION};
use crate::db::{DocumentStore, FieldUpdate, Query};
use crate::error::AppError;
use crate::models::user::USER_UID_FIELD;
use crate::models::{Document, User};
use serde::Serialize;

/// Knobs shared by every repair driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepairOptions {
    /// Classify and log without issuing writes.
    pub dry_run: bool,
}

/// Per-run counts. Documents whose update failed are counted as skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    pub updated: usize,
    pub skipped: usize,
}

impl RepairSummary {
    pub fn total(&self) -> usize {
        self.updated + self.skipped
    }
}

/// Counts for the composed structure-then-email run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombinedSummary {
    pub structure: RepairSummary,
    pub emails: RepairSummary,
}

/// Run structure repair, then the email backfill, against the same store.
///
/// In dry-run mode the backfill sees the collection as it was before the
/// (unwritten) structure repairs.
///
/// # Errors
/// Propagates read failures from either step.
pub fn repair_all<S: DocumentStore + ?Sized>(
    store: &S,
    options: RepairOptions,
) -> Result<CombinedSummary, AppError> {
    let structure = repair_author_structure(store, options)?;
    let emails = backfill_author_emails(store, options)?;
    Ok(CombinedSummary { structure, emails })
}

/// Email of the first user whose `uid` equals `user_id` and has a non-empty email.
///
/// # Errors
/// Propagates the query failure; lookups are reads and abort the run.
pub fn lookup_user_email<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> Result<Option<String>, AppError> {
    let matches = store.query(
        USERS_COLLECTION,
        &Query::new().where_eq(USER_UID_FIELD, user_id),
    )?;
    if matches.len() > 1 {
        tracing::debug!("{} users share uid {}; using the first", matches.len(), user_id);
    }
    Ok(matches
        .iter()
        .map(User::from_document)
        .find_map(|user| user.email))
}

/// Write `update` to `post` unless running dry, recording the outcome.
///
/// A failed write is logged and counted as skipped; it never aborts the run.
pub(crate) fn apply_post_update<S: DocumentStore + ?Sized>(
    store: &S,
    post: &Document,
    update: FieldUpdate,
    options: RepairOptions,
    summary: &mut RepairSummary,
) {
    if options.dry_run {
        tracing::info!("[dry run] would update post {}: {:?}", post.id, update.writes());
        summary.updated += 1;
        return;
    }
    match store.update(POSTS_COLLECTION, &post.id, &update) {
        Ok(()) => {
            tracing::info!("Updated post {}", post.id);
            summary.updated += 1;
        }
        Err(err) => {
            tracing::warn!("Failed to update post {}: {}", post.id, err);
            summary.skipped += 1;
        }
    }
}

pub(crate) fn skip(post: &Document, reason: &str, summary: &mut RepairSummary) {
    tracing::debug!("Skipping post {}: {}", post.id, reason);
    summary.skipped += 1;
}
