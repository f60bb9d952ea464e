//! Re-resolve missing author emails from user records.

use super::policy::{classify_author, AuthorState};
use super::{apply_post_update, lookup_user_email, skip, RepairOptions, RepairSummary};
use crate::constants::POSTS_COLLECTION;
use crate::db::{DocumentStore, FieldUpdate};
use crate::error::AppError;
use crate::models::post::{AUTHOR_EMAIL_PATH, USER_ID_FIELD};
use crate::models::Document;

/// Refresh author emails from user records, never synthesizing placeholders.
///
/// Only posts with an author object, no author email, and a `userId` are
/// candidates; everything else is skipped.
///
/// # Returns
/// Updated and skipped counts.
///
/// # Errors
/// Propagates listing and user-lookup failures.
pub fn refresh_author_emails<S: DocumentStore + ?Sized>(
    store: &S,
    options: RepairOptions,
) -> Result<RepairSummary, AppError> {
    let posts = store.list(POSTS_COLLECTION)?;
    tracing::info!("Author email refresh: examining {} posts", posts.len());

    let mut summary = RepairSummary::default();
    for post in &posts {
        match classify_author(post) {
            AuthorState::MissingEmail => {
                refresh_from_user(store, post, options, &mut summary)?;
            }
            AuthorState::Missing => skip(post, "no author object", &mut summary),
            AuthorState::Complete => skip(post, "author email already set", &mut summary),
        }
    }

    tracing::info!(
        "Author email refresh finished: {} updated, {} skipped",
        summary.updated,
        summary.skipped
    );
    Ok(summary)
}

/// Copy the referenced user's email into `author.email`, or skip the post.
pub(super) fn refresh_from_user<S: DocumentStore + ?Sized>(
    store: &S,
    post: &Document,
    options: RepairOptions,
    summary: &mut RepairSummary,
) -> Result<(), AppError> {
    let Some(user_id) = post.nonempty_str(USER_ID_FIELD) else {
        skip(post, "no userId to resolve", summary);
        return Ok(());
    };
    match lookup_user_email(store, user_id)? {
        Some(email) => apply_post_update(
            store,
            post,
            FieldUpdate::new().set(AUTHOR_EMAIL_PATH, email),
            options,
            summary,
        ),
        None => skip(post, "user has no email", summary),
    }
    Ok(())
}
