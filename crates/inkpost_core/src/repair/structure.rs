//! Rebuild missing author objects from legacy flat fields.

use super::policy::{author_from_legacy_fields, classify_author, AuthorState};
use super::refresh::refresh_from_user;
use super::{apply_post_update, lookup_user_email, skip, RepairOptions, RepairSummary};
use crate::constants::POSTS_COLLECTION;
use crate::db::{DocumentStore, FieldUpdate};
use crate::error::AppError;
use crate::models::post::{AUTHOR_FIELD, USER_ID_FIELD};

/// Ensure every post has an author object.
///
/// Posts without one get `{ name, avatar, email }` built from legacy flat
/// fields, falling back to the referenced user's email when no legacy email
/// exists. Posts whose author lacks an email get it from their user record
/// when possible. Everything else is skipped.
///
/// # Returns
/// Updated and skipped counts.
///
/// # Errors
/// Propagates listing and user-lookup failures.
pub fn repair_author_structure<S: DocumentStore + ?Sized>(
    store: &S,
    options: RepairOptions,
) -> Result<RepairSummary, AppError> {
    let posts = store.list(POSTS_COLLECTION)?;
    tracing::info!("Author structure repair: examining {} posts", posts.len());

    let mut summary = RepairSummary::default();
    for post in &posts {
        match classify_author(post) {
            AuthorState::Missing => {
                let mut author = author_from_legacy_fields(post);
                if author.email.is_none() {
                    if let Some(user_id) = post.nonempty_str(USER_ID_FIELD) {
                        author.email = lookup_user_email(store, user_id)?;
                    }
                }
                tracing::debug!("Post {} gets author object for {}", post.id, author.name);
                apply_post_update(
                    store,
                    post,
                    FieldUpdate::new().set(AUTHOR_FIELD, serde_json::to_value(&author)?),
                    options,
                    &mut summary,
                );
            }
            AuthorState::MissingEmail => {
                refresh_from_user(store, post, options, &mut summary)?;
            }
            AuthorState::Complete => skip(post, "author already complete", &mut summary),
        }
    }

    tracing::info!(
        "Author structure repair finished: {} updated, {} skipped",
        summary.updated,
        summary.skipped
    );
    Ok(summary)
}
