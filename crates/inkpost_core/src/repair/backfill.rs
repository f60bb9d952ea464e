//! Fill in `author.email` for posts whose author object lacks one.

use super::policy::{classify_author, resolve_email, AuthorState};
use super::{apply_post_update, lookup_user_email, skip, RepairOptions, RepairSummary};
use crate::constants::POSTS_COLLECTION;
use crate::db::{DocumentStore, FieldUpdate};
use crate::error::AppError;
use crate::models::post::{AUTHOR_EMAIL_PATH, AUTHOR_NAME_PATH, USER_ID_FIELD};

/// Backfill missing author emails across every post.
///
/// Posts without an author object, or whose author already has an email, are
/// skipped. Otherwise the email comes from the user referenced by `userId`
/// when it has one, else a placeholder derived from the author name. Only
/// `author.email` is written.
///
/// # Returns
/// Updated and skipped counts.
///
/// # Errors
/// Propagates listing and user-lookup failures. Failed writes are counted as
/// skipped instead.
pub fn backfill_author_emails<S: DocumentStore + ?Sized>(
    store: &S,
    options: RepairOptions,
) -> Result<RepairSummary, AppError> {
    let posts = store.list(POSTS_COLLECTION)?;
    tracing::info!("Author email backfill: examining {} posts", posts.len());

    let mut summary = RepairSummary::default();
    for post in &posts {
        match classify_author(post) {
            AuthorState::Missing => {
                skip(post, "no author object", &mut summary);
                continue;
            }
            AuthorState::Complete => {
                skip(post, "author email already set", &mut summary);
                continue;
            }
            AuthorState::MissingEmail => {}
        }

        let user_email = match post.nonempty_str(USER_ID_FIELD) {
            Some(user_id) => lookup_user_email(store, user_id)?,
            None => None,
        };
        let resolution = resolve_email(
            None,
            user_email.as_deref(),
            post.str_field(AUTHOR_NAME_PATH),
        );
        let Some(address) = resolution.new_address() else {
            skip(post, "author email already set", &mut summary);
            continue;
        };
        tracing::debug!(
            "Post {} gets email {} from {}",
            post.id,
            address,
            resolution.source()
        );
        apply_post_update(
            store,
            post,
            FieldUpdate::new().set(AUTHOR_EMAIL_PATH, address),
            options,
            &mut summary,
        );
    }

    tracing::info!(
        "Author email backfill finished: {} updated, {} skipped",
        summary.updated,
        summary.skipped
    );
    Ok(summary)
}
