//! Shared constants used across Inkpost crates.

/// Collection holding blog posts.
pub const POSTS_COLLECTION: &str = "posts";
/// Collection holding user profiles (looked up by `uid`).
pub const USERS_COLLECTION: &str = "users";
/// Collection holding reader notifications.
pub const NOTIFICATIONS_COLLECTION: &str = "notifications";

/// Avatar used when a post carries no author avatar.
pub const DEFAULT_AVATAR: &str = "/default-avatar.png";
/// Author name shown by the post reader when a post has no author object.
pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown";
/// Author name used when repairing or synthesizing without a known name.
pub const ANONYMOUS_AUTHOR_NAME: &str = "Anonymous";
/// Domain used for synthesized placeholder emails.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "example.com";

/// Recipient email used by the notifications index probe.
pub const DEFAULT_PROBE_RECIPIENT: &str = "probe@example.com";

/// Words per minute used to derive a default reading time.
pub const READING_WORDS_PER_MINUTE: usize = 200;

/// Default Inkpost project identifier.
pub const DEFAULT_PROJECT_ID: &str = "inkpost-blog";
/// Default admin console base URL used in index-creation links.
pub const DEFAULT_CONSOLE_URL: &str = "https://console.inkpost.dev";
