//! Core library for Inkpost blog maintenance (config, storage, repairs).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants (collection names, author defaults).
pub mod constants;
/// Embedded document store.
pub mod db;
/// Application error types.
pub mod error;
/// Composite index probe for the notifications feed.
pub mod index_warmup;
/// Document models and field accessors.
pub mod models;
/// Normalized post listing.
pub mod reader;
/// Author repair policies and batch drivers.
pub mod repair;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use db::{Database, DocumentStore};
pub use error::AppError;
