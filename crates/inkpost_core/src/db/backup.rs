//! Pre-run backups of the redb database file.

use super::tables::REDB_FILE_NAME;
use super::time_util::unix_timestamp_seconds;
use crate::error::AppError;
use std::path::PathBuf;
use std::time::SystemTime;

/// Copies the database file aside before a mutating maintenance run.
pub struct BackupManager {
    db_path: PathBuf,
}

impl BackupManager {
    /// Create a backup manager for the database directory.
    pub fn new(db_path: &str) -> Self {
        Self {
            db_path: PathBuf::from(db_path),
        }
    }

    /// Copy `data.redb` to `data.redb.backup.<unix seconds>` in the same directory.
    ///
    /// Run this before opening the database so the copy is not taken mid-write.
    ///
    /// # Returns
    /// The backup path, or `None` when there is no database file yet.
    ///
    /// # Errors
    /// Returns an error when the clock is before the epoch or the copy fails.
    pub fn create_backup(&self) -> Result<Option<PathBuf>, AppError> {
        let source = self.db_path.join(REDB_FILE_NAME);
        if !source.exists() {
            return Ok(None);
        }
        let timestamp = unix_timestamp_seconds(SystemTime::now())?;
        let backup_path = self
            .db_path
            .join(format!("{}.backup.{}", REDB_FILE_NAME, timestamp));
        std::fs::copy(&source, &backup_path).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                backup_path.display(),
                err
            ))
        })?;
        tracing::info!("Created database backup at: {}", backup_path.display());
        Ok(Some(backup_path))
    }
}
