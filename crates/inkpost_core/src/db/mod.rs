//! Embedded document store backed by redb.
//!
//! Each collection lives in its own table keyed by document id, with the
//! document body stored as a JSON object. The maintenance utilities only
//! depend on the [`DocumentStore`] capability set; [`Database`] adds the
//! administrative and seeding operations on top.

/// Pre-run backups.
pub mod backup;
/// Composite index definitions.
pub mod index;
/// Query and partial-update descriptions.
pub mod query;
/// redb table definitions.
pub mod tables;

mod time_util;


pub use index::{Direction, IndexDefinition, IndexField};
pub use query::{FieldUpdate, Query};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{set_field_path, Document};
use index::{validate_collection_name, validate_field_path};
use redb::{ReadableDatabase, ReadableTable, TableDefinition, TableError};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tables::{collection_table_name, COMPOSITE_INDEXES, REDB_FILE_NAME};
use uuid::Uuid;

/// Minimal document-collection capability set used by the maintenance utilities.
pub trait DocumentStore {
    /// Every document in `collection`, in id order.
    ///
    /// # Errors
    /// Returns an error when the collection cannot be read.
    fn list(&self, collection: &str) -> Result<Vec<Document>, AppError>;

    /// Documents in `collection` matching `query`.
    ///
    /// # Errors
    /// Returns [`AppError::MissingIndex`] when the query needs a composite index
    /// that is not registered, or a storage error when the read fails.
    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, AppError>;

    /// A single document by id.
    ///
    /// # Errors
    /// Returns an error when the read fails.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError>;

    /// Apply a partial update to an existing document.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the document does not exist.
    fn update(&self, collection: &str, id: &str, update: &FieldUpdate) -> Result<(), AppError>;
}

/// Database handle shared by every utility in a process.
pub struct Database {
    pub db: Arc<redb::Database>,
    console_url: String,
    project_id: String,
}

fn collection_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

fn decode_document(id: &str, bytes: &[u8]) -> Result<Document, AppError> {
    let data: Map<String, Value> = serde_json::from_slice(bytes)?;
    Ok(Document::new(id, data))
}

impl Database {
    /// Open (or create) the database under `config.db_path`.
    ///
    /// # Returns
    /// A ready [`Database`] whose missing-index errors link to
    /// `config.console_url` for `config.project_id`.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created or redb cannot
    /// open the file.
    pub fn open(config: &Config) -> Result<Self, AppError> {
        let dir = Path::new(&config.db_path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;
        let file = dir.join(REDB_FILE_NAME);
        let db = Arc::new(redb::Database::create(&file)?);

        let write_txn = db.begin_write()?;
        write_txn.open_table(COMPOSITE_INDEXES)?;
        write_txn.commit()?;

        tracing::debug!("Opened database at {}", file.display());
        Ok(Self {
            db,
            console_url: config.console_url.clone(),
            project_id: config.project_id.clone(),
        })
    }

    /// Open the database at `path` with default link settings.
    ///
    /// # Errors
    /// See [`Database::open`].
    pub fn new(path: &str) -> Result<Self, AppError> {
        Self::open(&Config::for_path(path))
    }

    /// Insert or replace a whole document.
    ///
    /// # Errors
    /// Returns an error when names are invalid or the write fails.
    pub fn put(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<(), AppError> {
        validate_collection_name(collection)?;
        if id.is_empty() {
            return Err(AppError::BadRequest("document id must not be empty".to_string()));
        }
        let encoded = serde_json::to_vec(&data)?;
        let name = collection_table_name(collection);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(collection_table(&name))?;
            table.insert(id, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Insert a document under a freshly generated id.
    ///
    /// # Returns
    /// The new document id.
    ///
    /// # Errors
    /// See [`Database::put`].
    pub fn insert(&self, collection: &str, data: Map<String, Value>) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        self.put(collection, &id, data)?;
        Ok(id)
    }

    /// Delete a document by id.
    ///
    /// # Returns
    /// `true` when a document was removed.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        validate_collection_name(collection)?;
        let name = collection_table_name(collection);
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(collection_table(&name))?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Drop every document in `collection`.
    ///
    /// # Returns
    /// Number of documents removed.
    ///
    /// # Errors
    /// Returns an error when the read or the table drop fails.
    pub fn clear_collection(&self, collection: &str) -> Result<usize, AppError> {
        let removed = self.list(collection)?.len();
        let name = collection_table_name(collection);
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(collection_table(&name))?;
        write_txn.commit()?;
        Ok(removed)
    }

    /// Register a composite index. Registering an existing index is a no-op.
    ///
    /// # Returns
    /// `true` when the index was newly created.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    pub fn create_index(&self, index: &IndexDefinition) -> Result<bool, AppError> {
        let key = index.id();
        let encoded = serde_json::to_vec(index)?;
        let write_txn = self.db.begin_write()?;
        let created = {
            let mut table = write_txn.open_table(COMPOSITE_INDEXES)?;
            if table.get(key.as_str())?.is_some() {
                false
            } else {
                table.insert(key.as_str(), encoded.as_slice())?;
                true
            }
        };
        write_txn.commit()?;
        if created {
            tracing::info!("Created composite index {}", key);
        }
        Ok(created)
    }

    /// Every registered composite index, ordered by index id.
    ///
    /// # Errors
    /// Returns an error when the read or decoding fails.
    pub fn list_indexes(&self) -> Result<Vec<IndexDefinition>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COMPOSITE_INDEXES)?;
        let mut indexes = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            indexes.push(serde_json::from_slice(value.value())?);
        }
        Ok(indexes)
    }

    fn has_index(&self, index: &IndexDefinition) -> Result<bool, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COMPOSITE_INDEXES)?;
        let exists = table.get(index.id().as_str())?.is_some();
        Ok(exists)
    }
}

impl DocumentStore for Database {
    fn list(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        validate_collection_name(collection)?;
        let name = collection_table_name(collection);
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(collection_table(&name)) {
            Ok(table) => table,
            // Collections spring into existence on first write.
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut documents = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            documents.push(decode_document(key.value(), value.value())?);
        }
        Ok(documents)
    }

    fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, AppError> {
        if let Some(index) = query.required_index(collection)? {
            if !self.has_index(&index)? {
                return Err(AppError::MissingIndex {
                    collection: collection.to_string(),
                    fields: index.fields_spec(),
                    create_url: index.create_url(&self.console_url, &self.project_id),
                });
            }
        }
        Ok(query.apply(self.list(collection)?))
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        validate_collection_name(collection)?;
        let name = collection_table_name(collection);
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(collection_table(&name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match table.get(id)? {
            Some(value) => Ok(Some(decode_document(id, value.value())?)),
            None => Ok(None),
        }
    }

    fn update(&self, collection: &str, id: &str, update: &FieldUpdate) -> Result<(), AppError> {
        validate_collection_name(collection)?;
        if update.is_empty() {
            return Err(AppError::BadRequest("update has no fields".to_string()));
        }
        for (path, _) in update.writes() {
            validate_field_path(path)?;
        }
        let name = collection_table_name(collection);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(collection_table(&name))?;
            let Some(old_guard) = table.get(id)? else {
                return Err(AppError::NotFound);
            };
            let mut document = decode_document(id, old_guard.value())?;
            drop(old_guard);

            for (path, value) in update.writes() {
                set_field_path(&mut document.data, path, value.clone())
                    .map_err(AppError::BadRequest)?;
            }
            let encoded = serde_json::to_vec(&document.data)?;
            table.insert(id, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
