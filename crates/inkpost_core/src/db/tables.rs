//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Prefix for per-collection document tables.
pub const COLLECTION_TABLE_PREFIX: &str = "collection:";

/// Registered composite indexes (`IndexDefinition`, JSON-encoded), keyed by index id.
pub const COMPOSITE_INDEXES: TableDefinition<&str, &[u8]> =
    TableDefinition::new("composite_indexes");

/// Table name holding the documents of `collection` (id -> JSON object).
pub fn collection_table_name(collection: &str) -> String {
    format!("{}{}", COLLECTION_TABLE_PREFIX, collection)
}
