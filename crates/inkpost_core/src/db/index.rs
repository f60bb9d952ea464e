//! Composite index definitions.
//!
//! A query that filters on one field and orders by another is only served when
//! a matching composite index has been registered with
//! [`crate::db::Database::create_index`].

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction of an index field or an order-by clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(AppError::BadRequest(format!(
                "unknown sort direction '{}' (expected asc or desc)",
                other
            ))),
        }
    }
}

/// One field of a composite index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexField {
    pub field: String,
    pub direction: Direction,
}

impl IndexField {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// A composite index over an ordered list of fields in one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub collection: String,
    pub fields: Vec<IndexField>,
}

impl IndexDefinition {
    /// Build and validate an index definition.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for invalid names, fewer than two
    /// fields, or a field listed twice.
    pub fn new(collection: &str, fields: Vec<IndexField>) -> Result<Self, AppError> {
        validate_collection_name(collection)?;
        if fields.len() < 2 {
            return Err(AppError::BadRequest(
                "composite indexes need at least two fields".to_string(),
            ));
        }
        for (position, field) in fields.iter().enumerate() {
            validate_field_path(&field.field)?;
            if fields[..position].iter().any(|prior| prior.field == field.field) {
                return Err(AppError::BadRequest(format!(
                    "field '{}' listed twice in index",
                    field.field
                )));
            }
        }
        Ok(Self {
            collection: collection.to_string(),
            fields,
        })
    }

    /// Parse a field list such as `recipientEmail:asc,createdAt:desc`.
    ///
    /// A field without an explicit direction is ascending.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when the list is malformed.
    pub fn parse(collection: &str, field_list: &str) -> Result<Self, AppError> {
        let mut fields = Vec::new();
        for part in field_list.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let (field, direction) = match part.split_once(':') {
                Some((field, direction)) => (field.trim(), direction.parse()?),
                None => (part, Direction::Asc),
            };
            fields.push(IndexField::new(field, direction));
        }
        Self::new(collection, fields)
    }

    /// Field list in the `field:dir,field:dir` form accepted by [`Self::parse`].
    pub fn fields_spec(&self) -> String {
        self.fields
            .iter()
            .map(|field| format!("{}:{}", field.field, field.direction))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Stable registry key for this index.
    pub fn id(&self) -> String {
        format!("{}|{}", self.collection, self.fields_spec())
    }

    /// Admin-console link that would create this index.
    pub fn create_url(&self, console_url: &str, project_id: &str) -> String {
        format!(
            "{}/project/{}/indexes/new?collection={}&fields={}",
            console_url.trim_end_matches('/'),
            project_id,
            self.collection,
            self.fields_spec()
        )
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Collection names are non-empty ASCII words (`[A-Za-z0-9_-]+`).
///
/// # Errors
/// Returns [`AppError::BadRequest`] for any other name.
pub fn validate_collection_name(collection: &str) -> Result<(), AppError> {
    if collection.is_empty() || !collection.chars().all(is_name_char) {
        return Err(AppError::BadRequest(format!(
            "invalid collection name '{}'",
            collection
        )));
    }
    Ok(())
}

/// Field paths are dot-separated ASCII words.
///
/// # Errors
/// Returns [`AppError::BadRequest`] for empty segments or other characters.
pub fn validate_field_path(path: &str) -> Result<(), AppError> {
    let valid = path
        .split('.')
        .all(|segment| !segment.is_empty() && segment.chars().all(is_name_char));
    if !valid {
        return Err(AppError::BadRequest(format!("invalid field path '{}'", path)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_directions_and_defaults_to_ascending() {
        let index = IndexDefinition::parse("notifications", "recipientEmail, createdAt:DESC")
            .expect("parse");
        assert_eq!(
            index.fields,
            vec![
                IndexField::new("recipientEmail", Direction::Asc),
                IndexField::new("createdAt", Direction::Desc),
            ]
        );
        assert_eq!(index.fields_spec(), "recipientEmail:asc,createdAt:desc");
        assert_eq!(index.id(), "notifications|recipientEmail:asc,createdAt:desc");
    }

    #[test]
    fn parse_rejects_single_field_duplicates_and_bad_directions() {
        assert!(IndexDefinition::parse("posts", "slug:asc").is_err());
        assert!(IndexDefinition::parse("posts", "slug,slug:desc").is_err());
        assert!(IndexDefinition::parse("posts", "slug:up,title").is_err());
        assert!(IndexDefinition::parse("bad name", "a,b").is_err());
        assert!(IndexDefinition::parse("posts", "a..b,c").is_err());
    }

    #[test]
    fn create_url_embeds_project_and_field_spec() {
        let index = IndexDefinition::parse("notifications", "recipientEmail:asc,createdAt:desc")
            .expect("parse");
        assert_eq!(
            index.create_url("https://console.inkpost.dev/", "inkpost-blog"),
            "https://console.inkpost.dev/project/inkpost-blog/indexes/new?collection=notifications&fields=recipientEmail:asc,createdAt:desc"
        );
    }
}
