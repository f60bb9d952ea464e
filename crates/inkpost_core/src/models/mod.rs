//! Document models and JSON field helpers.

/// Notification documents.
pub mod notification;
/// Post documents and the normalized post view.
pub mod post;
/// User documents.
pub mod user;


use serde_json::{Map, Value};

pub use notification::Notification;
pub use post::{Author, Post};
pub use user::User;

/// A stored document: opaque id plus a schemaless JSON object body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    /// Build a document from an id and object body.
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Look up a field by dotted path (`author.email`).
    ///
    /// # Returns
    /// The value when every path segment resolves through nested objects.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.data.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up a string field by dotted path.
    pub fn str_field(&self, path: &str) -> Option<&str> {
        self.field(path).and_then(Value::as_str)
    }

    /// Look up a string field that is present and non-empty, untrimmed.
    pub fn present_str(&self, path: &str) -> Option<&str> {
        self.str_field(path).filter(|value| !value.is_empty())
    }

    /// Look up a string field that is non-empty after trimming.
    ///
    /// # Returns
    /// The trimmed value, or `None` when missing, not a string, or blank.
    pub fn nonempty_str(&self, path: &str) -> Option<&str> {
        self.str_field(path)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Return the first non-blank string among `paths`, in order.
    pub fn first_nonempty_str(&self, paths: &[&str]) -> Option<&str> {
        paths.iter().find_map(|path| self.nonempty_str(path))
    }
}

/// Set a value at a dotted path inside `data`.
///
/// Intermediate segments that are missing or hold non-object values are
/// replaced with empty objects; sibling keys are left untouched.
///
/// # Errors
/// Returns a message when `path` is empty or contains an empty segment.
pub(crate) fn set_field_path(
    data: &mut Map<String, Value>,
    path: &str,
    value: Value,
) -> Result<(), String> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(format!("invalid field path '{}'", path));
    }
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| format!("invalid field path '{}'", path))?;

    let mut current = data;
    for segment in parents {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot
            .as_object_mut()
            .ok_or_else(|| format!("field path '{}' crosses a non-object", path))?;
    }
    current.insert((*last).to_string(), value);
    Ok(())
}
