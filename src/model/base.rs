//! Common record metadata shared by every entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{ModelError, ModelResult};

/// Identifier and timestamps carried by every stored entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, generated at creation and never changed
    pub id: Uuid,

    /// When the entity was created
    pub created_at: DateTime<Utc>,

    /// When the entity was last mutated
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Create fresh metadata with a new identifier
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a required text field with a maximum length in characters.
///
/// `label` is the capitalized field name used in the error message.
pub fn require_text(label: &str, value: &str, max_chars: Option<usize>) -> ModelResult<()> {
    if value.is_empty() {
        return Err(ModelError::validation(format!("{} is required", label)));
    }

    if let Some(max) = max_chars {
        if value.chars().count() > max {
            return Err(ModelError::validation(format!(
                "{} cannot exceed {} characters",
                label, max
            )));
        }
    }

    Ok(())
}

/// Insert `id` into `ids` unless already present. Returns true if inserted.
pub(crate) fn insert_unique(ids: &mut Vec<Uuid>, id: Uuid) -> bool {
    if ids.contains(&id) {
        return false;
    }
    ids.push(id);
    true
}

/// Remove `id` from `ids` if present. Returns true if removed.
pub(crate) fn remove_id(ids: &mut Vec<Uuid>, id: Uuid) -> bool {
    let before = ids.len();
    ids.retain(|existing| *existing != id);
    ids.len() != before
}
