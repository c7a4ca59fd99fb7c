//! In-memory table shared by both repository backends.
//!
//! Every operation either fully applies or leaves the table unchanged.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use super::errors::{RepositoryError, RepositoryResult};
use crate::model::Entity;

type UniqueKey = (&'static str, String);

/// Rows keyed by id, with insertion order and a unique-key index
#[derive(Debug, Clone)]
pub struct Table<T: Entity> {
    rows: HashMap<Uuid, T>,
    order: Vec<Uuid>,
    unique: HashMap<UniqueKey, Uuid>,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
            unique: HashMap::new(),
        }
    }
}

impl<T: Entity> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from rows in their stored order.
    pub fn from_rows(rows: Vec<T>) -> RepositoryResult<Self> {
        let mut table = Self::new();
        for row in rows {
            table.insert(row)?;
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Rows in insertion order
    pub fn rows(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.rows.get(id))
            .cloned()
            .collect()
    }

    /// First row whose serialized field `name` equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &Value) -> RepositoryResult<Option<T>> {
        for id in &self.order {
            let Some(row) = self.rows.get(id) else {
                continue;
            };
            let serialized = serde_json::to_value(row).map_err(|e| {
                RepositoryError::storage(format!("failed to serialize {}: {}", T::KIND, e))
            })?;
            if serialized.get(name) == Some(value) {
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    pub fn insert(&mut self, row: T) -> RepositoryResult<T> {
        let id = row.id();
        if self.rows.contains_key(&id) {
            return Err(RepositoryError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                id
            )));
        }
        let keys = row.unique_keys();
        self.check_unique(&keys, None)?;

        for key in keys {
            self.unique.insert(key, id);
        }
        self.order.push(id);
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    /// Apply `patch` to a copy of the row and store it if it validates.
    pub fn update(&mut self, id: Uuid, patch: &T::Patch) -> RepositoryResult<T> {
        let mut row = self.require(id)?.clone();
        row.apply_patch(patch)?;
        self.store(row)
    }

    /// Overwrite an existing row with a modified copy.
    pub fn replace(&mut self, row: T) -> RepositoryResult<T> {
        self.require(row.id())?;
        self.store(row)
    }

    pub fn remove(&mut self, id: Uuid) -> RepositoryResult<T> {
        let row = self
            .rows
            .remove(&id)
            .ok_or(RepositoryError::NotFound { kind: T::KIND, id })?;
        self.order.retain(|existing| *existing != id);
        self.unique.retain(|_, owner| *owner != id);
        Ok(row)
    }

    fn require(&self, id: Uuid) -> RepositoryResult<&T> {
        self.rows
            .get(&id)
            .ok_or(RepositoryError::NotFound { kind: T::KIND, id })
    }

    fn store(&mut self, row: T) -> RepositoryResult<T> {
        let id = row.id();
        let keys = row.unique_keys();
        self.check_unique(&keys, Some(id))?;

        self.unique.retain(|_, owner| *owner != id);
        for key in keys {
            self.unique.insert(key, id);
        }
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    fn check_unique(&self, keys: &[UniqueKey], exclude: Option<Uuid>) -> RepositoryResult<()> {
        for key in keys {
            if let Some(owner) = self.unique.get(key) {
                if Some(*owner) != exclude {
                    return Err(RepositoryError::Conflict(format!(
                        "{} with {} '{}' already exists",
                        T::KIND,
                        key.0,
                        key.1
                    )));
                }
            }
        }
        Ok(())
    }
}
