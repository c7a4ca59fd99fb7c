//! # Repositories
//!
//! Generic CRUD over a backing store. Two backends share one in-memory
//! table implementation:
//! - [`InMemoryRepository`]: process-local, lost on restart
//! - [`FileRepository`]: same table, persisted to a checksummed file on
//!   every mutation
//!
//! Callers hold `Arc<dyn Repository<T>>` and never see which backend is in use.

pub mod errors;
pub mod file;
pub mod memory;
pub mod table;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use errors::{RepositoryError, RepositoryResult};
pub use file::FileRepository;
pub use memory::InMemoryRepository;

use crate::model::Entity;

/// CRUD contract for one entity collection
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert a new entity. Conflict if its id or a unique key is taken.
    fn add(&self, entity: T) -> RepositoryResult<T>;

    /// Fetch by id. A missing id is `Ok(None)`.
    fn get(&self, id: Uuid) -> RepositoryResult<Option<T>>;

    /// All entities in insertion order
    fn get_all(&self) -> RepositoryResult<Vec<T>>;

    /// First entity whose serialized field `name` equals `value`
    fn get_by_attribute(&self, name: &str, value: &Value) -> RepositoryResult<Option<T>>;

    /// Apply a validated partial update; nothing is stored on failure.
    fn update(&self, id: Uuid, patch: &T::Patch) -> RepositoryResult<T>;

    /// Store a modified copy of an existing entity
    fn replace(&self, entity: T) -> RepositoryResult<T>;

    /// Remove by id and return the removed entity
    fn delete(&self, id: Uuid) -> RepositoryResult<T>;
}

/// Which backend to open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    File { data_dir: PathBuf },
}

impl StorageConfig {
    /// Open the collection for `T` on this backend
    pub fn open<T: Entity>(&self) -> RepositoryResult<Arc<dyn Repository<T>>> {
        match self {
            StorageConfig::Memory => Ok(Arc::new(InMemoryRepository::<T>::new())),
            StorageConfig::File { data_dir } => Ok(Arc::new(FileRepository::<T>::open(data_dir)?)),
        }
    }
}
