//! Process-local repository backend.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use uuid::Uuid;

use super::errors::{RepositoryError, RepositoryResult};
use super::table::Table;
use super::Repository;
use crate::model::Entity;

/// Repository kept entirely in memory. Contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryRepository<T: Entity> {
    table: RwLock<Table<T>>,
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table::new()),
        }
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Table<T>>> {
        self.table
            .read()
            .map_err(|_| RepositoryError::storage(format!("{} table lock poisoned", T::KIND)))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Table<T>>> {
        self.table
            .write()
            .map_err(|_| RepositoryError::storage(format!("{} table lock poisoned", T::KIND)))
    }
}

impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    fn add(&self, entity: T) -> RepositoryResult<T> {
        self.write()?.insert(entity)
    }

    fn get(&self, id: Uuid) -> RepositoryResult<Option<T>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn get_all(&self) -> RepositoryResult<Vec<T>> {
        Ok(self.read()?.rows())
    }

    fn get_by_attribute(&self, name: &str, value: &Value) -> RepositoryResult<Option<T>> {
        self.read()?.find_by_attribute(name, value)
    }

    fn update(&self, id: Uuid, patch: &T::Patch) -> RepositoryResult<T> {
        self.write()?.update(id, patch)
    }

    fn replace(&self, entity: T) -> RepositoryResult<T> {
        self.write()?.replace(entity)
    }

    fn delete(&self, id: Uuid) -> RepositoryResult<T> {
        self.write()?.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{User, UserPatch};
    use serde_json::json;

    fn user(email: &str) -> User {
        User::new(
            "Test".to_string(),
            "User".to_string(),
            email.to_string(),
            "pw",
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_crud_cycle() {
        let repo = InMemoryRepository::<User>::new();
        let alice = repo.add(user("alice@example.com")).unwrap();

        assert_eq!(repo.get(alice.id()).unwrap().unwrap().email, "alice@example.com");
        assert!(repo.get(Uuid::new_v4()).unwrap().is_none());

        let patch = UserPatch {
            first_name: Some("Alice".to_string()),
            ..Default::default()
        };
        let updated = repo.update(alice.id(), &patch).unwrap();
        assert_eq!(updated.first_name, "Alice");
        assert!(updated.record.updated_at >= alice.record.updated_at);

        repo.delete(alice.id()).unwrap();
        assert!(repo.get_all().unwrap().is_empty());
        assert!(matches!(
            repo.delete(alice.id()),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_email_is_a_unique_key() {
        let repo = InMemoryRepository::<User>::new();
        repo.add(user("bob@example.com")).unwrap();
        assert!(matches!(
            repo.add(user("bob@example.com")),
            Err(RepositoryError::Conflict(_))
        ));
        assert_eq!(repo.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_lookup_by_email() {
        let repo = InMemoryRepository::<User>::new();
        let carol = repo.add(user("carol@example.com")).unwrap();
        repo.add(user("dave@example.com")).unwrap();

        let found = repo
            .get_by_attribute("email", &json!("carol@example.com"))
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), carol.id());
    }

    #[test]
    fn test_shared_across_threads() {
        let repo = std::sync::Arc::new(InMemoryRepository::<User>::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    repo.add(user(&format!("user{}@example.com", i))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repo.get_all().unwrap().len(), 4);
    }
}
