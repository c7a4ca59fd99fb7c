//! # Durable Repository Backend
//!
//! One table file per entity kind under `<data_dir>/tables/<kind>.json`.
//!
//! File layout:
//! ```text
//! {"kind":"users","count":2,"checksum":1234567890}\n
//! [ ...rows as JSON... ]
//! ```
//! The header's CRC32 covers the body bytes exactly as written.
//!
//! Every mutation is applied to a copy of the table, written with
//! temp file + fsync + rename, and only then swapped in. A failed write
//! leaves both the file and the in-memory table unchanged.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::errors::{RepositoryError, RepositoryResult};
use super::table::Table;
use super::Repository;
use crate::model::Entity;

/// CRC32 (IEEE) of a table body
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// First line of a table file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TableHeader {
    kind: String,
    count: usize,
    checksum: u32,
}

/// Path of the table file for `T` under `data_dir`
pub fn table_path<T: Entity>(data_dir: &Path) -> PathBuf {
    data_dir.join("tables").join(format!("{}.json", T::KIND))
}

/// Encode rows into the on-disk table format
fn encode<T: Entity>(rows: &[T]) -> RepositoryResult<Vec<u8>> {
    let body = serde_json::to_vec_pretty(rows)
        .map_err(|e| RepositoryError::storage(format!("failed to serialize {}: {}", T::KIND, e)))?;
    let header = TableHeader {
        kind: T::KIND.to_string(),
        count: rows.len(),
        checksum: compute_checksum(&body),
    };
    let mut bytes = serde_json::to_vec(&header)
        .map_err(|e| RepositoryError::storage(format!("failed to serialize header: {}", e)))?;
    bytes.push(b'\n');
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode and verify a table file. Any mismatch is corruption.
fn decode<T: Entity>(bytes: &[u8]) -> RepositoryResult<Vec<T>> {
    let split = bytes
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| RepositoryError::corruption(format!("{} table has no header", T::KIND)))?;
    let (header_bytes, body) = (&bytes[..split], &bytes[split + 1..]);

    let header: TableHeader = serde_json::from_slice(header_bytes).map_err(|e| {
        RepositoryError::corruption(format!("{} table header unreadable: {}", T::KIND, e))
    })?;
    if header.kind != T::KIND {
        return Err(RepositoryError::corruption(format!(
            "expected {} table, found {}",
            T::KIND,
            header.kind
        )));
    }
    if compute_checksum(body) != header.checksum {
        return Err(RepositoryError::corruption(format!(
            "{} table checksum mismatch",
            T::KIND
        )));
    }

    let rows: Vec<T> = serde_json::from_slice(body).map_err(|e| {
        RepositoryError::corruption(format!("{} table rows unreadable: {}", T::KIND, e))
    })?;
    if rows.len() != header.count {
        return Err(RepositoryError::corruption(format!(
            "{} table holds {} rows, header says {}",
            T::KIND,
            rows.len(),
            header.count
        )));
    }
    Ok(rows)
}

/// Write `bytes` to `path` atomically (temp file, fsync, rename, dir fsync)
fn write_atomic(path: &Path, bytes: &[u8]) -> RepositoryResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| RepositoryError::storage(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(parent).map_err(|e| {
        RepositoryError::storage(format!("failed to create {}: {}", parent.display(), e))
    })?;

    let temp_path = path.with_extension("json.tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| RepositoryError::storage(format!("failed to create temp table file: {}", e)))?;
    file.write_all(bytes)
        .map_err(|e| RepositoryError::storage(format!("failed to write table file: {}", e)))?;
    file.sync_all()
        .map_err(|e| RepositoryError::storage(format!("failed to fsync table file: {}", e)))?;

    fs::rename(&temp_path, path)
        .map_err(|e| RepositoryError::storage(format!("failed to commit table file: {}", e)))?;

    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

/// Repository persisted to a checksummed JSON table file
#[derive(Debug)]
pub struct FileRepository<T: Entity> {
    path: PathBuf,
    table: RwLock<Table<T>>,
}

impl<T: Entity> FileRepository<T> {
    /// Open the table for `T` under `data_dir`, loading it if present.
    ///
    /// A missing file is an empty table. A file that fails verification is
    /// reported as corruption and nothing is loaded.
    pub fn open(data_dir: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = table_path::<T>(data_dir.as_ref());
        let table = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| {
                RepositoryError::storage(format!("failed to read {}: {}", path.display(), e))
            })?;
            let rows = decode::<T>(&bytes)?;
            Table::from_rows(rows).map_err(|e| match e {
                RepositoryError::Conflict(msg) => RepositoryError::corruption(msg),
                other => other,
            })?
        } else {
            Table::new()
        };

        debug!(kind = T::KIND, rows = table.len(), path = %path.display(), "table loaded");

        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
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

    /// Run `op` on a copy of the table, persist it, then swap it in.
    fn mutate<R>(&self, op: impl FnOnce(&mut Table<T>) -> RepositoryResult<R>) -> RepositoryResult<R> {
        let mut guard = self.write()?;
        let mut next = guard.clone();
        let result = op(&mut next)?;
        write_atomic(&self.path, &encode(&next.rows())?)?;
        *guard = next;
        Ok(result)
    }
}

impl<T: Entity> Repository<T> for FileRepository<T> {
    fn add(&self, entity: T) -> RepositoryResult<T> {
        self.mutate(|table| table.insert(entity))
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
        self.mutate(|table| table.update(id, patch))
    }

    fn replace(&self, entity: T) -> RepositoryResult<T> {
        self.mutate(|table| table.replace(entity))
    }

    fn delete(&self, id: Uuid) -> RepositoryResult<T> {
        self.mutate(|table| table.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amenity, AmenityPatch};
    use tempfile::TempDir;

    fn amenity(name: &str) -> Amenity {
        Amenity::new(name.to_string()).unwrap()
    }

    #[test]
    fn test_checksum_detects_single_bit_flip() {
        let mut data = b"[{\"name\":\"Pool\"}]".to_vec();
        let original = compute_checksum(&data);
        data[4] ^= 0x01;
        assert_ne!(original, compute_checksum(&data));
    }

    #[test]
    fn test_encode_decode() {
        let rows = vec![amenity("Pool"), amenity("Sauna")];
        let bytes = encode(&rows).unwrap();
        let decoded: Vec<Amenity> = decode(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].name, "Sauna");
        assert_eq!(decoded[0].record, rows[0].record);
    }

    #[test]
    fn test_decode_rejects_wrong_kind() {
        let bytes = encode(&[amenity("Pool")]).unwrap();
        let err = decode::<crate::model::User>(&bytes).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_file_is_empty_table() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::<Amenity>::open(dir.path()).unwrap();
        assert!(repo.get_all().unwrap().is_empty());
        assert!(!repo.path().exists());
    }

    #[test]
    fn test_mutations_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let (pool_id, gym_id) = {
            let repo = FileRepository::<Amenity>::open(dir.path()).unwrap();
            let pool = repo.add(amenity("Pool")).unwrap();
            let gym = repo.add(amenity("Gym")).unwrap();
            repo.update(
                pool.id(),
                &AmenityPatch {
                    name: Some("Heated pool".to_string()),
                },
            )
            .unwrap();
            (pool.id(), gym.id())
        };

        let repo = FileRepository::<Amenity>::open(dir.path()).unwrap();
        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.get(pool_id).unwrap().unwrap().name, "Heated pool");

        repo.delete(gym_id).unwrap();
        let reopened = FileRepository::<Amenity>::open(dir.path()).unwrap();
        assert!(reopened.get(gym_id).unwrap().is_none());
        // Unique index is rebuilt on load
        assert!(matches!(
            reopened.add(amenity("Heated pool")),
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn test_failed_mutation_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let repo = FileRepository::<Amenity>::open(dir.path()).unwrap();
        repo.add(amenity("Pool")).unwrap();
        let before = fs::read(repo.path()).unwrap();

        assert!(repo.add(amenity("Pool")).is_err());
        assert_eq!(fs::read(repo.path()).unwrap(), before);
    }

    #[test]
    fn test_corrupted_file_refuses_to_load() {
        let dir = TempDir::new().unwrap();
        let path = {
            let repo = FileRepository::<Amenity>::open(dir.path()).unwrap();
            repo.add(amenity("Pool")).unwrap();
            repo.path().to_path_buf()
        };

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 3;
        bytes[last] ^= 0x20;
        fs::write(&path, &bytes).unwrap();

        let err = FileRepository::<Amenity>::open(dir.path()).unwrap_err();
        assert!(matches!(err, RepositoryError::Corruption(_)));
    }
}
