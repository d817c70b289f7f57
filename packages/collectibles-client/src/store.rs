//! Local persistence: a string key-value store and per-owner record lists.
//!
//! The store is a best-effort display cache; the contract is the source of
//! truth. Appends are serialized within one process only, so two processes
//! sharing a store directory can lose each other's writes.

use collectibles_types::{parse_address, to_checksum};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::models::{PersistedRecord, Titled};
use crate::Error;

/// String blobs by key, like browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
    fn remove(&self, key: &str) -> Result<(), Error>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        (**self).remove(key)
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, Error> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            return Err(Error::Storage(format!("invalid store key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Storage(format!("failed to create store directory: {e}")))?;

        // Atomic write: tmp + rename
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| Error::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| Error::Storage(format!("failed to rename {}: {e}", tmp.display())))?;

        debug!(path = %path.display(), bytes = value.len(), "Store entry written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let path = self.path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}

/// Which record list a repository manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Collectibles the owner created.
    Created,
    /// Collectibles the owner minted from the marketplace.
    Purchased,
}

impl Collection {
    pub fn key(self) -> &'static str {
        match self {
            Self::Created => "userNFTs",
            Self::Purchased => "purchasedNFTs",
        }
    }
}

type OwnerMap = BTreeMap<String, Vec<PersistedRecord>>;

/// Per-owner append-only record lists over a [`KeyValueStore`].
pub struct RecordRepository<S> {
    store: Arc<S>,
    collection: Collection,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> RecordRepository<S> {
    pub fn new(store: Arc<S>, collection: Collection) -> Self {
        Self {
            store,
            collection,
            write_lock: Mutex::new(()),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Records for `owner`, oldest first.
    pub fn get(&self, owner: &str) -> Result<Vec<PersistedRecord>, Error> {
        let mut all = self.load_all()?;
        Ok(all.remove(&owner_key(owner)).unwrap_or_default())
    }

    /// Append under `record.owner`; other owners are rewritten unchanged.
    pub fn append(&self, record: PersistedRecord) -> Result<(), Error> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut all = self.load_all()?;
        let key = owner_key(&record.owner);
        let title = record.title.clone();
        let list = all.entry(key.clone()).or_default();
        list.push(record);
        let count = list.len();
        self.save_all(&all)?;
        info!(
            collection = self.collection.key(),
            owner = %key,
            title = %title,
            count,
            "Record persisted"
        );
        Ok(())
    }

    /// Drop every record for `owner`.
    pub fn clear(&self, owner: &str) -> Result<(), Error> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut all = self.load_all()?;
        if all.remove(&owner_key(owner)).is_some() {
            self.save_all(&all)?;
        }
        Ok(())
    }

    /// Items whose title is not yet recorded under `owner`.
    pub fn filter_available<T: Titled>(&self, items: Vec<T>, owner: &str) -> Result<Vec<T>, Error> {
        let owned = self.get(owner)?;
        Ok(items
            .into_iter()
            .filter(|item| !owned.iter().any(|r| r.title() == item.title()))
            .collect())
    }

    /// Whole collection. Unparseable contents read as empty.
    fn load_all(&self) -> Result<OwnerMap, Error> {
        let Some(blob) = self.store.get(self.collection.key())? else {
            return Ok(OwnerMap::new());
        };
        match serde_json::from_str(&blob) {
            Ok(all) => Ok(all),
            Err(e) => {
                warn!(
                    collection = self.collection.key(),
                    error = %e,
                    "Stored records are corrupted, treating as empty"
                );
                Ok(OwnerMap::new())
            }
        }
    }

    fn save_all(&self, all: &OwnerMap) -> Result<(), Error> {
        let blob = serde_json::to_string(all)
            .map_err(|e| Error::Storage(format!("failed to serialize records: {e}")))?;
        self.store.set(self.collection.key(), &blob)
    }
}

/// Checksummed form for valid addresses so case variants share one list.
pub fn owner_key(owner: &str) -> String {
    let owner = owner.trim();
    match parse_address(owner) {
        Ok(address) => to_checksum(&address),
        Err(_) => owner.to_string(),
    }
}
