use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use htlc_core::types::{HashLock, Htlc, HtlcState};

use crate::error::StoreError;

/// Iterator over open contracts in deadline order.
pub type OpenIter<'a> = Box<dyn Iterator<Item = Result<Htlc, StoreError>> + 'a>;

/// Contract store keyed by hash lock.
///
/// Entries are never removed. Implementations keep an expiry index holding
/// exactly the entries whose state is `Open`, ordered by
/// `(expiration_height, hash_lock)`.
pub trait HtlcStore: Send + Sync {
    /// Insert a new entry. Fails with `AlreadyExists` if the key was ever used.
    fn put(&self, htlc: &Htlc) -> Result<(), StoreError>;

    /// Fetch an entry. Fails with `NotFound` if absent.
    fn get(&self, hash_lock: &HashLock) -> Result<Htlc, StoreError>;

    /// Overwrite an existing entry in place.
    fn update(&self, htlc: &Htlc) -> Result<(), StoreError>;

    /// Whether an entry exists under `hash_lock`, in any state.
    fn contains(&self, hash_lock: &HashLock) -> Result<bool, StoreError>;

    /// Open entries in ascending `expiration_height` order.
    fn open_by_expiration(&self) -> Result<OpenIter<'_>, StoreError>;

    /// Number of stored entries, terminal ones included.
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl<T: HtlcStore + ?Sized> HtlcStore for Arc<T> {
    fn put(&self, htlc: &Htlc) -> Result<(), StoreError> {
        (**self).put(htlc)
    }

    fn get(&self, hash_lock: &HashLock) -> Result<Htlc, StoreError> {
        (**self).get(hash_lock)
    }

    fn update(&self, htlc: &Htlc) -> Result<(), StoreError> {
        (**self).update(htlc)
    }

    fn contains(&self, hash_lock: &HashLock) -> Result<bool, StoreError> {
        (**self).contains(hash_lock)
    }

    fn open_by_expiration(&self) -> Result<OpenIter<'_>, StoreError> {
        (**self).open_by_expiration()
    }

    fn len(&self) -> Result<usize, StoreError> {
        (**self).len()
    }
}

#[derive(Default)]
struct MemoryState {
    htlcs: HashMap<HashLock, Htlc>,
    expiry_queue: BTreeSet<(u64, HashLock)>,
}

/// In-memory contract store for tests and embedded hosts.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Corrupted("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Corrupted("memory store lock poisoned".into()))
    }
}

impl HtlcStore for MemoryStore {
    fn put(&self, htlc: &Htlc) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.htlcs.contains_key(&htlc.hash_lock) {
            return Err(StoreError::AlreadyExists(htlc.hash_lock));
        }
        if htlc.state == HtlcState::Open {
            state
                .expiry_queue
                .insert((htlc.expiration_height, htlc.hash_lock));
        }
        state.htlcs.insert(htlc.hash_lock, htlc.clone());
        Ok(())
    }

    fn get(&self, hash_lock: &HashLock) -> Result<Htlc, StoreError> {
        self.read()?
            .htlcs
            .get(hash_lock)
            .cloned()
            .ok_or(StoreError::NotFound(*hash_lock))
    }

    fn update(&self, htlc: &Htlc) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let previous = state
            .htlcs
            .get(&htlc.hash_lock)
            .ok_or(StoreError::NotFound(htlc.hash_lock))?;
        let old_key = (previous.expiration_height, previous.hash_lock);

        state.expiry_queue.remove(&old_key);
        if htlc.state == HtlcState::Open {
            state
                .expiry_queue
                .insert((htlc.expiration_height, htlc.hash_lock));
        }
        state.htlcs.insert(htlc.hash_lock, htlc.clone());
        Ok(())
    }

    fn contains(&self, hash_lock: &HashLock) -> Result<bool, StoreError> {
        Ok(self.read()?.htlcs.contains_key(hash_lock))
    }

    fn open_by_expiration(&self) -> Result<OpenIter<'_>, StoreError> {
        // Snapshot the index so callers may update entries while iterating.
        let keys: Vec<HashLock> = self
            .read()?
            .expiry_queue
            .iter()
            .map(|(_, hash_lock)| *hash_lock)
            .collect();
        Ok(Box::new(keys.into_iter().map(move |key| self.get(&key))))
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.htlcs.len())
    }
}
