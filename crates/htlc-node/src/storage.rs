//! RocksDB storage backend for the HTLC node.
//!
//! One database holds the contract store, its expiry index, the account
//! ledger, and node state, each in its own column family. Multi-key changes
//! go through a single `WriteBatch` so a crash never leaves the expiry index
//! out of step with the contracts, or a transfer half applied.

use anyhow::Result;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use htlc_core::types::{Address, Amount, HashLock, Htlc, HtlcState, HASH_LENGTH};
use htlc_engine::store::OpenIter;
use htlc_engine::{AccountLedger, HtlcStore, LedgerError, StoreError};

/// Column family names for different data types.
const CF_HTLCS: &str = "htlcs";
const CF_EXPIRY_QUEUE: &str = "expiry_queue";
const CF_BALANCES: &str = "balances";
const CF_STATE: &str = "state";

const KEY_HEIGHT: &str = "height";
const KEY_GENESIS: &str = "genesis";

/// RocksDB-backed storage for the HTLC node.
pub struct Storage {
    db: DB,
    /// Serializes balance read-modify-write cycles.
    ledger_lock: Mutex<()>,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_HTLCS, Options::default()),
            ColumnFamilyDescriptor::new(CF_EXPIRY_QUEUE, Options::default()),
            ColumnFamilyDescriptor::new(CF_BALANCES, Options::default()),
            ColumnFamilyDescriptor::new(CF_STATE, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db,
            ledger_lock: Mutex::new(()),
        })
    }

    fn cf(&self, cf_name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))
    }

    /// Put a value into a column family.
    pub fn put_cf(&self, cf_name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    /// Get a value from a column family.
    pub fn get_cf(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf_name)?;
        let value = self.db.get_cf(cf, key)?;
        Ok(value)
    }

    /// Store node state.
    pub fn put_state(&self, key: &str, data: &[u8]) -> Result<()> {
        self.put_cf(CF_STATE, key.as_bytes(), data)
    }

    /// Get node state.
    pub fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get_cf(CF_STATE, key.as_bytes())
    }

    /// Height of the last committed block, 0 on a fresh database.
    pub fn height(&self) -> Result<u64> {
        match self.get_state(KEY_HEIGHT)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("stored height has {} bytes", bytes.len()))?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    /// Record the height of the last committed block.
    pub fn set_height(&self, height: u64) -> Result<()> {
        self.put_state(KEY_HEIGHT, &height.to_be_bytes())
    }

    /// Credit the genesis balances unless a previous start already did.
    ///
    /// Returns whether anything was written.
    pub fn apply_genesis(&self, accounts: &[(Address, Amount)]) -> Result<bool> {
        if self.get_state(KEY_GENESIS)?.is_some() {
            return Ok(false);
        }

        let _guard = self
            .ledger_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("ledger lock poisoned"))?;
        // Sum repeated entries first; the batch cannot read its own writes.
        let mut credits: BTreeMap<Vec<u8>, u128> = BTreeMap::new();
        for (address, amount) in accounts {
            let key = balance_key(address, &amount.denom);
            let current = match credits.get(&key) {
                Some(value) => *value,
                None => self.read_balance(&key)?,
            };
            let credited = current
                .checked_add(amount.value)
                .ok_or_else(|| anyhow::anyhow!("genesis balance overflow for {}", address))?;
            credits.insert(key, credited);
        }

        let balances = self.cf(CF_BALANCES)?;
        let mut batch = WriteBatch::default();
        for (key, value) in &credits {
            batch.put_cf(balances, key, value.to_be_bytes());
        }
        batch.put_cf(self.cf(CF_STATE)?, KEY_GENESIS.as_bytes(), b"1");
        self.db.write(batch)?;
        Ok(true)
    }

    fn lock_ledger(&self) -> Result<std::sync::MutexGuard<'_, ()>, LedgerError> {
        self.ledger_lock
            .lock()
            .map_err(|_| LedgerError::Backend("ledger lock poisoned".into()))
    }

    fn read_balance(&self, key: &[u8]) -> Result<u128> {
        match self.get_cf(CF_BALANCES, key)? {
            Some(bytes) => {
                let raw: [u8; 16] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("stored balance has {} bytes", bytes.len()))?;
                Ok(u128::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }

    fn decode_htlc(bytes: &[u8]) -> Result<Htlc, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupted(e.to_string()))
    }

    fn encode_htlc(htlc: &Htlc) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(htlc).map_err(|e| StoreError::Corrupted(e.to_string()))
    }
}

/// Expiry index key: big-endian height, then the hash lock, so iteration
/// order is deadline order.
fn expiry_key(expiration_height: u64, hash_lock: &HashLock) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + HASH_LENGTH);
    key.extend_from_slice(&expiration_height.to_be_bytes());
    key.extend_from_slice(hash_lock.as_bytes());
    key
}

fn hash_lock_from_expiry_key(key: &[u8]) -> Result<HashLock, StoreError> {
    let raw: [u8; HASH_LENGTH] = key
        .get(8..)
        .and_then(|tail| tail.try_into().ok())
        .ok_or_else(|| StoreError::Corrupted(format!("expiry key has {} bytes", key.len())))?;
    Ok(HashLock::new(raw))
}

/// `len(address) as u32 BE ‖ address ‖ denom`. The length prefix keeps
/// distinct `(address, denom)` pairs from sharing a key.
fn balance_key(account: &Address, denom: &str) -> Vec<u8> {
    let address = account.as_str().as_bytes();
    let mut key = Vec::with_capacity(4 + address.len() + denom.len());
    key.extend_from_slice(&(address.len() as u32).to_be_bytes());
    key.extend_from_slice(address);
    key.extend_from_slice(denom.as_bytes());
    key
}

fn store_backend(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn ledger_backend(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Backend(err.to_string())
}

impl HtlcStore for Storage {
    fn put(&self, htlc: &Htlc) -> Result<(), StoreError> {
        if self.contains(&htlc.hash_lock)? {
            return Err(StoreError::AlreadyExists(htlc.hash_lock));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_HTLCS).map_err(store_backend)?,
            htlc.hash_lock.as_bytes(),
            Self::encode_htlc(htlc)?,
        );
        if htlc.state == HtlcState::Open {
            batch.put_cf(
                self.cf(CF_EXPIRY_QUEUE).map_err(store_backend)?,
                expiry_key(htlc.expiration_height, &htlc.hash_lock),
                b"",
            );
        }
        self.db.write(batch).map_err(store_backend)
    }

    fn get(&self, hash_lock: &HashLock) -> Result<Htlc, StoreError> {
        let bytes = self
            .get_cf(CF_HTLCS, hash_lock.as_bytes())
            .map_err(store_backend)?
            .ok_or(StoreError::NotFound(*hash_lock))?;
        Self::decode_htlc(&bytes)
    }

    fn update(&self, htlc: &Htlc) -> Result<(), StoreError> {
        let previous = HtlcStore::get(self, &htlc.hash_lock)?;
        let expiry_queue = self.cf(CF_EXPIRY_QUEUE).map_err(store_backend)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(
            expiry_queue,
            expiry_key(previous.expiration_height, &previous.hash_lock),
        );
        if htlc.state == HtlcState::Open {
            batch.put_cf(
                expiry_queue,
                expiry_key(htlc.expiration_height, &htlc.hash_lock),
                b"",
            );
        }
        batch.put_cf(
            self.cf(CF_HTLCS).map_err(store_backend)?,
            htlc.hash_lock.as_bytes(),
            Self::encode_htlc(htlc)?,
        );
        self.db.write(batch).map_err(store_backend)
    }

    fn contains(&self, hash_lock: &HashLock) -> Result<bool, StoreError> {
        Ok(self
            .get_cf(CF_HTLCS, hash_lock.as_bytes())
            .map_err(store_backend)?
            .is_some())
    }

    fn open_by_expiration(&self) -> Result<OpenIter<'_>, StoreError> {
        let cf = self.cf(CF_EXPIRY_QUEUE).map_err(store_backend)?;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::Start)
            .map(move |item| {
                let (key, _) = item.map_err(store_backend)?;
                let hash_lock = hash_lock_from_expiry_key(&key)?;
                HtlcStore::get(self, &hash_lock)
            });
        Ok(Box::new(iter))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let cf = self.cf(CF_HTLCS).map_err(store_backend)?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item.map_err(store_backend)?;
            count += 1;
        }
        Ok(count)
    }
}

impl AccountLedger for Storage {
    fn transfer(&self, from: &Address, to: &Address, amount: &Amount) -> Result<(), LedgerError> {
        let _guard = self.lock_ledger()?;

        let from_key = balance_key(from, &amount.denom);
        let available = self.read_balance(&from_key).map_err(ledger_backend)?;
        if available < amount.value {
            return Err(LedgerError::InsufficientBalance {
                account: from.clone(),
                denom: amount.denom.clone(),
                available,
                required: amount.value,
            });
        }
        if from == to {
            return Ok(());
        }

        let to_key = balance_key(to, &amount.denom);
        let credited = self
            .read_balance(&to_key)
            .map_err(ledger_backend)?
            .checked_add(amount.value)
            .ok_or_else(|| LedgerError::Overflow {
                account: to.clone(),
                denom: amount.denom.clone(),
            })?;

        let balances = self.cf(CF_BALANCES).map_err(ledger_backend)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(balances, &from_key, (available - amount.value).to_be_bytes());
        batch.put_cf(balances, &to_key, credited.to_be_bytes());
        self.db.write(batch).map_err(ledger_backend)?;

        tracing::trace!(%from, %to, %amount, "ledger transfer");
        Ok(())
    }

    fn balance_of(&self, account: &Address, denom: &str) -> Result<u128, LedgerError> {
        self.read_balance(&balance_key(account, denom))
            .map_err(ledger_backend)
    }
}
