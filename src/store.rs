//! In-memory keyspaces for string and hash values.
//!
//! Strings and hashes live in separate maps, each behind its own lock, so a
//! key may exist independently in both. No operation ever holds both locks.

use std::{collections::HashMap, time::Duration};

use bytes::Bytes;
use thiserror::Error;
use tokio::{sync::RwLock, time::Instant};

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Key value is not integer")]
    NotInteger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringEntry {
    pub value: Bytes,
    pub expiration: Option<Instant>,
}

impl StringEntry {
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            expiration: None,
        }
    }

    pub fn with_expiration(value: Bytes, expiration: Option<Instant>) -> Self {
        Self { value, expiration }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expiration, Some(expiration) if expiration <= now)
    }
}

pub type Hash = HashMap<Bytes, StringEntry>;

#[derive(Debug, Default)]
pub struct Store {
    strings: RwLock<HashMap<Bytes, StringEntry>>,
    hashes: RwLock<HashMap<Bytes, Hash>>,
}

/// Longest expiration the clock is asked to represent.
pub const MAX_EXPIRATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Converts an `EX` seconds value into an absolute expiration instant.
///
/// Negative values produce an instant in the past. Offsets the clock cannot
/// represent are clamped to [`MAX_EXPIRATION`]; if even that overflows the
/// key gets no expiration.
pub fn expiration_from_seconds(seconds: i64) -> Option<Instant> {
    let now = Instant::now();
    let offset = Duration::from_secs(seconds.unsigned_abs());

    if seconds >= 0 {
        now.checked_add(offset)
            .or_else(|| now.checked_add(MAX_EXPIRATION))
    } else {
        Some(now.checked_sub(offset).unwrap_or(now))
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: Bytes, entry: StringEntry) {
        self.strings.write().await.insert(key, entry);
    }

    /// Returns the live value for `key`, deleting it if it has expired.
    ///
    /// The lookup runs under the shared lock. Seeing an expired entry drops
    /// it and re-acquires the exclusive lock to delete. Two readers may both
    /// try the delete; the second finds the key already gone or refreshed
    /// and leaves it alone.
    pub async fn get(&self, key: &[u8]) -> Option<Bytes> {
        let now = Instant::now();

        {
            let strings = self.strings.read().await;
            match strings.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => (),
            }
        }

        self.evict_if_expired(key, now).await;
        None
    }

    async fn evict_if_expired(&self, key: &[u8], now: Instant) -> bool {
        let mut strings = self.strings.write().await;

        match strings.get(key) {
            Some(entry) if entry.is_expired(now) => {
                strings.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Counts keys that are present and unexpired. Expired keys are left in
    /// place.
    pub async fn exists(&self, keys: &[Bytes]) -> i64 {
        let now = Instant::now();
        let strings = self.strings.read().await;

        keys.iter()
            .filter(|key| matches!(strings.get(*key), Some(entry) if !entry.is_expired(now)))
            .count() as i64
    }

    /// Removes every listed key that is present, expired or not, and returns
    /// how many were removed.
    pub async fn del(&self, keys: &[Bytes]) -> i64 {
        let mut strings = self.strings.write().await;

        keys.iter()
            .filter(|key| strings.remove(*key).is_some())
            .count() as i64
    }

    /// Increments the decimal integer stored at `key`. Missing and expired
    /// keys and empty values count as zero. The result is stored without an
    /// expiration.
    pub async fn incr(&self, key: Bytes) -> Result<i64, StoreError> {
        let now = Instant::now();
        let mut strings = self.strings.write().await;

        if matches!(strings.get(&key), Some(entry) if entry.is_expired(now)) {
            strings.remove(&key);
        }

        let current = match strings.get(&key) {
            Some(entry) if entry.value.is_empty() => 0,
            Some(entry) => std::str::from_utf8(&entry.value)
                .ok()
                .and_then(|text| text.parse::<i64>().ok())
                .ok_or(StoreError::NotInteger)?,
            None => 0,
        };

        let incremented = current.wrapping_add(1);
        strings.insert(key, StringEntry::new(Bytes::from(incremented.to_string())));

        Ok(incremented)
    }

    /// Writes field/value pairs into the hash at `key`, creating it if
    /// needed, and returns the number of pairs written.
    pub async fn hset(&self, key: Bytes, pairs: Vec<(Bytes, Bytes)>) -> i64 {
        let mut hashes = self.hashes.write().await;
        let hash = hashes.entry(key).or_default();

        let mut written = 0;
        for (field, value) in pairs {
            hash.insert(field, StringEntry::new(value));
            written += 1;
        }

        written
    }

    pub async fn hget(&self, key: &[u8], field: &[u8]) -> Option<Bytes> {
        let hashes = self.hashes.read().await;

        hashes
            .get(key)
            .and_then(|hash| hash.get(field))
            .map(|entry| entry.value.clone())
    }

    /// Returns every field/value pair of the hash, sorted by field so the
    /// reply order is stable.
    pub async fn hgetall(&self, key: &[u8]) -> Vec<(Bytes, Bytes)> {
        let hashes = self.hashes.read().await;

        let mut pairs: Vec<(Bytes, Bytes)> = hashes
            .get(key)
            .map(|hash| {
                hash.iter()
                    .map(|(field, entry)| (field.clone(), entry.value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }

    /// Raw view of a string entry, expired or not. Used for inspection.
    pub async fn string_entry(&self, key: &[u8]) -> Option<StringEntry> {
        self.strings.read().await.get(key).cloned()
    }

    pub async fn string_snapshot(&self) -> HashMap<Bytes, Bytes> {
        self.strings
            .read()
            .await
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    pub async fn hash_snapshot(&self) -> HashMap<Bytes, HashMap<Bytes, Bytes>> {
        self.hashes
            .read()
            .await
            .iter()
            .map(|(key, hash)| {
                let fields = hash
                    .iter()
                    .map(|(field, entry)| (field.clone(), entry.value.clone()))
                    .collect();
                (key.clone(), fields)
            })
            .collect()
    }
}
