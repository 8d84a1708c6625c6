use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::crypto::aes::{self, SecureKey};
use crate::error::{Result, SecurityError};

/// File name of the persisted store inside the storage directory.
pub const STORE_FILE: &str = "secure_store.json";

/// One encrypted entry in the persistent store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EncryptedRecord {
    /// `base64(nonce || ciphertext)` of the serialized value.
    pub ciphertext: String,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// When the entry stops being readable.
    pub expires_at: DateTime<Utc>,
}

/// An expiring, encrypted key-value store persisted to a single file.
///
/// Every value is serialized, encrypted with the fixed application key and
/// wrapped with timestamps. Expired or corrupted entries auto-heal: they
/// are deleted on read and reported as absent, never as an error.
#[derive(Clone)]
pub struct SecureStore {
    path: PathBuf,
    key: SecureKey,
    entries: Arc<Mutex<HashMap<String, EncryptedRecord>>>,
}

impl SecureStore {
    /// Opens (or creates) the store under `dir`.
    ///
    /// A missing or unreadable store file starts the store empty rather
    /// than failing: the persisted cache is never worth a crash.
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory holding the store file.
    /// * `key` - The fixed application encryption key.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SecureStore`.
    pub fn open(dir: impl Into<PathBuf>, key: SecureKey) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let path = dir.join(STORE_FILE);

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match sonic_rs::from_str::<HashMap<String, EncryptedRecord>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("⚠️  Store file corrupted, starting empty: {}", e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        tracing::debug!("🗄️  Secure store opened with {} entries", entries.len());

        Ok(Self {
            path,
            key,
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    /// Serializes, encrypts and stores `value` under `key` with a TTL.
    ///
    /// # Arguments
    ///
    /// * `key` - The entry name.
    /// * `value` - Any serializable value.
    /// * `ttl_minutes` - Minutes until the entry expires.
    pub fn set_item<T: Serialize>(&self, key: &str, value: &T, ttl_minutes: i64) -> Result<()> {
        let serialized = sonic_rs::to_string(value)
            .map_err(|e| SecurityError::Serialization(format!("Serialize failed: {}", e)))?;
        let ciphertext = aes::encrypt(&self.key, &serialized)?;

        let now = Utc::now();
        let record = EncryptedRecord {
            ciphertext,
            created_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
        };

        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), record);
        self.flush(&entries)
    }

    /// Reads and decrypts the value stored under `key`.
    ///
    /// Expired or corrupted entries are deleted and reported as `None`;
    /// corruption is never surfaced as an error to the caller.
    ///
    /// # Returns
    ///
    /// The deserialized value, or `None`.
    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();

        let record = entries.get(key)?.clone();

        if Utc::now() >= record.expires_at {
            tracing::debug!("⏰ Store entry expired: {}", key);
            entries.remove(key);
            self.flush_best_effort(&entries);
            return None;
        }

        let plaintext = match aes::decrypt(&self.key, &record.ciphertext) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("⚠️  Store entry undecryptable, deleting {}: {}", key, e);
                entries.remove(key);
                self.flush_best_effort(&entries);
                return None;
            }
        };

        match sonic_rs::from_str(&plaintext) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("⚠️  Store entry unparseable, deleting {}: {}", key, e);
                entries.remove(key);
                self.flush_best_effort(&entries);
                None
            }
        }
    }

    /// Unconditionally deletes the entry under `key`.
    pub fn remove_item(&self, key: &str) {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.flush_best_effort(&entries);
        }
    }

    /// Deletes every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.flush_best_effort(&entries);
    }

    /// Writes the current map to disk via a temp file + rename.
    fn flush(&self, entries: &HashMap<String, EncryptedRecord>) -> Result<()> {
        let raw = sonic_rs::to_string(entries)
            .map_err(|e| SecurityError::Serialization(format!("Store serialize failed: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn flush_best_effort(&self, entries: &HashMap<String, EncryptedRecord>) {
        if let Err(e) = self.flush(entries) {
            tracing::warn!("⚠️  Store flush failed: {}", e);
        }
    }
}
