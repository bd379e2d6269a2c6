/// Account store: credentials plus one progress snapshot per user.

pub mod credential;
pub mod storage;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AccountError, StoreError};

use credential::CredentialHash;
use storage::KeyValueStorage;

/// Prefix for per-account records in the key/value backend.
pub const ACCOUNT_KEY_PREFIX: &str = "idle_clicker.account.";

/// Opaque token issued on successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionToken(pub String);

impl SessionToken {
    fn issue() -> Self {
        let bytes: [u8; 16] = rand::random();
        Self(hex::encode(bytes))
    }
}

/// The persistence contract the gateway is written against.
pub trait AccountStore {
    /// Register `username` with a fresh, empty snapshot.
    fn create_account(&mut self, username: &str, password: &str) -> Result<(), AccountError>;

    fn verify_credential(&self, username: &str, password: &str) -> Result<SessionToken, AccountError>;

    /// The stored snapshot as raw JSON.
    fn load_snapshot(&self, username: &str) -> Result<Value, AccountError>;

    /// Replace the stored snapshot.
    fn store_snapshot(&mut self, username: &str, snapshot: Value) -> Result<(), AccountError>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRecord {
    username: String,
    credential: CredentialHash,
    created_at: DateTime<Utc>,
    #[serde(default)]
    game_data: Value,
}

/// [`AccountStore`] over any [`KeyValueStorage`], one key per account.
pub struct KvAccountStore<K> {
    storage: K,
    hash_iterations: u32,
}

impl<K: KeyValueStorage> KvAccountStore<K> {
    pub fn new(storage: K, hash_iterations: u32) -> Self {
        Self {
            storage,
            hash_iterations,
        }
    }

    fn key(username: &str) -> String {
        format!("{ACCOUNT_KEY_PREFIX}{username}")
    }

    fn read(&self, username: &str) -> Result<Option<AccountRecord>, StoreError> {
        match self.storage.get(&Self::key(username))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn require(&self, username: &str) -> Result<AccountRecord, AccountError> {
        self.read(username)?.ok_or_else(|| AccountError::NotFound {
            username: username.to_string(),
        })
    }

    fn write(&mut self, record: &AccountRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        self.storage.set(&Self::key(&record.username), &raw)
    }
}

/// Snapshot stored for a brand-new account. Generators are filled in from
/// the catalog when it is loaded.
fn fresh_snapshot(now: DateTime<Utc>) -> Value {
    json!({
        "version": crate::game::save::SAVE_VERSION,
        "balance": 0,
        "manualActions": 0,
        "lifetimeEarned": 0,
        "productionRate": 0,
        "owned": {},
        "lastSavedTimestamp": now,
    })
}

impl<K: KeyValueStorage> AccountStore for KvAccountStore<K> {
    fn create_account(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::InvalidCredential);
        }
        if self.read(username)?.is_some() {
            return Err(AccountError::UsernameTaken {
                username: username.to_string(),
            });
        }
        let now = Utc::now();
        let record = AccountRecord {
            username: username.to_string(),
            credential: CredentialHash::derive(password, self.hash_iterations),
            created_at: now,
            game_data: fresh_snapshot(now),
        };
        self.write(&record)?;
        log::info!("account created: {username}");
        Ok(())
    }

    fn verify_credential(&self, username: &str, password: &str) -> Result<SessionToken, AccountError> {
        let record = self.require(username)?;
        if !record.credential.verify(password) {
            log::info!("rejected login for {username}");
            return Err(AccountError::InvalidCredential);
        }
        Ok(SessionToken::issue())
    }

    fn load_snapshot(&self, username: &str) -> Result<Value, AccountError> {
        Ok(self.require(username)?.game_data)
    }

    fn store_snapshot(&mut self, username: &str, snapshot: Value) -> Result<(), AccountError> {
        let mut record = self.require(username)?;
        record.game_data = snapshot;
        self.write(&record)?;
        Ok(())
    }
}
