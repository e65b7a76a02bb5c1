//! Typed records on top of the key-value contract
//!
//! Each namespace owns a key prefix; payloads are JSON.

use crate::error::PersistenceError;
use crate::store::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

pub const SESSION_PREFIX: &str = "session:";
pub const CONVERSATION_PREFIX: &str = "conversation:";

/// Records of type `T` stored under one prefix
pub struct RecordStore<K, T> {
    kv: K,
    prefix: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<K: KeyValueStore, T: Serialize + DeserializeOwned> RecordStore<K, T> {
    pub fn new(kv: K, prefix: &'static str) -> Self {
        Self {
            kv,
            prefix,
            _record: PhantomData,
        }
    }

    pub fn key(&self, id: &str) -> String {
        format!("{}{id}", self.prefix)
    }

    pub async fn load(&self, id: &str) -> Result<Option<T>, PersistenceError> {
        let key = self.key(id);
        match self.kv.read(&key).await? {
            Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
            None => Ok(None),
        }
    }

    pub async fn save(&self, id: &str, record: &T) -> Result<(), PersistenceError> {
        let payload = serde_json::to_vec(record)?;
        self.kv.upsert(&self.key(id), &payload).await
    }
}
