use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::kv::KeyValueStore;

pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Typed cache keys for the memoized list accessors. Keeps the namespace
/// closed so two call sites can never collide on an ad hoc string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    Subjects,
    Categories(Uuid),
    Quizzes(Uuid),
}

impl CacheKey {
    fn storage_key(&self) -> String {
        match self {
            CacheKey::Subjects => "cache:subjects".to_owned(),
            CacheKey::Categories(subject_id) => format!("cache:categories:{}", subject_id),
            CacheKey::Quizzes(category_id) => format!("cache:quizzes:{}", category_id),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Entry<T> {
    cached_at: DateTime<Utc>,
    data: T,
}

/// Time-boxed cache over a persistent key-value store.
///
/// Entries older than the TTL are ignored, not evicted. Writes are
/// best-effort: a failed store write is logged and dropped, since a cache
/// miss always falls back to the gateway.
#[derive(Clone)]
pub struct ListCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ListCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn put<T: Serialize>(&self, key: CacheKey, data: &T) {
        self.put_at(key, data, Utc::now());
    }

    pub fn get<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    fn put_at<T: Serialize>(&self, key: CacheKey, data: &T, now: DateTime<Utc>) {
        let entry = Entry {
            cached_at: now,
            data,
        };
        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(e) = self.store.set(&key.storage_key(), &raw) {
                    tracing::warn!("Cache write for {:?} failed: {}", key, e);
                }
            }
            Err(e) => tracing::warn!("Cache entry for {:?} not serializable: {}", key, e),
        }
    }

    fn get_at<T: DeserializeOwned>(&self, key: CacheKey, now: DateTime<Utc>) -> Option<T> {
        let raw = self.store.get(&key.storage_key())?;
        let entry: Entry<T> = serde_json::from_str(&raw).ok()?;
        if now.signed_duration_since(entry.cached_at) < self.ttl {
            Some(entry.data)
        } else {
            None
        }
    }
}
