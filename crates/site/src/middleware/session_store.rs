//! In-memory session store that drops records once they expire.
//!
//! Each record is held in a `moka` cache whose per-entry lifetime is the
//! record's own expiry date, so abandoned sessions (a visitor who sent one
//! contact message and left) are evicted instead of piling up.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tower_sessions::SessionStore;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;

/// Upper bound on live sessions; the least recently used go first beyond it.
const MAX_SESSIONS: u64 = 100_000;

/// Lifetime of a cache entry: whatever is left until the record expires.
struct RecordExpiry;

impl RecordExpiry {
    fn remaining(record: &Record) -> Duration {
        Duration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or_default()
    }
}

impl Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(&self, _id: &Id, record: &Record, _created_at: Instant) -> Option<Duration> {
        Some(Self::remaining(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::remaining(record))
    }
}

/// Session store backed by a bounded, expiring `moka` cache.
#[derive(Clone)]
pub struct ExpiringMemoryStore {
    cache: Cache<Id, Record>,
}

impl ExpiringMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .expire_after(RecordExpiry)
            .build();

        Self { cache }
    }
}

impl Default for ExpiringMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExpiringMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringMemoryStore")
            .field("sessions", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for ExpiringMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        // Ids are random; regenerate on the rare collision
        loop {
            let value = record.clone();
            let entry = self
                .cache
                .entry(record.id)
                .or_insert_with(async move { value })
                .await;
            if entry.is_fresh() {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .cache
            .get(id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(id).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::cookie::time::Duration as CookieDuration;

    use super::*;

    fn record(expires_in: CookieDuration) -> Record {
        let mut data = HashMap::new();
        data.insert("flash".to_string(), serde_json::json!("Message sent!"));
        Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_saved_record_loads() {
        let store = ExpiringMemoryStore::new();
        let mut rec = record(CookieDuration::hours(1));
        store.create(&mut rec).await.unwrap();

        let loaded = store.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, rec.data);
    }

    #[tokio::test]
    async fn test_expired_record_is_evicted() {
        let store = ExpiringMemoryStore::new();
        let mut rec = record(CookieDuration::seconds(-5));
        store.create(&mut rec).await.unwrap();

        assert!(store.load(&rec.id).await.unwrap().is_none());
        store.cache.run_pending_tasks().await;
        assert_eq!(store.cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_save_extends_lifetime() {
        let store = ExpiringMemoryStore::new();
        let mut rec = record(CookieDuration::seconds(-5));
        store.create(&mut rec).await.unwrap();

        rec.expiry_date = OffsetDateTime::now_utc() + CookieDuration::hours(1);
        store.save(&rec).await.unwrap();

        assert!(store.load(&rec.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = ExpiringMemoryStore::new();
        let mut rec = record(CookieDuration::hours(1));
        store.create(&mut rec).await.unwrap();

        store.delete(&rec.id).await.unwrap();

        assert!(store.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_replaces_colliding_id() {
        let store = ExpiringMemoryStore::new();
        let mut first = record(CookieDuration::hours(1));
        store.create(&mut first).await.unwrap();

        let mut second = record(CookieDuration::hours(1));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(store.load(&first.id).await.unwrap().is_some());
        assert!(store.load(&second.id).await.unwrap().is_some());
    }
}
