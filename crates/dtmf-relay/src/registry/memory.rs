//! In-memory registry with TTL expiration.

use super::VerificationRecord;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Concurrent map of call session id to pending verification.
///
/// Every operation takes the lock for a single key, so a reader sees either
/// the previous record or the complete new one. Operations on different
/// keys are not ordered relative to each other.
#[derive(Clone)]
pub struct Registry {
    records: Arc<RwLock<HashMap<String, VerificationRecord>>>,
    ttl: Option<Duration>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry whose records never expire.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl: None,
        }
    }

    /// Create a registry that hides and purges records older than `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl: Some(ttl),
        }
    }

    fn is_live(&self, record: &VerificationRecord) -> bool {
        self.ttl.map_or(true, |ttl| !record.is_expired(ttl))
    }

    /// Insert or overwrite the record for a session.
    pub async fn put(&self, session_id: impl Into<String>, record: VerificationRecord) {
        let session_id = session_id.into();
        let mut records = self.records.write().await;
        if records.insert(session_id.clone(), record).is_some() {
            debug!(%session_id, "Replaced existing pending verification");
        }
    }

    /// Look up the record for a session without consuming it.
    pub async fn get(&self, session_id: &str) -> Option<VerificationRecord> {
        let records = self.records.read().await;
        records
            .get(session_id)
            .filter(|record| self.is_live(record))
            .cloned()
    }

    /// Remove and return the record for a session.
    ///
    /// An expired record is dropped and reported as absent.
    #[instrument(skip(self))]
    pub async fn take(&self, session_id: &str) -> Option<VerificationRecord> {
        let mut records = self.records.write().await;
        let record = records.remove(session_id)?;

        if self.is_live(&record) {
            Some(record)
        } else {
            debug!("Dropped expired verification on lookup");
            None
        }
    }

    /// Number of records held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop every expired record, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let mut records = self.records.write().await;
        let before_count = records.len();
        records.retain(|_, record| !record.is_expired(ttl));
        before_count - records.len()
    }

    /// Spawn a background task that purges expired records every `interval`.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let registry = self.clone();

        info!(
            "Registry sweeper started (ttl={:?}, interval={:?})",
            registry.ttl, interval
        );

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let removed = registry.purge_expired().await;
                if removed > 0 {
                    info!("Purged {} unmatched verifications", removed);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stale_record(code: &str) -> VerificationRecord {
        let mut record = VerificationRecord::new("+15551234567", code);
        record.created_at = Utc::now() - chrono::Duration::hours(1);
        record
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let registry = Registry::new();
        let record = VerificationRecord::new("+15551234567", "482917");

        registry.put("CA123", record.clone()).await;

        assert_eq!(registry.get("CA123").await, Some(record));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let registry = Registry::new();
        assert!(registry.get("CAxxx").await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_does_not_consume() {
        let registry = Registry::new();
        registry
            .put("CA123", VerificationRecord::new("+15551234567", "482917"))
            .await;

        assert!(registry.get("CA123").await.is_some());
        assert!(registry.get("CA123").await.is_some());
    }

    #[tokio::test]
    async fn test_take_consumes() {
        let registry = Registry::new();
        registry
            .put("CA123", VerificationRecord::new("+15551234567", "482917"))
            .await;

        let taken = registry.take("CA123").await.unwrap();
        assert_eq!(taken.verification_code, "482917");
        assert!(registry.take("CA123").await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let registry = Registry::new();
        registry
            .put("CA123", VerificationRecord::new("+15551234567", "111111"))
            .await;
        registry
            .put("CA123", VerificationRecord::new("+15559876543", "222222"))
            .await;

        let record = registry.get("CA123").await.unwrap();
        assert_eq!(record.phone_number, "+15559876543");
        assert_eq!(record.verification_code, "222222");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_records_are_hidden() {
        let registry = Registry::with_ttl(Duration::from_secs(600));
        registry.put("CAold", stale_record("111111")).await;

        assert!(registry.get("CAold").await.is_none());
        assert!(registry.take("CAold").await.is_none());
        // take drops the expired record
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_without_ttl_nothing_expires() {
        let registry = Registry::new();
        registry.put("CAold", stale_record("111111")).await;

        assert!(registry.get("CAold").await.is_some());
        assert_eq!(registry.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let registry = Registry::with_ttl(Duration::from_secs(600));
        registry.put("CAold", stale_record("111111")).await;
        registry
            .put("CAnew", VerificationRecord::new("+15551234567", "222222"))
            .await;

        assert_eq!(registry.purge_expired().await, 1);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get("CAnew").await.is_some());
    }

    #[tokio::test]
    async fn test_sweeper_purges_in_background() {
        let registry = Registry::with_ttl(Duration::from_secs(600));
        registry.put("CAold", stale_record("111111")).await;

        let sweeper = registry.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.abort();

        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_puts_on_distinct_keys() {
        let registry = Registry::new();

        let mut handles = Vec::new();
        for i in 0..64 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let record = VerificationRecord::new(
                    format!("+1555000{:04}", i),
                    format!("{:06}", i * 7),
                );
                registry.put(format!("CA{}", i), record).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len().await, 64);
        for i in 0..64 {
            let record = registry.get(&format!("CA{}", i)).await.unwrap();
            assert_eq!(record.phone_number, format!("+1555000{:04}", i));
            assert_eq!(record.verification_code, format!("{:06}", i * 7));
        }
    }
}
