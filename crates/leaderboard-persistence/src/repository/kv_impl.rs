//! Key-value backed leaderboard repository.
//!
//! The whole leaderboard lives under one key and is rewritten on every
//! submission. Writers in this process are serialized by `write_lock`, so
//! `load -> merge -> store` never interleaves locally.
//!
//! Writers in *different* processes are not coordinated: two instances can
//! both load, merge and store, and the later `SET` silently drops the other
//! update. Closing that gap needs a store-side atomic primitive (conditional
//! write or a sorted set with `ZADD GT`), which the plain get/set/del
//! contract does not offer.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::LeaderboardRepository;
use crate::codec::{self, CorruptState};
use crate::error::{PersistenceError, Result};
use crate::store::SharedStore;
use leaderboard_domain::{Leaderboard, ScoreEntry};

/// Store key holding the serialized leaderboard
pub const LEADERBOARD_KEY: &str = "leaderboard";

enum Snapshot {
    Absent,
    Valid(Leaderboard),
    Corrupt(CorruptState),
}

/// Leaderboard repository over a [`KeyValueStore`](crate::store::KeyValueStore).
pub struct KvLeaderboardRepository {
    store: SharedStore,
    key: String,
    write_lock: Mutex<()>,
}

impl KvLeaderboardRepository {
    /// Create a repository using the default key.
    pub fn new(store: SharedStore) -> Self {
        Self::with_key(store, LEADERBOARD_KEY)
    }

    /// Create a repository storing the leaderboard under `key`.
    pub fn with_key(store: SharedStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Key this repository writes to
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        let raw = match self.store.get(&self.key).await {
            Ok(raw) => raw,
            Err(PersistenceError::CorruptValue(reason)) => {
                return Ok(Snapshot::Corrupt(CorruptState::Unreadable(reason)));
            }
            Err(e) => return Err(e),
        };

        Ok(match raw {
            None => Snapshot::Absent,
            Some(raw) => match codec::decode(&raw) {
                Ok(board) => Snapshot::Valid(board),
                Err(reason) => Snapshot::Corrupt(reason),
            },
        })
    }

    /// Read the board, resetting a corrupt value. Caller holds `write_lock`.
    async fn load_locked(&self) -> Result<Leaderboard> {
        match self.snapshot().await? {
            Snapshot::Absent => Ok(Leaderboard::new()),
            Snapshot::Valid(board) => Ok(board),
            Snapshot::Corrupt(reason) => {
                tracing::warn!(
                    key = %self.key,
                    backend = self.store.backend_name(),
                    error = %reason,
                    "Stored leaderboard is corrupt, resetting"
                );
                self.store.del(&self.key).await?;
                Ok(Leaderboard::new())
            }
        }
    }

    async fn load_board(&self) -> Result<Leaderboard> {
        match self.snapshot().await? {
            Snapshot::Absent => Ok(Leaderboard::new()),
            Snapshot::Valid(board) => Ok(board),
            // Re-read under the lock so a valid write that landed in between
            // is not deleted.
            Snapshot::Corrupt(_) => {
                let _guard = self.write_lock.lock().await;
                self.load_locked().await
            }
        }
    }
}

#[async_trait]
impl LeaderboardRepository for KvLeaderboardRepository {
    async fn load(&self) -> Result<Vec<ScoreEntry>> {
        Ok(self.load_board().await?.into_entries())
    }

    async fn upsert_best_score(&self, entry: ScoreEntry) -> Result<Option<u64>> {
        entry.validate()?;

        let _guard = self.write_lock.lock().await;

        let mut board = self.load_locked().await?;
        let user_id = entry.user_id.clone();
        let submitted = entry.score;
        let previous = board.upsert_best(entry);

        let encoded = codec::encode(&board)?;
        self.store.set(&self.key, &encoded).await?;

        tracing::debug!(
            user_id = %user_id,
            submitted,
            previous = ?previous,
            entries = board.len(),
            "Leaderboard updated"
        );

        Ok(previous)
    }

    async fn top_n(&self, n: usize) -> Result<Vec<ScoreEntry>> {
        Ok(self.load_board().await?.top(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(user_id: &str, username: &str, score: u64) -> ScoreEntry {
        ScoreEntry::new(user_id, username, score).unwrap()
    }

    fn repo() -> (Arc<MemoryStore>, KvLeaderboardRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = KvLeaderboardRepository::new(store.clone());
        (store, repo)
    }

    /// Store whose calls all fail, counting writes
    #[derive(Default)]
    struct DownStore {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for DownStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(PersistenceError::Connection("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(PersistenceError::Connection("connection refused".into()))
        }

        async fn del(&self, _key: &str) -> Result<bool> {
            Err(PersistenceError::Connection("connection refused".into()))
        }

        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    #[tokio::test]
    async fn test_absent_key_loads_empty() {
        let (store, repo) = repo();

        assert!(repo.load().await.unwrap().is_empty());
        assert!(repo.top_n(10).await.unwrap().is_empty());
        assert_eq!(store.get(LEADERBOARD_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_submission_scenario() {
        let (store, repo) = repo();

        assert_eq!(repo.upsert_best_score(entry("u1", "alice", 10)).await.unwrap(), None);
        assert_eq!(repo.load().await.unwrap(), vec![entry("u1", "alice", 10)]);

        assert_eq!(
            repo.upsert_best_score(entry("u1", "alice", 5)).await.unwrap(),
            Some(10)
        );
        assert_eq!(repo.load().await.unwrap(), vec![entry("u1", "alice", 10)]);

        repo.upsert_best_score(entry("u2", "bob", 20)).await.unwrap();
        assert_eq!(repo.load().await.unwrap().len(), 2);

        assert_eq!(repo.top_n(1).await.unwrap(), vec![entry("u2", "bob", 20)]);

        let raw = store.get(LEADERBOARD_KEY).await.unwrap().unwrap();
        assert!(raw.starts_with('['), "canonical encoding is a JSON array: {raw}");
    }

    #[tokio::test]
    async fn test_lower_score_rewrites_unchanged_board() {
        let (store, repo) = repo();
        repo.upsert_best_score(entry("u1", "alice", 10)).await.unwrap();
        let before = store.get(LEADERBOARD_KEY).await.unwrap();

        repo.upsert_best_score(entry("u1", "alice", 3)).await.unwrap();
        assert_eq!(store.get(LEADERBOARD_KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_value_resets_on_read() {
        for corrupt in ["{not json", r#"{"userId":"u1"}"#, "17", r#"[{"score":"x"}]"#] {
            let (store, repo) = repo();
            store.set(LEADERBOARD_KEY, corrupt).await.unwrap();

            assert!(repo.load().await.unwrap().is_empty(), "value: {corrupt}");
            assert_eq!(store.get(LEADERBOARD_KEY).await.unwrap(), None);
        }
    }

    /// Store that hands out garbage on the first read and a valid board
    /// afterwards, as if a writer landed in between
    #[derive(Default)]
    struct RacingStore {
        reads: AtomicUsize,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for RacingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(Some("garbage".into()))
            } else {
                Ok(Some(r#"[{"userId":"u1","username":"alice","score":10}]"#.into()))
            }
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        async fn del(&self, _key: &str) -> Result<bool> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        fn backend_name(&self) -> &'static str {
            "racing"
        }
    }

    #[tokio::test]
    async fn test_corruption_rechecked_under_lock() {
        let store = Arc::new(RacingStore::default());
        let repo = KvLeaderboardRepository::new(store.clone());

        assert_eq!(repo.load().await.unwrap(), vec![entry("u1", "alice", 10)]);
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_value_resets() {
        /// Store whose key holds a value `get` cannot return as text
        #[derive(Default)]
        struct WrongTypeStore {
            deleted: AtomicUsize,
        }

        #[async_trait]
        impl KeyValueStore for WrongTypeStore {
            async fn get(&self, _key: &str) -> Result<Option<String>> {
                if self.deleted.load(Ordering::SeqCst) > 0 {
                    Ok(None)
                } else {
                    Err(PersistenceError::CorruptValue("WRONGTYPE".into()))
                }
            }

            async fn set(&self, _key: &str, _value: &str) -> Result<()> {
                Ok(())
            }

            async fn del(&self, _key: &str) -> Result<bool> {
                self.deleted.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }

            fn backend_name(&self) -> &'static str {
                "wrong-type"
            }
        }

        let store = Arc::new(WrongTypeStore::default());
        let repo = KvLeaderboardRepository::new(store.clone());

        assert!(repo.load().await.unwrap().is_empty());
        assert_eq!(store.deleted.load(Ordering::SeqCst), 1);
        assert_eq!(repo.upsert_best_score(entry("u1", "alice", 3)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_value_resets_on_write() {
        let (store, repo) = repo();
        store.set(LEADERBOARD_KEY, "garbage").await.unwrap();

        assert_eq!(repo.upsert_best_score(entry("u1", "alice", 4)).await.unwrap(), None);
        assert_eq!(repo.load().await.unwrap(), vec![entry("u1", "alice", 4)]);
    }

    #[tokio::test]
    async fn test_legacy_value_is_rewritten_canonically() {
        let (store, repo) = repo();
        let legacy = serde_json::to_string(r#"[{"userId":"u1","username":"alice","score":10}]"#)
            .unwrap();
        store.set(LEADERBOARD_KEY, &legacy).await.unwrap();

        assert_eq!(repo.top_n(5).await.unwrap(), vec![entry("u1", "alice", 10)]);

        repo.upsert_best_score(entry("u2", "bob", 1)).await.unwrap();
        let raw = store.get(LEADERBOARD_KEY).await.unwrap().unwrap();
        assert_eq!(
            raw,
            concat!(
                r#"[{"userId":"u1","username":"alice","score":10},"#,
                r#"{"userId":"u2","username":"bob","score":1}]"#
            )
        );
    }

    #[tokio::test]
    async fn test_custom_key() {
        let store = Arc::new(MemoryStore::new());
        let repo = KvLeaderboardRepository::with_key(store.clone(), "scores:test");
        repo.upsert_best_score(entry("u1", "alice", 1)).await.unwrap();

        assert_eq!(repo.key(), "scores:test");
        assert!(store.get("scores:test").await.unwrap().is_some());
        assert!(store.get(LEADERBOARD_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_entry_rejected_before_store() {
        let (store, repo) = repo();
        let blank = ScoreEntry {
            user_id: String::new(),
            username: "alice".into(),
            score: 1,
        };

        let err = repo.upsert_best_score(blank).await.unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidEntry(_)));
        assert!(!err.is_unavailable());
        assert_eq!(store.get(LEADERBOARD_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(DownStore::default());
        let repo = KvLeaderboardRepository::new(store.clone());

        assert!(repo.load().await.unwrap_err().is_unavailable());
        assert!(repo.top_n(3).await.is_err());
        assert!(repo.upsert_best_score(entry("u1", "alice", 1)).await.is_err());
        // Read failed first, so nothing was written
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        let repo = Arc::new(KvLeaderboardRepository::new(store));

        let mut handles = Vec::new();
        for i in 0..50u64 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.upsert_best_score(entry(&format!("u{i}"), &format!("user{i}"), i))
                    .await
                    .unwrap();
                repo.upsert_best_score(entry("shared", "shared", i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = repo.load().await.unwrap();
        assert_eq!(entries.len(), 51);
        let shared = entries.iter().find(|e| e.user_id == "shared").unwrap();
        assert_eq!(shared.score, 49);
        assert_eq!(repo.top_n(1).await.unwrap()[0].score, 49);
    }
}
