//! Seams to the stores living outside the game: the local key-value store
//! of the host (browser `localStorage`) and the remote leaderboard.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::error::{LeaderboardError, StorageError};
use crate::leaderboard::LeaderboardEntry;

pub const HIGH_SCORE_KEY: &str = "byte_hunter.high_score";
pub const LEADERBOARD_KEY: &str = "byte_hunter.leaderboard";

/// Plain get/set string store
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore(HashMap<String, String>);

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Browser `localStorage`.
/// The handle is looked up on every call, js values can't be kept in a resource.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::WriteFailed(key.to_owned()))
    }
}

/// Everything the game persists locally
pub trait ScoreStore: Send + Sync + 'static {
    /// Personal best, 0 when nothing was stored yet
    fn personal_best(&self) -> u32;
    fn set_personal_best(&mut self, score: u32) -> Result<(), StorageError>;
    /// Last known top list, empty when nothing was stored yet
    fn cached_leaderboard(&self) -> Vec<LeaderboardEntry>;
    fn cache_leaderboard(&mut self, entries: &[LeaderboardEntry]) -> Result<(), StorageError>;
}

/// [`ScoreStore`] on top of any [`KeyValueStore`].
/// Missing or unreadable values are treated as defaults.
#[derive(Debug, Default, Clone)]
pub struct KvScoreStore<S> {
    store: S,
}

impl<S: KeyValueStore> KvScoreStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed reading {key}: {e}");
                None
            }
        }
    }
}

impl<S: KeyValueStore> ScoreStore for KvScoreStore<S> {
    fn personal_best(&self) -> u32 {
        let Some(raw) = self.read(HIGH_SCORE_KEY) else {
            return 0;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring stored high score {raw:?}");
            0
        })
    }

    fn set_personal_best(&mut self, score: u32) -> Result<(), StorageError> {
        self.store.set(HIGH_SCORE_KEY, &score.to_string())
    }

    fn cached_leaderboard(&self) -> Vec<LeaderboardEntry> {
        let Some(raw) = self.read(LEADERBOARD_KEY) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Ignoring stored leaderboard: {e}");
            Vec::new()
        })
    }

    fn cache_leaderboard(&mut self, entries: &[LeaderboardEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(LEADERBOARD_KEY, &json)
    }
}

/// Remote top list, insert entries and query the best ones
pub trait LeaderboardBackend: Send + Sync + 'static {
    /// The backend stamps the submission time itself
    fn insert(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError>;
    /// Best `limit` entries by score, descending
    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

/// Backend keeping everything in memory, ties go to the earlier submission
#[derive(Debug, Default, Clone)]
pub struct InMemoryLeaderboard {
    entries: Vec<(u64, LeaderboardEntry)>,
    next_stamp: u64,
}

impl InMemoryLeaderboard {
    pub fn with_entries(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Self {
        let mut board = Self::default();
        for entry in entries {
            // never fails for the in memory board
            let _ = board.insert(entry);
        }
        board
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LeaderboardBackend for InMemoryLeaderboard {
    fn insert(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        self.entries.push((self.next_stamp, entry));
        self.next_stamp += 1;
        Ok(())
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|(sa, a), (sb, b)| b.score.cmp(&a.score).then(sa.cmp(sb)));
        Ok(sorted
            .into_iter()
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect())
    }
}

/// Local store used by the game
#[derive(Resource)]
pub struct Scores(pub Box<dyn ScoreStore>);

impl Scores {
    pub fn new(store: impl ScoreStore) -> Self {
        Self(Box::new(store))
    }
}

/// Browser local storage on wasm32
#[cfg(target_arch = "wasm32")]
impl Default for Scores {
    fn default() -> Self {
        Self::new(KvScoreStore::new(LocalStorage))
    }
}

/// Nothing survives the process on native targets
#[cfg(not(target_arch = "wasm32"))]
impl Default for Scores {
    fn default() -> Self {
        Self::new(KvScoreStore::new(MemoryStore::default()))
    }
}

/// Remote leaderboard used by the game
#[derive(Resource)]
pub struct RemoteBoard(pub Box<dyn LeaderboardBackend>);

impl RemoteBoard {
    pub fn new(backend: impl LeaderboardBackend) -> Self {
        Self(Box::new(backend))
    }
}

impl Default for RemoteBoard {
    fn default() -> Self {
        Self::new(InMemoryLeaderboard::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.into(),
            score,
        }
    }

    #[test]
    fn default_scores_start_empty() {
        let mut scores = Scores::default();
        assert_eq!(scores.0.personal_best(), 0);
        scores.0.set_personal_best(40).unwrap();
        assert_eq!(scores.0.personal_best(), 40);
        assert!(scores.0.cached_leaderboard().is_empty());
    }

    #[test]
    fn empty_store_reads_defaults() {
        let store = KvScoreStore::new(MemoryStore::default());
        assert_eq!(store.personal_best(), 0);
        assert!(store.cached_leaderboard().is_empty());
    }

    #[test]
    fn values_are_stored_as_strings() {
        let mut store = KvScoreStore::new(MemoryStore::default());
        store.set_personal_best(420).unwrap();
        store
            .cache_leaderboard(&[entry("neo", 300), entry("trin", 120)])
            .unwrap();
        assert_eq!(
            store.inner().get(HIGH_SCORE_KEY).unwrap().as_deref(),
            Some("420")
        );
        assert_eq!(store.personal_best(), 420);
        assert_eq!(
            store.cached_leaderboard(),
            vec![entry("neo", 300), entry("trin", 120)]
        );
    }

    #[test]
    fn garbage_reads_as_default() {
        let mut kv = MemoryStore::default();
        kv.set(HIGH_SCORE_KEY, "lots").unwrap();
        kv.set(LEADERBOARD_KEY, "[{\"name\":1}]").unwrap();
        let store = KvScoreStore::new(kv);
        assert_eq!(store.personal_best(), 0);
        assert!(store.cached_leaderboard().is_empty());
    }

    #[test]
    fn in_memory_board_sorts_descending_with_stable_ties() {
        let board = InMemoryLeaderboard::with_entries([
            entry("a", 50),
            entry("b", 90),
            entry("c", 50),
            entry("d", 10),
        ]);
        assert_eq!(
            board.top(3).unwrap(),
            vec![entry("b", 90), entry("a", 50), entry("c", 50)]
        );
        assert_eq!(board.len(), 4);
    }
}
