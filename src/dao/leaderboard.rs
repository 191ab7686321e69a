//! Leaderboard persistence for finished games.
//!
//! Scores outlive the in-memory game table. The store keeps the best
//! hundred entries sorted by score and serves the top fifty; the
//! in-memory backend is the default and a remote HTTP backend can be
//! wired in via the `remote-leaderboard` feature.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::dao::storage::{StorageError, StorageResult};

/// Most entries a store keeps.
pub const LEADERBOARD_CAPACITY: usize = 100;
/// Entries returned to readers.
pub const LEADERBOARD_PAGE: usize = 50;

/// One submitted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Display name of the scoring player.
    pub player: String,
    /// Final wallet balance, the game's score.
    pub score: i64,
    /// How long the game took, in seconds.
    pub game_secs: u64,
    /// Submission time as seconds since the Unix epoch.
    pub recorded_at: f64,
}

/// Abstraction over where submitted scores are kept.
pub trait LeaderboardStore: Send + Sync {
    /// Record a score, keeping the store sorted and bounded.
    fn submit(&self, record: ScoreRecord) -> BoxFuture<'static, StorageResult<()>>;
    /// The current top entries, best first.
    fn top(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreRecord>>>;
    /// Probe whether the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Process-local leaderboard, lost on restart.
#[derive(Clone, Default)]
pub struct MemoryLeaderboard {
    records: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl MemoryLeaderboard {
    /// An empty in-memory leaderboard.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaderboardStore for MemoryLeaderboard {
    fn submit(&self, record: ScoreRecord) -> BoxFuture<'static, StorageResult<()>> {
        let records = self.records.clone();
        Box::pin(async move {
            let mut guard = records.lock().await;
            guard.push(record);
            // Stable sort keeps the earlier submission ahead on ties.
            guard.sort_by(|a, b| b.score.cmp(&a.score));
            guard.truncate(LEADERBOARD_CAPACITY);
            Ok(())
        })
    }

    fn top(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreRecord>>> {
        let records = self.records.clone();
        Box::pin(async move {
            let guard = records.lock().await;
            Ok(guard.iter().take(LEADERBOARD_PAGE).cloned().collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Leaderboard kept by a remote score service.
///
/// `POST {base}/submit` stores a record; `GET {base}/leaderboard`
/// returns the sorted entries.
#[cfg(feature = "remote-leaderboard")]
#[derive(Clone)]
pub struct RemoteLeaderboard {
    client: reqwest::Client,
    base_url: Arc<str>,
}

#[cfg(feature = "remote-leaderboard")]
impl RemoteLeaderboard {
    /// Build a client for the given base URL.
    pub fn new(base_url: &str) -> StorageResult<Self> {
        let client = reqwest::Client::builder().build().map_err(|source| {
            StorageError::unavailable("cannot build http client".into(), source)
        })?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }
}

#[cfg(feature = "remote-leaderboard")]
impl LeaderboardStore for RemoteLeaderboard {
    fn submit(&self, record: ScoreRecord) -> BoxFuture<'static, StorageResult<()>> {
        let client = self.client.clone();
        let url = format!("{}/submit", self.base_url);
        Box::pin(async move {
            client
                .post(&url)
                .json(&record)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|source| {
                    StorageError::unavailable(format!("cannot submit score to {url}"), source)
                })?;
            Ok(())
        })
    }

    fn top(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreRecord>>> {
        let client = self.client.clone();
        let url = format!("{}/leaderboard", self.base_url);
        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|source| {
                    StorageError::unavailable(format!("cannot read leaderboard at {url}"), source)
                })?;
            let mut records = response.json::<Vec<ScoreRecord>>().await.map_err(|source| {
                StorageError::unavailable("cannot decode leaderboard".into(), source)
            })?;
            records.truncate(LEADERBOARD_PAGE);
            Ok(records)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let client = self.client.clone();
        let url = format!("{}/leaderboard", self.base_url);
        Box::pin(async move {
            client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|source| {
                    StorageError::unavailable(format!("leaderboard at {url} unreachable"), source)
                })?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{LEADERBOARD_CAPACITY, LEADERBOARD_PAGE, LeaderboardStore, MemoryLeaderboard, ScoreRecord};

    fn record(player: &str, score: i64) -> ScoreRecord {
        ScoreRecord {
            player: player.to_owned(),
            score,
            game_secs: 120,
            recorded_at: 1_700_000_000.0,
        }
    }

    #[tokio::test]
    async fn scores_come_back_best_first() {
        let store = MemoryLeaderboard::new();
        store.submit(record("ala", 9_000)).await.unwrap();
        store.submit(record("ola", 12_000)).await.unwrap();
        store.submit(record("ela", 10_500)).await.unwrap();

        let top = store.top().await.unwrap();
        let names: Vec<&str> = top.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["ola", "ela", "ala"]);
    }

    #[tokio::test]
    async fn store_is_bounded_and_page_is_capped() {
        let store = MemoryLeaderboard::new();
        for i in 0..(LEADERBOARD_CAPACITY + 20) {
            store.submit(record(&format!("p{i}"), i as i64)).await.unwrap();
        }
        let top = store.top().await.unwrap();
        assert_eq!(top.len(), LEADERBOARD_PAGE);
        // The weakest twenty submissions fell off the end.
        assert_eq!(top[0].score, (LEADERBOARD_CAPACITY + 19) as i64);
    }

    #[tokio::test]
    async fn ties_keep_submission_order() {
        let store = MemoryLeaderboard::new();
        store.submit(record("first", 5_000)).await.unwrap();
        store.submit(record("second", 5_000)).await.unwrap();
        let top = store.top().await.unwrap();
        assert_eq!(top[0].player, "first");
        assert_eq!(top[1].player, "second");
    }
}
