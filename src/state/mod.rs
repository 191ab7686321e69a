pub mod answer;
mod bidding;
mod chat;
pub mod game;
mod hints;
mod players;
mod rounds;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    config::AppConfig,
    dao::{leaderboard::LeaderboardStore, question_source::QuestionSource},
};

pub use self::game::GameTable;
pub use self::state_machine::{IdleStatus, Phase};

pub type SharedState = Arc<AppState>;

/// Central application state: the single game table plus the pluggable
/// collaborators for question loading and leaderboard persistence.
///
/// All round, player and bid data lives behind one lock because its
/// invariants span multiple fields and must never be observed
/// half-updated.
pub struct AppState {
    table: RwLock<GameTable>,
    question_source: Arc<dyn QuestionSource>,
    leaderboard: Arc<dyn LeaderboardStore>,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so routes can clone it
    /// cheaply.
    pub fn new(
        config: AppConfig,
        question_source: Arc<dyn QuestionSource>,
        leaderboard: Arc<dyn LeaderboardStore>,
    ) -> SharedState {
        Arc::new(Self {
            table: RwLock::new(GameTable::new(config)),
            question_source,
            leaderboard,
        })
    }

    /// Shared read access to the table, for lookups that do not need to
    /// catch up with the clock first.
    pub async fn table(&self) -> RwLockReadGuard<'_, GameTable> {
        self.table.read().await
    }

    /// Exclusive access to the table. Every state-bearing operation,
    /// including snapshot reads, goes through here so the lazy
    /// catch-up can run first.
    pub async fn table_mut(&self) -> RwLockWriteGuard<'_, GameTable> {
        self.table.write().await
    }

    /// The configured question corpus loader.
    pub fn question_source(&self) -> Arc<dyn QuestionSource> {
        self.question_source.clone()
    }

    /// The configured leaderboard backend.
    pub fn leaderboard(&self) -> Arc<dyn LeaderboardStore> {
        self.leaderboard.clone()
    }
}
