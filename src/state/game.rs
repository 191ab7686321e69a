use std::{
    collections::{HashMap, VecDeque},
    time::SystemTime,
};

use indexmap::IndexMap;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    state::state_machine::{Phase, RoundStateMachine},
};

/// Author label attached to system-generated chat entries.
pub const SYSTEM_AUTHOR: &str = "system";

/// A connected participant at the game table.
#[derive(Debug, Clone)]
pub struct Player {
    /// Opaque identifier handed out at registration.
    pub id: Uuid,
    /// Display name chosen by the player.
    pub name: String,
    /// Wallet balance in currency units; never negative.
    pub money: i64,
    /// Whether this player is the single table admin.
    pub is_admin: bool,
    /// Set when the player is excluded from bidding, and why.
    pub observer: Option<ObserverReason>,
    /// Last observed activity, used for inactivity eviction.
    pub last_seen: SystemTime,
}

impl Player {
    /// Whether the player is currently excluded from the auction.
    pub fn is_observer(&self) -> bool {
        self.observer.is_some()
    }
}

/// Why a player is sidelined as an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverReason {
    /// The table already had the maximum number of active players.
    Capacity,
    /// The wallet could not cover the entry fee when a round started.
    /// Re-evaluated at every round start.
    Funds,
}

/// A player's accumulated bid for the current round.
#[derive(Debug, Clone)]
pub struct Bid {
    /// Total amount bid this round; only ever grows.
    pub amount: i64,
    /// Whether the player has gone all-in.
    pub all_in: bool,
    /// Time of the most recent placement, used for the tie-break.
    pub placed_at: SystemTime,
}

/// Kind of bid a player can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BidKind {
    /// Raise by the fixed increment.
    Increment,
    /// Stake the entire remaining balance, ending the auction.
    AllIn,
}

/// Purchasable reveals available to the answering player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    /// Show the four candidate answers.
    RevealAll,
    /// Gray out two wrong candidates; requires `RevealAll` first.
    EliminateTwo,
}

/// Hint purchases recorded for the current round.
#[derive(Debug, Clone, Default)]
pub struct HintState {
    /// The reveal-all-options hint has been bought this round.
    pub reveal_purchased: bool,
    /// Indices into the question's options that were eliminated.
    pub eliminated: Vec<usize>,
}

/// Mutable per-round bookkeeping, separate from the phase machine.
#[derive(Debug, Clone)]
pub struct Round {
    /// Monotonically increasing round number, starting at 1; 0 means no
    /// round has been played in the current game.
    pub id: u64,
    /// Currency accumulated for the eventual winner. Carries over on an
    /// incorrect verdict.
    pub pot: i64,
    /// Deadline of the current timed phase, if any.
    pub deadline: Option<SystemTime>,
    /// Index into the loaded question set for the current round.
    pub question_index: usize,
    /// The resolved auction winner entitled to answer, if any.
    pub answering: Option<Uuid>,
    /// The submitted answer text, once locked in.
    pub answer: Option<String>,
    /// Hint purchases for this round.
    pub hints: HintState,
}

impl Round {
    pub(crate) fn new() -> Self {
        Self {
            id: 0,
            pot: 0,
            deadline: None,
            question_index: 0,
            answering: None,
            answer: None,
            hints: HintState::default(),
        }
    }
}

/// A loaded trivia question. Immutable once parsed by the question source.
#[derive(Debug, Clone)]
pub struct Question {
    /// The question text shown to players.
    pub text: String,
    /// Canonical correct answer used for the fuzzy verdict.
    pub correct_answer: String,
    /// Four candidate answers for the reveal-all-options hint.
    pub options: [String; 4],
}

/// A chat or system event entry.
#[derive(Debug, Clone)]
pub struct ChatEntry {
    /// Player display name, or [`SYSTEM_AUTHOR`] for engine events.
    pub author: String,
    /// Message body.
    pub text: String,
    /// Wall-clock time the entry was appended.
    pub sent_at: SystemTime,
}

/// Winner recorded when a game finishes.
#[derive(Debug, Clone)]
pub struct GameWinner {
    /// The winning player, if they were still connected at game end.
    pub id: Uuid,
    /// Display name captured at the time of victory.
    pub name: String,
    /// Final wallet balance including any awarded pot.
    pub money: i64,
}

/// The single aggregate owning all mutable game state.
///
/// Constructed once per process and accessed through one lock; every
/// public operation first lets the table catch up with elapsed time, so
/// invariants spanning multiple fields are never observed half-updated.
pub struct GameTable {
    pub(crate) config: AppConfig,
    pub(crate) machine: RoundStateMachine,
    pub(crate) players: IndexMap<Uuid, Player>,
    pub(crate) bids: HashMap<Uuid, Bid>,
    pub(crate) round: Round,
    pub(crate) questions: Vec<Question>,
    pub(crate) chat: VecDeque<ChatEntry>,
    pub(crate) winner: Option<GameWinner>,
    pub(crate) rng: StdRng,
}

impl GameTable {
    /// Build an empty table with entropy-seeded hint pricing.
    pub fn new(config: AppConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Build a table with a fixed seed, for reproducible hint costs.
    pub fn with_seed(config: AppConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: AppConfig, rng: StdRng) -> Self {
        Self {
            config,
            machine: RoundStateMachine::new(),
            players: IndexMap::new(),
            bids: HashMap::new(),
            round: Round::new(),
            questions: Vec::new(),
            chat: VecDeque::new(),
            winner: None,
            rng,
        }
    }

    /// Current phase of the round state machine.
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Runtime configuration the table was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The question currently on the table, if a set is loaded and not
    /// yet exhausted.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.round.question_index)
    }

    /// Seconds remaining in the current timed phase; zero when untimed.
    pub fn time_left(&self, now: SystemTime) -> f32 {
        match self.round.deadline {
            Some(deadline) => deadline
                .duration_since(now)
                .map(|left| left.as_secs_f32())
                .unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Winner of the game once the `finished` phase is reached.
    pub fn winner(&self) -> Option<&GameWinner> {
        self.winner.as_ref()
    }

    /// Bookkeeping of the round in progress (or just finished).
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// All connected players in join order.
    pub fn player_iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// A player's standing bid in the current auction.
    pub fn bid_for(&self, id: Uuid) -> Option<&Bid> {
        self.bids.get(&id)
    }

    /// Players with a wallet able to cover the entry fee. The game ends
    /// when fewer than two remain.
    pub(crate) fn funded_player_count(&self) -> usize {
        self.players
            .values()
            .filter(|p| p.money >= self.config.entry_fee)
            .count()
    }
}
