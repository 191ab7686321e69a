//! Application-level configuration loading, covering the game-economy tunables.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "AWANTURA_BACK_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Wallet balance every player starts (and optionally restarts) with.
    pub starting_stake: i64,
    /// Fee collected from every eligible player when a round begins; it
    /// doubles as the player's opening bid.
    pub entry_fee: i64,
    /// Amount debited per `increment` bid.
    pub bid_increment: i64,
    /// Length of the auction window.
    pub bidding_duration: Duration,
    /// Length of the answer window after a resolved auction.
    pub answer_duration: Duration,
    /// Shortened answer window used when nobody bid at all.
    pub no_bid_answer_duration: Duration,
    /// Grace window between answer submission and the verdict.
    pub discussion_duration: Duration,
    /// Players silent for longer than this are evicted on the next request.
    pub inactivity_timeout: Duration,
    /// Registrations past this many active players join as observers.
    pub max_active_players: usize,
    /// Maximum retained chat/event entries; older ones are dropped.
    pub chat_capacity: usize,
    /// Similarity ratio (0.0..=1.0) at or above which an answer is correct.
    pub verdict_threshold: f64,
    /// Cost range for the reveal-all-options hint.
    pub reveal_cost: (i64, i64),
    /// Cost range for the eliminate-two-wrong-options hint.
    pub eliminate_cost: (i64, i64),
    /// Whether hints may still be bought during the discussion window.
    pub hints_in_discussion: bool,
    /// Whether wallets return to [`Self::starting_stake`] between games.
    pub reset_wallets_between_games: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded game configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            starting_stake: 10_000,
            entry_fee: 500,
            bid_increment: 100,
            bidding_duration: Duration::from_secs(20),
            answer_duration: Duration::from_secs(60),
            no_bid_answer_duration: Duration::from_secs(5),
            discussion_duration: Duration::from_secs(20),
            inactivity_timeout: Duration::from_secs(60),
            max_active_players: 8,
            chat_capacity: 200,
            verdict_threshold: 0.75,
            reveal_cost: (1_000, 2_000),
            eliminate_cost: (300, 800),
            hints_in_discussion: false,
            reset_wallets_between_games: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    starting_stake: i64,
    entry_fee: i64,
    bid_increment: i64,
    bidding_seconds: u64,
    answer_seconds: u64,
    no_bid_answer_seconds: u64,
    discussion_seconds: u64,
    inactivity_timeout_seconds: u64,
    max_active_players: usize,
    chat_capacity: usize,
    verdict_threshold: f64,
    reveal_cost_min: i64,
    reveal_cost_max: i64,
    eliminate_cost_min: i64,
    eliminate_cost_max: i64,
    hints_in_discussion: bool,
    reset_wallets_between_games: bool,
}

impl Default for RawConfig {
    fn default() -> Self {
        let defaults = AppConfig::default();
        Self {
            starting_stake: defaults.starting_stake,
            entry_fee: defaults.entry_fee,
            bid_increment: defaults.bid_increment,
            bidding_seconds: defaults.bidding_duration.as_secs(),
            answer_seconds: defaults.answer_duration.as_secs(),
            no_bid_answer_seconds: defaults.no_bid_answer_duration.as_secs(),
            discussion_seconds: defaults.discussion_duration.as_secs(),
            inactivity_timeout_seconds: defaults.inactivity_timeout.as_secs(),
            max_active_players: defaults.max_active_players,
            chat_capacity: defaults.chat_capacity,
            verdict_threshold: defaults.verdict_threshold,
            reveal_cost_min: defaults.reveal_cost.0,
            reveal_cost_max: defaults.reveal_cost.1,
            eliminate_cost_min: defaults.eliminate_cost.0,
            eliminate_cost_max: defaults.eliminate_cost.1,
            hints_in_discussion: defaults.hints_in_discussion,
            reset_wallets_between_games: defaults.reset_wallets_between_games,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            starting_stake: raw.starting_stake,
            entry_fee: raw.entry_fee,
            bid_increment: raw.bid_increment,
            bidding_duration: Duration::from_secs(raw.bidding_seconds),
            answer_duration: Duration::from_secs(raw.answer_seconds),
            no_bid_answer_duration: Duration::from_secs(raw.no_bid_answer_seconds),
            discussion_duration: Duration::from_secs(raw.discussion_seconds),
            inactivity_timeout: Duration::from_secs(raw.inactivity_timeout_seconds),
            max_active_players: raw.max_active_players,
            chat_capacity: raw.chat_capacity,
            verdict_threshold: raw.verdict_threshold.clamp(0.0, 1.0),
            reveal_cost: (raw.reveal_cost_min, raw.reveal_cost_max),
            eliminate_cost: (raw.eliminate_cost_min, raw.eliminate_cost_max),
            hints_in_discussion: raw.hints_in_discussion,
            reset_wallets_between_games: raw.reset_wallets_between_games,
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
