use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::leaderboard::ScoreRecord,
    dto::validation::validate_display_name,
};

/// A score submitted for the leaderboard once a game ends.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitScoreRequest {
    /// Display name to credit.
    pub player: String,
    /// Final wallet balance.
    pub score: i64,
    /// Game duration in seconds.
    pub game_secs: u64,
}

impl Validate for SubmitScoreRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_display_name(&self.player) {
            errors.add("player", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// One leaderboard row.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntryDto {
    pub player: String,
    pub score: i64,
    pub game_secs: u64,
    /// Submission time as seconds since the Unix epoch.
    pub recorded_at: f64,
}

impl From<ScoreRecord> for LeaderboardEntryDto {
    fn from(record: ScoreRecord) -> Self {
        Self {
            player: record.player,
            score: record.score,
            game_secs: record.game_secs,
            recorded_at: record.recorded_at,
        }
    }
}

/// The visible slice of the leaderboard, best first.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntryDto>,
}
