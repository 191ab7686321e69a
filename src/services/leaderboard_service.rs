use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    dao::leaderboard::ScoreRecord,
    dto::leaderboard::{LeaderboardEntryDto, LeaderboardResponse, SubmitScoreRequest},
    error::ServiceError,
    state::SharedState,
};

/// Record a finished game's score.
pub async fn submit(state: &SharedState, request: SubmitScoreRequest) -> Result<(), ServiceError> {
    let recorded_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0);
    let record = ScoreRecord {
        player: request.player.trim().to_owned(),
        score: request.score,
        game_secs: request.game_secs,
        recorded_at,
    };
    state.leaderboard().submit(record).await?;
    Ok(())
}

/// The visible top of the leaderboard, best first.
pub async fn top(state: &SharedState) -> Result<LeaderboardResponse, ServiceError> {
    let records = state.leaderboard().top().await?;
    Ok(LeaderboardResponse {
        entries: records.into_iter().map(LeaderboardEntryDto::from).collect(),
    })
}
