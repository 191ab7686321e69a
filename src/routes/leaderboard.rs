use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        game::AckResponse,
        leaderboard::{LeaderboardResponse, SubmitScoreRequest},
    },
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Routes for score submission and the leaderboard.
pub fn router() -> Router<SharedState> {
    Router::new().route("/leaderboard", post(submit_score).get(leaderboard))
}

/// Record a finished game's score.
#[utoipa::path(
    post,
    path = "/leaderboard",
    tag = "leaderboard",
    request_body = SubmitScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = AckResponse),
        (status = 503, description = "Leaderboard backend unreachable")
    )
)]
pub async fn submit_score(
    State(state): State<SharedState>,
    Json(payload): Json<SubmitScoreRequest>,
) -> Result<Json<AckResponse>, AppError> {
    payload.validate()?;
    leaderboard_service::submit(&state, payload).await?;
    Ok(Json(AckResponse::ok()))
}

/// The visible top of the leaderboard, best first.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    responses(
        (status = 200, description = "Top scores", body = LeaderboardResponse),
        (status = 503, description = "Leaderboard backend unreachable")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let response = leaderboard_service::top(&state).await?;
    Ok(Json(response))
}
