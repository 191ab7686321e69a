use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::game::{
        AckResponse, AdvanceRequest, AdvanceResponse, AnswerRequest, BidRequest,
        FinishBiddingRequest, HeartbeatResponse, HintRequest, HintResponse, RegisterRequest,
        RegisterResponse, SelectSetRequest, SelectSetResponse, SetListResponse, StateResponse,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Routes handling the game table: registration, auction, answers.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", post(register))
        .route("/players/{id}/heartbeat", post(heartbeat))
        .route("/state", get(state_snapshot))
        .route("/game/question-sets", get(list_question_sets))
        .route("/game/question-set", post(select_question_set))
        .route("/game/bid", post(place_bid))
        .route("/game/bidding/finish", post(finish_bidding))
        .route("/game/answer", post(submit_answer))
        .route("/game/hint", post(buy_hint))
        .route("/game/advance", post(advance))
}

/// Join the table under a display name.
#[utoipa::path(
    post,
    path = "/players",
    tag = "game",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Player registered", body = RegisterResponse),
        (status = 400, description = "Invalid or duplicate display name")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    payload.validate()?;
    let response = game_service::register(&state, payload).await?;
    Ok(Json(response))
}

/// Signal that a player is still at the table.
#[utoipa::path(
    post,
    path = "/players/{id}/heartbeat",
    tag = "game",
    params(("id" = Uuid, Path, description = "Player to keep alive")),
    responses(
        (status = 200, description = "Liveness recorded", body = HeartbeatResponse),
        (status = 404, description = "Unknown or already evicted player")
    )
)]
pub async fn heartbeat(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HeartbeatResponse>, AppError> {
    Ok(Json(game_service::heartbeat(&state, id).await?))
}

/// The canonical polled snapshot of the whole table.
#[utoipa::path(
    get,
    path = "/state",
    tag = "game",
    responses((status = 200, description = "Current table state", body = StateResponse))
)]
pub async fn state_snapshot(
    State(state): State<SharedState>,
) -> Result<Json<StateResponse>, AppError> {
    let snapshot = game_service::snapshot(&state).await?;
    Ok(Json(snapshot))
}

/// Names of the question sets available for selection.
#[utoipa::path(
    get,
    path = "/game/question-sets",
    tag = "game",
    responses(
        (status = 200, description = "Available question sets", body = SetListResponse),
        (status = 503, description = "Question source unreachable")
    )
)]
pub async fn list_question_sets(
    State(state): State<SharedState>,
) -> Result<Json<SetListResponse>, AppError> {
    let sets = game_service::list_question_sets(&state).await?;
    Ok(Json(sets))
}

/// Load a named question set and start the game when possible.
#[utoipa::path(
    post,
    path = "/game/question-set",
    tag = "game",
    request_body = SelectSetRequest,
    responses(
        (status = 200, description = "Set loaded", body = SelectSetResponse),
        (status = 403, description = "Actor is not the admin"),
        (status = 404, description = "No such question set"),
        (status = 409, description = "A round is already running")
    )
)]
pub async fn select_question_set(
    State(state): State<SharedState>,
    Json(payload): Json<SelectSetRequest>,
) -> Result<Json<SelectSetResponse>, AppError> {
    payload.validate()?;
    let response = game_service::select_question_set(&state, payload).await?;
    Ok(Json(response))
}

/// Place a bid in the open auction.
#[utoipa::path(
    post,
    path = "/game/bid",
    tag = "game",
    request_body = BidRequest,
    responses(
        (status = 200, description = "Bid accepted", body = AckResponse),
        (status = 402, description = "Wallet cannot cover the bid"),
        (status = 409, description = "No auction is open")
    )
)]
pub async fn place_bid(
    State(state): State<SharedState>,
    Json(payload): Json<BidRequest>,
) -> Result<Json<AckResponse>, AppError> {
    game_service::place_bid(&state, payload).await?;
    Ok(Json(AckResponse::ok()))
}

/// Close the auction as admin, or pass as a regular player.
#[utoipa::path(
    post,
    path = "/game/bidding/finish",
    tag = "game",
    request_body = FinishBiddingRequest,
    responses(
        (status = 200, description = "Auction closed or pass recorded", body = AckResponse),
        (status = 409, description = "No auction is open")
    )
)]
pub async fn finish_bidding(
    State(state): State<SharedState>,
    Json(payload): Json<FinishBiddingRequest>,
) -> Result<Json<AckResponse>, AppError> {
    game_service::finish_bidding(&state, payload).await?;
    Ok(Json(AckResponse::ok()))
}

/// Submit the auction winner's answer.
#[utoipa::path(
    post,
    path = "/game/answer",
    tag = "game",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer locked in", body = AckResponse),
        (status = 403, description = "Actor is not the answering player"),
        (status = 409, description = "No answer is being awaited")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AckResponse>, AppError> {
    payload.validate()?;
    game_service::submit_answer(&state, payload).await?;
    Ok(Json(AckResponse::ok()))
}

/// Buy a hint for the current question.
#[utoipa::path(
    post,
    path = "/game/hint",
    tag = "game",
    request_body = HintRequest,
    responses(
        (status = 200, description = "Hint purchased", body = HintResponse),
        (status = 402, description = "Wallet cannot cover the hint"),
        (status = 403, description = "Actor is not the answering player"),
        (status = 409, description = "Hint not purchasable right now")
    )
)]
pub async fn buy_hint(
    State(state): State<SharedState>,
    Json(payload): Json<HintRequest>,
) -> Result<Json<HintResponse>, AppError> {
    let (cost, pot) = game_service::buy_hint(&state, payload).await?;
    Ok(Json(HintResponse { cost, pot }))
}

/// Start the next round, or reset the table after a finished game.
#[utoipa::path(
    post,
    path = "/game/advance",
    tag = "game",
    request_body = AdvanceRequest,
    responses(
        (status = 200, description = "Game advanced", body = AdvanceResponse),
        (status = 403, description = "Actor is not the admin"),
        (status = 409, description = "Nothing to advance right now")
    )
)]
pub async fn advance(
    State(state): State<SharedState>,
    Json(payload): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let response = game_service::advance(&state, payload).await?;
    Ok(Json(response))
}
