//! Async glue between the routes and the game table.
//!
//! Every entry point takes the table lock, lets it catch up with the
//! clock, and marks the acting player as alive before applying the
//! operation. The catch-up may itself evict the actor, in which case
//! the operation fails with not-found exactly as if they had never
//! been registered.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{
    dto::game::{
        AdvanceRequest, AdvanceResponse, AnswerRequest, BidRequest, FinishBiddingRequest,
        HeartbeatResponse, HintRequest, RegisterRequest, RegisterResponse, SelectSetRequest,
        SelectSetResponse, SetListResponse, StateResponse,
    },
    error::ServiceError,
    state::SharedState,
};

/// Join the table under a display name.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<RegisterResponse, ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    let id = table.register_player(request.name.trim(), now)?;
    Ok(RegisterResponse::from(table.player(id)?))
}

/// Record a liveness signal and confirm the player's current role.
pub async fn heartbeat(
    state: &SharedState,
    player_id: Uuid,
) -> Result<HeartbeatResponse, ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    table.touch_player(player_id, now)?;
    Ok(HeartbeatResponse::from(table.player(player_id)?))
}

/// Compose the canonical polled snapshot of the table.
pub async fn snapshot(state: &SharedState) -> Result<StateResponse, ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    Ok(StateResponse::from_table(&table, now))
}

/// List the question sets the configured source offers.
pub async fn list_question_sets(state: &SharedState) -> Result<SetListResponse, ServiceError> {
    let sets = state.question_source().list_sets().await?;
    Ok(SetListResponse { sets })
}

/// Load a named question set and start the game when enough players
/// are seated. Admin only.
pub async fn select_question_set(
    state: &SharedState,
    request: SelectSetRequest,
) -> Result<SelectSetResponse, ServiceError> {
    let now = SystemTime::now();
    // Check the actor before the fetch so a non-admin cannot trigger
    // backend traffic.
    {
        let mut table = state.table_mut().await;
        table.catch_up(now)?;
        table.touch_player(request.player_id, now)?;
        if !table.player(request.player_id)?.is_admin {
            return Err(ServiceError::Forbidden(
                "only the admin may pick a question set".into(),
            ));
        }
    }

    let questions = state
        .question_source()
        .fetch_set(request.set_name.clone())
        .await?;
    let count = questions.len();

    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    let started = table.select_question_set(request.player_id, questions, now)?;
    Ok(SelectSetResponse {
        started,
        questions: count,
    })
}

/// Place a bid in the open auction.
pub async fn place_bid(state: &SharedState, request: BidRequest) -> Result<(), ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    table.touch_player(request.player_id, now)?;
    table.place_bid(request.player_id, request.kind, now)
}

/// Close the auction (admin) or announce a pass (anyone else).
pub async fn finish_bidding(
    state: &SharedState,
    request: FinishBiddingRequest,
) -> Result<(), ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    table.touch_player(request.player_id, now)?;
    table.finish_bidding(request.player_id, now)
}

/// Lock in the answering player's answer.
pub async fn submit_answer(
    state: &SharedState,
    request: AnswerRequest,
) -> Result<(), ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    table.touch_player(request.player_id, now)?;
    table.submit_answer(request.player_id, request.text.trim(), now)
}

/// Buy a hint for the current question; returns the price paid and the
/// resulting pot.
pub async fn buy_hint(
    state: &SharedState,
    request: HintRequest,
) -> Result<(i64, i64), ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    table.touch_player(request.player_id, now)?;
    let cost = table.buy_hint(request.player_id, request.kind, now)?;
    Ok((cost, table.round().pot))
}

/// Move the game forward from between rounds or after a finished game.
/// Admin only.
pub async fn advance(
    state: &SharedState,
    request: AdvanceRequest,
) -> Result<AdvanceResponse, ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    table.touch_player(request.player_id, now)?;
    let started = table.advance_round(request.player_id, now)?;
    Ok(AdvanceResponse {
        started,
        phase: table.phase().into(),
    })
}
