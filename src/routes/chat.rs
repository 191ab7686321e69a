use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        chat::{ChatHistoryResponse, ChatMessageRequest},
        game::AckResponse,
    },
    error::AppError,
    services::chat_service,
    state::SharedState,
};

/// Routes for the shared chat and event log.
pub fn router() -> Router<SharedState> {
    Router::new().route("/chat", post(post_message).get(history))
}

/// Post a chat message.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Message appended", body = AckResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn post_message(
    State(state): State<SharedState>,
    Json(payload): Json<ChatMessageRequest>,
) -> Result<Json<AckResponse>, AppError> {
    payload.validate()?;
    chat_service::post_message(&state, payload).await?;
    Ok(Json(AckResponse::ok()))
}

/// Recent chat and event entries, oldest first.
#[utoipa::path(
    get,
    path = "/chat",
    tag = "chat",
    responses((status = 200, description = "Recent log entries", body = ChatHistoryResponse))
)]
pub async fn history(State(state): State<SharedState>) -> Json<ChatHistoryResponse> {
    Json(chat_service::history(&state).await)
}
