use std::time::SystemTime;

use crate::{
    dto::chat::{ChatHistoryResponse, ChatMessageDto, ChatMessageRequest},
    error::ServiceError,
    state::SharedState,
};

/// Entries returned by the history endpoint.
const HISTORY_LEN: usize = 50;

/// Append a player's message to the shared log.
pub async fn post_message(
    state: &SharedState,
    request: ChatMessageRequest,
) -> Result<(), ServiceError> {
    let now = SystemTime::now();
    let mut table = state.table_mut().await;
    table.catch_up(now)?;
    table.touch_player(request.player_id, now)?;
    table.push_message(request.player_id, request.message.trim().to_owned(), now)
}

/// The most recent chat and event entries, oldest first.
///
/// Reads do not advance timers; the next mutating request will.
pub async fn history(state: &SharedState) -> ChatHistoryResponse {
    let table = state.table().await;
    ChatHistoryResponse {
        messages: table
            .recent_chat(HISTORY_LEN)
            .map(ChatMessageDto::from)
            .collect(),
    }
}
