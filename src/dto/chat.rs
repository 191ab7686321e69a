use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_system_time, validation::validate_chat_message},
    state::game::ChatEntry,
};

/// A chat message posted by a player.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatMessageRequest {
    pub player_id: Uuid,
    pub message: String,
}

impl Validate for ChatMessageRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_chat_message(&self.message) {
            errors.add("message", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// One entry of the shared chat and event log.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatMessageDto {
    /// Player display name, or "system" for engine events.
    pub author: String,
    pub message: String,
    /// RFC 3339 timestamp of the entry.
    pub timestamp: String,
}

impl From<&ChatEntry> for ChatMessageDto {
    fn from(entry: &ChatEntry) -> Self {
        Self {
            author: entry.author.clone(),
            message: entry.text.clone(),
            timestamp: format_system_time(entry.sent_at),
        }
    }
}

/// Recent chat entries, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessageDto>,
}
