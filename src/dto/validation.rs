//! Validation helpers for DTOs.

use validator::ValidationError;

const NAME_MAX: usize = 32;
const MESSAGE_MAX: usize = 500;
const ANSWER_MAX: usize = 200;

/// Validates a player display name: non-blank, at most 32 characters,
/// no control characters.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("display_name_blank");
        err.message = Some("Display name must not be blank".into());
        return Err(err);
    }
    if trimmed.chars().count() > NAME_MAX {
        let mut err = ValidationError::new("display_name_length");
        err.message = Some(format!("Display name must be at most {NAME_MAX} characters").into());
        return Err(err);
    }
    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("display_name_format");
        err.message = Some("Display name must not contain control characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a chat message body: non-blank and at most 500 characters.
pub fn validate_chat_message(message: &str) -> Result<(), ValidationError> {
    if message.trim().is_empty() {
        let mut err = ValidationError::new("message_blank");
        err.message = Some("Message must not be blank".into());
        return Err(err);
    }
    if message.chars().count() > MESSAGE_MAX {
        let mut err = ValidationError::new("message_length");
        err.message = Some(format!("Message must be at most {MESSAGE_MAX} characters").into());
        return Err(err);
    }
    Ok(())
}

/// Validates a submitted answer: non-blank and at most 200 characters.
pub fn validate_answer_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("answer_blank");
        err.message = Some("Answer must not be blank".into());
        return Err(err);
    }
    if text.chars().count() > ANSWER_MAX {
        let mut err = ValidationError::new("answer_length");
        err.message = Some(format!("Answer must be at most {ANSWER_MAX} characters").into());
        return Err(err);
    }
    Ok(())
}
