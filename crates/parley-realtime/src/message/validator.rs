//! Inbound validation rules.

use parley_core::AppError;

/// Maximum custom status length in characters.
pub const MAX_CUSTOM_STATUS_CHARS: usize = 128;

/// Maximum emoji identifier length in characters.
pub const MAX_EMOJI_CHARS: usize = 64;

/// Validates a raw inbound frame before parsing.
pub fn validate_frame(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }
    Ok(())
}

/// Validates message content: non-empty after trimming and within the length limit.
pub fn validate_message_content(content: &str, max_chars: usize) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::validation("Message content cannot be empty"));
    }
    if content.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "Message content exceeds {max_chars} characters"
        )));
    }
    Ok(())
}

/// Validates a custom status string.
pub fn validate_custom_status(status: &str) -> Result<(), AppError> {
    if status.chars().count() > MAX_CUSTOM_STATUS_CHARS {
        return Err(AppError::validation(format!(
            "Custom status exceeds {MAX_CUSTOM_STATUS_CHARS} characters"
        )));
    }
    Ok(())
}

/// Validates an emoji identifier.
pub fn validate_emoji(emoji: &str) -> Result<(), AppError> {
    if emoji.trim().is_empty() || emoji.chars().count() > MAX_EMOJI_CHARS {
        return Err(AppError::validation("Invalid emoji"));
    }
    Ok(())
}
