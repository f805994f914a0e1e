//! Input validation for composer text and profile fields

/// Maximum message body length in characters
pub const MAX_MESSAGE_CHARS: usize = 4000;
/// Maximum display name length in characters
pub const MAX_DISPLAY_NAME_CHARS: usize = 32;

/// Validates a message body before it is sent or saved as an edit
pub fn validate_message(body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    let chars = body.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(format!(
            "Message too long ({} characters, max {})",
            chars, MAX_MESSAGE_CHARS
        ));
    }

    // Newlines and tabs are fine, other control characters are not
    if body.contains(|c: char| c.is_control() && c != '\n' && c != '\t') {
        return Err("Message contains control characters".to_string());
    }

    Ok(())
}

/// Normalize a body for sending: strip control characters except newline
/// and tab, normalize line endings and trim surrounding whitespace.
pub fn sanitize_message(body: &str) -> String {
    body.replace("\r\n", "\n")
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Validates the display name shown to other participants
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Display name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(format!(
            "Display name too long (max {} characters)",
            MAX_DISPLAY_NAME_CHARS
        ));
    }
    if name.contains(char::is_control) {
        return Err("Display name contains invalid characters".to_string());
    }
    Ok(())
}
