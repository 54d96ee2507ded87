//! Input validation shared by the account and posting services

use crate::error::{MicroblogError, Result};
use crate::types::{MAX_ABOUT_ME_LENGTH, MAX_EMAIL_LENGTH, MAX_NICKNAME_LENGTH, MAX_POST_LENGTH};

/// Trim a post body and check it is non-empty and within the length limit
pub fn post_body(body: &str) -> Result<String> {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        return Err(MicroblogError::InvalidInput(
            "Post body cannot be empty".to_string(),
        ));
    }

    let length = trimmed.chars().count();
    if length > MAX_POST_LENGTH {
        return Err(MicroblogError::InvalidInput(format!(
            "Post is {} characters, the limit is {}",
            length, MAX_POST_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

/// Trim a nickname and check it is usable as a profile handle
pub fn nickname(nickname: &str) -> Result<String> {
    let trimmed = nickname.trim();

    if trimmed.is_empty() {
        return Err(MicroblogError::InvalidInput(
            "Nickname cannot be empty".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_NICKNAME_LENGTH {
        return Err(MicroblogError::InvalidInput(format!(
            "Nickname must be at most {} characters",
            MAX_NICKNAME_LENGTH
        )));
    }

    // Nicknames end up in profile URLs
    if trimmed.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(MicroblogError::InvalidInput(
            "Nickname cannot contain spaces or '/'".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Normalize an optional about-me text: blank becomes `None`
pub fn about_me(about_me: Option<&str>) -> Result<Option<String>> {
    let Some(text) = about_me.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_ABOUT_ME_LENGTH {
        return Err(MicroblogError::InvalidInput(format!(
            "About me must be at most {} characters",
            MAX_ABOUT_ME_LENGTH
        )));
    }

    Ok(Some(text.to_string()))
}

/// Check a login email; an empty one is an invalid login
pub fn email(email: &str) -> Result<String> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(MicroblogError::InvalidInput(
            "Invalid login. Please try again.".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_EMAIL_LENGTH {
        return Err(MicroblogError::InvalidInput(format!(
            "Email must be at most {} characters",
            MAX_EMAIL_LENGTH
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_body_is_trimmed() {
        assert_eq!(post_body("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn test_post_body_rejects_blank() {
        assert!(matches!(
            post_body(" \n\t "),
            Err(MicroblogError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_post_body_length_counts_characters() {
        assert!(post_body(&"a".repeat(MAX_POST_LENGTH)).is_ok());
        assert!(post_body(&"a".repeat(MAX_POST_LENGTH + 1)).is_err());
        // Multi-byte characters count once each
        assert!(post_body(&"é".repeat(MAX_POST_LENGTH)).is_ok());
    }

    #[test]
    fn test_nickname_rules() {
        assert_eq!(nickname(" susan ").unwrap(), "susan");
        assert!(nickname("").is_err());
        assert!(nickname("two words").is_err());
        assert!(nickname("a/b").is_err());
        assert!(nickname(&"n".repeat(MAX_NICKNAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_about_me_blank_is_none() {
        assert_eq!(about_me(None).unwrap(), None);
        assert_eq!(about_me(Some("   ")).unwrap(), None);
        assert_eq!(about_me(Some(" hi ")).unwrap(), Some("hi".to_string()));
        assert!(about_me(Some(&"x".repeat(MAX_ABOUT_ME_LENGTH + 1))).is_err());
    }

    #[test]
    fn test_empty_email_is_invalid_login() {
        let err = email("").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Invalid login. Please try again.");
    }
}
