//! Gravatar avatar URLs

use md5::{Digest, Md5};

/// Build the Gravatar URL for an email address
///
/// The hash is taken over the trimmed, lowercased address so that
/// `John@Example.com` and `john@example.com` share an avatar.
pub fn avatar(email: &str, size: u32) -> String {
    let normalized = email.trim().to_lowercase();
    let hash = Md5::digest(normalized.as_bytes());
    format!(
        "http://www.gravatar.com/avatar/{:x}?d=mm&s={}",
        hash, size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hash() {
        let url = avatar("john@example.com", 128);
        assert_eq!(
            url,
            "http://www.gravatar.com/avatar/d4c74594d841139328695756648b6bd6?d=mm&s=128"
        );
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(
            avatar("  John@Example.com ", 128),
            avatar("john@example.com", 128)
        );
    }

    #[test]
    fn test_deterministic() {
        let first = avatar("John@Example.com", 128);
        let second = avatar("John@Example.com", 128);
        assert_eq!(first, second);
    }

    #[test]
    fn test_size_parameter() {
        assert!(avatar("susan@example.com", 48).ends_with("?d=mm&s=48"));
    }
}
