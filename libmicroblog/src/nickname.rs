//! Collision-free nickname derivation

use crate::error::Result;
use crate::store::Store;
use crate::types::MAX_NICKNAME_LENGTH;

/// Candidate nicknames in the order they are tried: `desired`, `desired2`,
/// `desired3`, ...
pub fn candidates(desired: &str) -> impl Iterator<Item = String> + '_ {
    (1u64..).map(move |attempt| suffixed(desired, attempt))
}

/// Derive a nickname from the local part of an email address
///
/// Falls back to the whole address when it has no `@`.
pub fn from_email(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Make a federated nickname or email local part usable as a handle
///
/// Whitespace and `/` become `_`, so "John Smith" turns into "John_Smith".
pub fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect()
}

/// First candidate not already assigned to an account
///
/// The check is not atomic with the insert that follows it; a concurrent
/// winner surfaces later as a `Conflict` from the store's unique constraint.
pub async fn unique_nickname(store: &dyn Store, desired: &str) -> Result<String> {
    let mut attempt = 1u64;
    loop {
        let candidate = suffixed(desired, attempt);
        if !store.nickname_exists(&candidate).await? {
            return Ok(candidate);
        }
        tracing::debug!("Nickname {} is taken", candidate);
        attempt += 1;
    }
}

/// The base is cut short when needed so the result stays within
/// `MAX_NICKNAME_LENGTH` characters.
fn suffixed(desired: &str, attempt: u64) -> String {
    let suffix = if attempt == 1 {
        String::new()
    } else {
        attempt.to_string()
    };
    let room = MAX_NICKNAME_LENGTH.saturating_sub(suffix.len());
    let base: String = desired.chars().take(room).collect();
    format!("{}{}", base, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::types::NewAccount;
    use tempfile::TempDir;

    #[test]
    fn test_candidate_sequence() {
        let first: Vec<String> = candidates("Charlie").take(4).collect();
        assert_eq!(first, vec!["Charlie", "Charlie2", "Charlie3", "Charlie4"]);
    }

    #[test]
    fn test_suffix_fits_length_limit() {
        let long = "n".repeat(MAX_NICKNAME_LENGTH);
        let second = candidates(&long).nth(1).unwrap();
        assert_eq!(second.chars().count(), MAX_NICKNAME_LENGTH);
        assert!(second.ends_with("n2"));

        let tenth = candidates(&long).nth(9).unwrap();
        assert_eq!(tenth.chars().count(), MAX_NICKNAME_LENGTH);
        assert!(tenth.ends_with("n10"));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("John Smith"), "John_Smith");
        assert_eq!(sanitize("  a/b\tc "), "a_b_c");
        assert_eq!(sanitize("susan"), "susan");
    }

    #[test]
    fn test_from_email() {
        assert_eq!(from_email("susan@example.com"), "susan");
        assert_eq!(from_email("no-at-sign"), "no-at-sign");
    }

    #[tokio::test]
    async fn test_unique_nickname_skips_taken() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();

        assert_eq!(unique_nickname(&db, "Charlie").await.unwrap(), "Charlie");

        for (i, nickname) in ["Charlie", "Charlie2"].iter().enumerate() {
            db.create_account(NewAccount {
                nickname: nickname.to_string(),
                email: format!("c{}@example.com", i),
                created_at: 0,
            })
            .await
            .unwrap();
        }

        assert_eq!(unique_nickname(&db, "Charlie").await.unwrap(), "Charlie3");
        // Unrelated names are untouched
        assert_eq!(unique_nickname(&db, "Dana").await.unwrap(), "Dana");
    }
}
