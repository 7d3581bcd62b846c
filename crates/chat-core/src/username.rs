//! Username rules.

use crate::error::DirectoryError;

/// Longest accepted username, in bytes.
///
/// The binary protocol carries names with a one-byte length prefix, so
/// this must stay well below 256.
pub const MAX_USERNAME_LEN: usize = 32;

/// Check that `name` can be registered.
///
/// A valid name is non-empty, at most [`MAX_USERNAME_LEN`] bytes, and
/// contains no whitespace or control characters. Clients address users
/// by whitespace-separated tokens, so a name with a space in it could
/// never be the target of a directed message.
pub fn validate_username(name: &str) -> Result<(), DirectoryError> {
    if name.is_empty() || name.len() > MAX_USERNAME_LEN {
        return Err(DirectoryError::InvalidUser(name.to_string()));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DirectoryError::InvalidUser(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("zoë").is_ok());
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert_eq!(
            validate_username(""),
            Err(DirectoryError::InvalidUser(String::new()))
        );
        assert!(validate_username("   ").is_err());
    }

    #[test]
    fn rejects_embedded_whitespace_and_controls() {
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("tab\tname").is_err());
        assert!(validate_username("bell\u{7}").is_err());
    }

    #[test]
    fn enforces_length_limit() {
        let longest = "a".repeat(MAX_USERNAME_LEN);
        assert!(validate_username(&longest).is_ok());

        let too_long = "a".repeat(MAX_USERNAME_LEN + 1);
        assert!(validate_username(&too_long).is_err());
    }
}
