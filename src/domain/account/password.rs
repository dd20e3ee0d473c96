//! Password strength scoring.
//!
//! The service never sees plaintext passwords except when the web tier asks
//! for a strength score; only hashes are stored.

/// Maximum score returned by [`password_strength`].
pub const MAX_STRENGTH: u8 = 5;

/// Scores a password from 0 to 5.
///
/// One point each for: at least 8 characters, a lowercase letter, an
/// uppercase letter, a digit, and a symbol.
pub fn password_strength(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_lowercase()),
        password.chars().any(|c| c.is_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
    ];
    checks.iter().filter(|passed| **passed).count() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lowercase_word_scores_two() {
        assert_eq!(password_strength("password"), 2);
    }

    #[test]
    fn mixed_password_scores_five() {
        assert_eq!(password_strength("P@ssw0rd1"), 5);
    }

    #[test]
    fn empty_password_scores_zero() {
        assert_eq!(password_strength(""), 0);
    }

    #[test]
    fn short_password_misses_length_point() {
        assert_eq!(password_strength("Ab1!"), 4);
    }

    proptest! {
        #[test]
        fn score_never_exceeds_max(s in ".*") {
            prop_assert!(password_strength(&s) <= MAX_STRENGTH);
        }
    }
}
