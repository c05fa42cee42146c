use std::sync::LazyLock;

use regex::Regex;

pub const USERNAME_MAX_LEN: usize = 15;
pub const COMMENT_MAX_LEN: usize = 2200;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]{1,15}$").expect("username pattern is a valid regex")
});

/// 1 to 15 ASCII letters or digits.
pub fn is_valid_username(username: &str) -> bool {
    username.len() <= USERNAME_MAX_LEN && USERNAME_RE.is_match(username)
}

/// Comments must carry visible text and stay under the length cap.
pub fn is_valid_comment(content: &str) -> bool {
    !content.trim().is_empty() && content.chars().count() <= COMMENT_MAX_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_usernames() {
        assert!(is_valid_username("Lorenzo1"));
        assert!(is_valid_username("a"));
        assert!(is_valid_username("ABCDEFGHIJKLMNO"));
        assert!(is_valid_username("123"));
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("a b"));
        assert!(!is_valid_username("ABCDEFGHIJKLMNOP")); // 16 chars
        assert!(!is_valid_username("alice!"));
        assert!(!is_valid_username("bob\n"));
        assert!(!is_valid_username("élise"));
    }

    #[test]
    fn comment_bounds() {
        assert!(is_valid_comment("nice shot"));
        assert!(!is_valid_comment(""));
        assert!(!is_valid_comment("   \n"));
        assert!(is_valid_comment(&"x".repeat(COMMENT_MAX_LEN)));
        assert!(!is_valid_comment(&"x".repeat(COMMENT_MAX_LEN + 1)));
    }
}
