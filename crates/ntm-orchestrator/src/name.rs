//! Session name validation (spec.md §4.1 "Name validation").

use std::sync::LazyLock;

use regex::Regex;

const MAX_LEN: usize = 64;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap());

/// A strict ASCII charset (`[A-Za-z0-9._-]`), length-bounded, non-empty,
/// and not starting with `.` (which would collide with dotfile-style
/// tooling on the project directory).
pub fn is_valid_session_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_LEN {
        return false;
    }
    if name.starts_with('.') {
        return false;
    }
    NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_session_name("lt-1"));
        assert!(is_valid_session_name("my_session.v2"));
        assert!(is_valid_session_name("A1"));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(!is_valid_session_name(""));
    }

    #[test]
    fn test_name_starting_with_dot_rejected() {
        assert!(!is_valid_session_name(".hidden"));
    }

    #[test]
    fn test_name_with_slash_rejected() {
        assert!(!is_valid_session_name("team/mail"));
    }

    #[test]
    fn test_name_with_space_rejected() {
        assert!(!is_valid_session_name("my session"));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let name = "a".repeat(65);
        assert!(!is_valid_session_name(&name));
    }

    #[test]
    fn test_max_length_name_accepted() {
        let name = "a".repeat(64);
        assert!(is_valid_session_name(&name));
    }
}
