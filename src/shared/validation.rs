use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating phone numbers
    /// Must be three digit groups separated by hyphens
    /// - Valid: "123-456-7890", "301-555-0100"
    /// - Invalid: "1234567890", "123-45-6789", "(123) 456-7890"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\d{3}-\d{3}-\d{4}$").unwrap();

    /// Regex for validating user ids
    /// Must start with a letter or underscore and contain only word characters
    /// - Valid: "jdoe", "j_doe42", "_system"
    /// - Invalid: "42jdoe", "j doe", "j-doe"
    pub static ref USERID_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex_valid() {
        assert!(PHONE_REGEX.is_match("123-456-7890"));
        assert!(PHONE_REGEX.is_match("301-555-0100"));
        assert!(PHONE_REGEX.is_match("000-000-0000"));
    }

    #[test]
    fn test_phone_regex_invalid() {
        assert!(!PHONE_REGEX.is_match("1234567890")); // no hyphens
        assert!(!PHONE_REGEX.is_match("123-45-6789")); // wrong grouping
        assert!(!PHONE_REGEX.is_match("(123) 456-7890")); // punctuation
        assert!(!PHONE_REGEX.is_match("123-456-78901")); // trailing digit
        assert!(!PHONE_REGEX.is_match("abc-def-ghij")); // letters
        assert!(!PHONE_REGEX.is_match(""));
    }

    #[test]
    fn test_userid_regex() {
        assert!(USERID_REGEX.is_match("jdoe"));
        assert!(USERID_REGEX.is_match("j_doe42"));
        assert!(USERID_REGEX.is_match("_system"));
        assert!(!USERID_REGEX.is_match("42jdoe"));
        assert!(!USERID_REGEX.is_match("j doe"));
        assert!(!USERID_REGEX.is_match("j-doe"));
        assert!(!USERID_REGEX.is_match(""));
    }
}
