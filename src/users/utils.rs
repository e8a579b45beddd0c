use regex::Regex;

use crate::types::ValidationError;

lazy_static! {
    // A username has to fit in a single path segment to be reachable as `/users/:username`.
    static ref USERNAME_RE: Regex = Regex::new(r"^[^/]+$").unwrap();
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        Err(ValidationError::from("username", "can't be blank"))
    } else if !USERNAME_RE.is_match(username) {
        Err(ValidationError::from(
            "username",
            format!("Invalid username: {}", username),
        ))
    } else {
        Ok(())
    }
}
