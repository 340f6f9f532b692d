use thiserror::Error;

pub mod basic;
pub mod token;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Not authenticated")]
    Missing,
    #[error("Malformed credentials")]
    Malformed,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Equality that takes the same time wherever the first difference is.
pub(crate) fn secrets_match(given: &str, expected: &str) -> bool {
    ring::constant_time::verify_slices_are_equal(given.as_bytes(), expected.as_bytes()).is_ok()
}
