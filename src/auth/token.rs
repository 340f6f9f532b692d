use super::{secrets_match, AuthError};

fn extract_token(auth_header: &str) -> Option<&str> {
    let mut parts = auth_header.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("Bearer") => Some(token),
        _ => None,
    }
}

/// Checks an `Authorization: Bearer <token>` header against the shared secret.
/// There is no issuing, expiry or rotation: the secret is static configuration.
pub fn validate_token(auth_header: Option<&str>, api_token: &str) -> Result<(), AuthError> {
    let auth_header = auth_header.ok_or(AuthError::Missing)?;
    let token = extract_token(auth_header).ok_or(AuthError::Missing)?;

    if secrets_match(token, api_token) {
        Ok(())
    } else {
        Err(AuthError::InvalidToken)
    }
}
