use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{secrets_match, AuthError};

/// Checks an `Authorization: Basic <base64(user:pass)>` header.
pub fn validate_basic(
    auth_header: Option<&str>,
    username: &str,
    password: &str,
) -> Result<(), AuthError> {
    let auth_header = auth_header.ok_or(AuthError::Missing)?;

    let encoded = match auth_header.trim().split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("Basic") => rest.trim(),
        _ => return Err(AuthError::Missing),
    };

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| AuthError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;
    let (given_user, given_pass) = decoded.split_once(':').ok_or(AuthError::Malformed)?;

    // both halves are always compared
    let user_ok = secrets_match(given_user, username);
    let pass_ok = secrets_match(given_pass, password);

    if user_ok & pass_ok {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}
