use super::IdentityError;

/// Pulls the raw token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Result<&str, IdentityError> {
    let header = auth_header.ok_or(IdentityError::MissingToken)?;
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(IdentityError::InvalidScheme)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(IdentityError::InvalidScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(IdentityError::MissingToken);
    }
    Ok(token)
}
