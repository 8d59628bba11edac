use crate::server::response::ApiError;

const MAX_NAME_LEN: usize = 200;

fn validate_name(name: &str, entity: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{entity} name cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot contain control characters"
        )));
    }
    Ok(())
}

pub fn validate_project_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Project")
}

pub fn validate_file_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "File")
}

pub fn validate_repo_url(repo_url: &str) -> Result<(), ApiError> {
    if repo_url.trim().is_empty() {
        return Err(ApiError::bad_request("repo_url cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert!(validate_project_name("Parser rewrite").is_ok());
        assert!(validate_project_name("   ").is_err());
        assert!(validate_file_name(&"x".repeat(201)).is_err());
        assert!(validate_file_name("notes\n").is_err());
        assert!(validate_file_name("résumé.md").is_ok());
    }
}
