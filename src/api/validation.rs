use super::ApiError;

const MAX_USERNAME_LENGTH: usize = 32;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_TITLE_LENGTH: usize = 200;
const MAX_SUMMARY_LENGTH: usize = 500;
const MAX_CONTENT_LENGTH: usize = 100_000;

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::validation(format!(
            "Username must be {} characters or less",
            MAX_USERNAME_LENGTH
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(username)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be {} characters or less",
            MAX_PASSWORD_LENGTH
        )));
    }

    Ok(password)
}

pub fn validate_title(title: &str) -> Result<&str, ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::validation(format!(
            "Title must be {} characters or less",
            MAX_TITLE_LENGTH
        )));
    }

    Ok(title)
}

pub fn validate_summary(summary: &str) -> Result<&str, ApiError> {
    if summary.trim().is_empty() {
        return Err(ApiError::validation("Summary is required"));
    }

    if summary.chars().count() > MAX_SUMMARY_LENGTH {
        return Err(ApiError::validation(format!(
            "Summary must be {} characters or less",
            MAX_SUMMARY_LENGTH
        )));
    }

    Ok(summary)
}

pub fn validate_content(content: &str) -> Result<&str, ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }

    if content.len() > MAX_CONTENT_LENGTH {
        return Err(ApiError::validation("Content is too large"));
    }

    Ok(content)
}

pub fn validate_cover_image(url: &str) -> Result<&str, ApiError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::validation(
            "Cover image must be an http(s) URL",
        ));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("alice_2-b").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("a".repeat(33).as_str()).is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("<alice>").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("p".repeat(129).as_str()).is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Hello world").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("t".repeat(201).as_str()).is_err());
    }

    #[test]
    fn test_validate_cover_image() {
        assert!(validate_cover_image("https://example.com/a.png").is_ok());
        assert!(validate_cover_image("http://example.com/a.png").is_ok());
        assert!(validate_cover_image("ftp://example.com/a.png").is_err());
        assert!(validate_cover_image("javascript:alert(1)").is_err());
    }
}
