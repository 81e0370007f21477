//! Input checks for the fields surrounding the feed editor forms.
//!
//! Every failure is a [`CoreError::Validation`] carrying a message that can
//! be shown to the shop owner as-is.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum length of a feed file name (without extension).
pub const MAX_FILE_NAME_LENGTH: usize = 100;

/// Maximum length of a feed title.
pub const MAX_TITLE_LENGTH: usize = 200;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid regex"));

static FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

/// Validate a notification email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

/// Validate an absolute http(s) URL.
pub fn validate_url(url: &str) -> Result<(), CoreError> {
    if URL_RE.is_match(url.trim()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("'{url}' is not a valid URL")))
    }
}

/// Validate a feed file name: letters, digits, `-` and `_` only, no
/// extension, at most [`MAX_FILE_NAME_LENGTH`] characters.
pub fn validate_feed_file_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Feed file name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_FILE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Feed file name exceeds maximum length of {MAX_FILE_NAME_LENGTH} characters"
        )));
    }
    if !FILE_NAME_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "Feed file name '{name}' may only contain letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// Validate a feed title: non-empty after trimming and within
/// [`MAX_TITLE_LENGTH`].
pub fn validate_feed_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Feed title must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Feed title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}
