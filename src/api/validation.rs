use chrono::NaiveDate;

use super::ApiError;
use crate::models::transaction::status;

const MAX_STATUS_LEN: usize = 50;

pub fn validate_user_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid user ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_page(page: Option<u64>) -> Result<u64, ApiError> {
    match page {
        None => Ok(1),
        Some(0) => Err(ApiError::validation(
            "Invalid page: 0. Pages start at 1",
        )),
        Some(page) => Ok(page),
    }
}

/// Parses an optional `YYYY-MM-DD` query value. Blank means unset.
pub fn parse_query_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            ApiError::validation(format!(
                "Invalid {}: '{}'. Expected YYYY-MM-DD",
                field, raw
            ))
        })
}

/// Any non-empty status is accepted; the well-known ones are not enforced.
pub fn validate_status(value: &str) -> Result<&str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Status cannot be empty"));
    }

    if trimmed.chars().count() > MAX_STATUS_LEN {
        return Err(ApiError::validation(format!(
            "Status must be {} characters or less",
            MAX_STATUS_LEN
        )));
    }

    Ok(trimmed)
}

#[must_use]
pub fn is_known_status(value: &str) -> bool {
    [
        status::POSTED,
        status::FLOATING,
        status::CANCELLED,
        status::PENDING,
    ]
    .contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_id() {
        assert!(validate_user_id(1).is_ok());
        assert!(validate_user_id(0).is_err());
        assert!(validate_user_id(-5).is_err());
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(None).unwrap(), 1);
        assert_eq!(validate_page(Some(3)).unwrap(), 3);
        assert!(validate_page(Some(0)).is_err());
    }

    #[test]
    fn test_parse_query_date() {
        assert_eq!(
            parse_query_date("start_date", Some("2025-10-01")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );
        assert_eq!(parse_query_date("start_date", Some("  ")).unwrap(), None);
        assert_eq!(parse_query_date("start_date", None).unwrap(), None);
        assert!(parse_query_date("end_date", Some("10/01/2025")).is_err());
    }

    #[test]
    fn test_validate_status() {
        assert_eq!(validate_status(" Posted ").unwrap(), "Posted");
        assert!(validate_status("").is_err());
        assert!(validate_status(&"x".repeat(51)).is_err());
        assert!(validate_status("Refunded").is_ok());
        assert!(is_known_status("Floating"));
        assert!(!is_known_status("Refunded"));
    }
}
