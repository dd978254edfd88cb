use serde::{Deserialize, Serialize};

use crate::models::UserDisplay;
use crate::services::FieldErrors;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            errors: None,
        }
    }

    #[must_use]
    pub fn with_field_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Result of a user mutation: a flash-style message plus the affected user.
#[derive(Debug, Serialize)]
pub struct UserMessage {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDisplay>,
}

impl UserMessage {
    pub const CREATED: &'static str = "User created!";
    pub const UPDATED: &'static str = "User updated!";
    pub const DELETED: &'static str = "User deleted!";
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    pub search: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub transactions_backend: &'static str,
    pub transactions_error: Option<String>,
    pub uptime_seconds: u64,
    pub version: &'static str,
}
