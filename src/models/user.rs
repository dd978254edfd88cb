use chrono::DateTime;
use serde::Serialize;

use crate::db::User;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A user shaped for listing and detail views. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDisplay {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserDisplay {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: format_timestamp(&user.created_at),
            updated_at: format_timestamp(&user.updated_at),
        }
    }
}

impl From<User> for UserDisplay {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// RFC 3339 in, `YYYY-MM-DD HH:MM:SS` (UTC) out. Anything else passes through.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |ts| ts.naive_utc().format(DISPLAY_FORMAT).to_string(),
    )
}
