//! Domain service for user management.
//!
//! Listing with search and pagination, creation with password hashing and a
//! "user created" notification, update, and hard delete.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::{Page, UserDisplay};

pub const USERS_PER_PAGE: u64 = 10;
pub const NAME_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), UserError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(UserError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for messages in self.0.values() {
            for message in messages {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors specific to user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("User {0} not found")]
    NotFound(i32),

    #[error("The email {0} has already been taken")]
    EmailTaken(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
}

/// Domain service trait for users.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Lists users ordered by name, ten per page. A non-blank `search`
    /// restricts to users whose name or email contains it.
    async fn list_users(
        &self,
        search: Option<&str>,
        page: u64,
    ) -> Result<Page<UserDisplay>, UserError>;

    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if no user has this id.
    async fn get_user(&self, id: i32) -> Result<UserDisplay, UserError>;

    /// Validates, hashes the password, stores the user and dispatches the
    /// "user created" notification without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] for field problems and
    /// [`UserError::EmailTaken`] if the email is already registered.
    async fn create_user(&self, input: NewUser) -> Result<UserDisplay, UserError>;

    /// Updates name and email. The uniqueness check ignores the user's own row.
    async fn update_user(&self, id: i32, input: UserUpdate) -> Result<UserDisplay, UserError>;

    /// Hard delete.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the user does not exist (including
    /// a repeated delete).
    async fn delete_user(&self, id: i32) -> Result<(), UserError>;
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("Invalid regex pattern defined in code")
    })
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Name and email rules shared by create and update.
pub fn validate_profile_fields(name: &str, email: &str, errors: &mut FieldErrors) {
    if name.trim().is_empty() {
        errors.add("name", "The name field is required.");
    } else if name.trim().chars().count() > NAME_MAX_CHARS {
        errors.add(
            "name",
            format!("The name field must not be greater than {NAME_MAX_CHARS} characters."),
        );
    }

    if email.trim().is_empty() {
        errors.add("email", "The email field is required.");
    } else if !is_valid_email(email.trim()) {
        errors.add("email", "The email field must be a valid email address.");
    }
}

pub fn validate_password(password: &str, confirmation: &str, errors: &mut FieldErrors) {
    if password.is_empty() {
        errors.add("password", "The password field is required.");
        return;
    }

    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!("The password field must be at least {PASSWORD_MIN_CHARS} characters."),
        );
    }

    if password != confirmation {
        errors.add("password", "The password field confirmation does not match.");
    }
}
