//! `SeaORM` implementation of the `UserService` trait.

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::user::{hash_password, is_unique_violation};
use crate::models::{Page, UserDisplay};
use crate::services::notifier::{Notifier, UserCreatedNotice, dispatch_user_created};
use crate::services::user_service::{
    FieldErrors, NewUser, USERS_PER_PAGE, UserError, UserService, UserUpdate,
    validate_password, validate_profile_fields,
};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task;
use tracing::info;

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
    notifier: Option<Arc<dyn Notifier>>,
    from_address: String,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(
        store: Store,
        security: SecurityConfig,
        notifier: Option<Arc<dyn Notifier>>,
        from_address: String,
    ) -> Self {
        Self {
            store,
            security,
            notifier,
            from_address,
        }
    }

    async fn ensure_email_free(&self, email: &str, except_id: Option<i32>) -> Result<(), UserError> {
        if self.store.is_email_taken(email, except_id).await? {
            return Err(UserError::EmailTaken(email.to_string()));
        }
        Ok(())
    }
}

/// A unique-index violation means a concurrent writer took the email between
/// our check and the write.
fn map_write_error(err: anyhow::Error, email: &str) -> UserError {
    if is_unique_violation(&err) {
        UserError::EmailTaken(email.to_string())
    } else {
        UserError::Database(format!("{err:#}"))
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list_users(
        &self,
        search: Option<&str>,
        page: u64,
    ) -> Result<Page<UserDisplay>, UserError> {
        let page = page.max(1);
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let (users, total) = self
            .store
            .list_users_page(search, page - 1, USERS_PER_PAGE)
            .await?;

        Ok(Page::new(users, total, page, USERS_PER_PAGE).map(UserDisplay::from))
    }

    async fn get_user(&self, id: i32) -> Result<UserDisplay, UserError> {
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(UserDisplay::from(user))
    }

    async fn create_user(&self, input: NewUser) -> Result<UserDisplay, UserError> {
        let name = input.name.trim();
        let email = input.email.trim();

        let mut errors = FieldErrors::new();
        validate_profile_fields(name, email, &mut errors);
        validate_password(&input.password, &input.password_confirmation, &mut errors);
        errors.into_result()?;

        self.ensure_email_free(email, None).await?;

        // Argon2 is CPU-bound
        let password = input.password;
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let user = self
            .store
            .create_user(name, email, password_hash)
            .await
            .map_err(|e| map_write_error(e, email))?;

        info!(user_id = user.id, "User created");

        if let Some(notifier) = &self.notifier {
            let notice = UserCreatedNotice::new(user.id, &user.name, &user.email, &self.from_address);
            dispatch_user_created(notifier.clone(), notice);
        }

        Ok(UserDisplay::from(user))
    }

    async fn update_user(&self, id: i32, input: UserUpdate) -> Result<UserDisplay, UserError> {
        if self.store.get_user(id).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        let name = input.name.trim();
        let email = input.email.trim();

        let mut errors = FieldErrors::new();
        validate_profile_fields(name, email, &mut errors);
        errors.into_result()?;

        self.ensure_email_free(email, Some(id)).await?;

        let user = self
            .store
            .update_user(id, name, email)
            .await
            .map_err(|e| map_write_error(e, email))?
            .ok_or(UserError::NotFound(id))?;

        info!(user_id = id, "User updated");

        Ok(UserDisplay::from(user))
    }

    async fn delete_user(&self, id: i32) -> Result<(), UserError> {
        if !self.store.delete_user(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!(user_id = id, "User deleted");
        Ok(())
    }
}
