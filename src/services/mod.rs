pub mod notifier;
pub use notifier::{LogNotifier, Notifier, UserCreatedNotice, WebhookNotifier, build_notifier};

pub mod user_service;
pub use user_service::{FieldErrors, NewUser, UserError, UserService, UserUpdate};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;
