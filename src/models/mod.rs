pub mod page;
pub mod transaction;
pub mod user;

pub use page::Page;
pub use transaction::{StudentAutofill, Transaction};
pub use user::UserDisplay;
