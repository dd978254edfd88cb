mod transactions;
mod users;

pub use transactions::{cmd_transactions_autofill, cmd_transactions_list, cmd_transactions_set_status};
pub use users::{cmd_users_create, cmd_users_delete, cmd_users_list, cmd_users_show};
