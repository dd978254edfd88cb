//! Command-line interface, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};

/// Bursar - student payments back office
#[derive(Parser)]
#[command(name = "bursar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API (the default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Inspect and update transactions
    #[command(alias = "tx")]
    Transactions {
        #[command(subcommand)]
        command: TransactionCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users, ten per page
    #[command(alias = "ls")]
    List {
        /// Match against name or email
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, short, default_value = "1")]
        page: u64,
    },
    /// Show one user
    Show { id: i32 },
    /// Create a user; the password is read from stdin
    Create { name: String, email: String },
    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        id: i32,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// List transactions, newest first
    #[command(alias = "ls")]
    List {
        #[arg(long, short)]
        search: Option<String>,
        /// YYYY-MM-DD, needs --to
        #[arg(long)]
        from: Option<String>,
        /// YYYY-MM-DD, needs --from
        #[arg(long)]
        to: Option<String>,
    },
    /// Change the status of one transaction
    SetStatus {
        reference_code: String,
        status: String,
    },
    /// Print the student autofill list
    Autofill,
}

pub use commands::*;
