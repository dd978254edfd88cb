use std::io::Write;

use crate::config::Config;
use crate::db::Store;
use crate::services::{NewUser, SeaOrmUserService, UserError, UserService, build_notifier};

async fn user_service(config: &Config) -> anyhow::Result<SeaOrmUserService> {
    let store = Store::new(&config.general.database_path).await?;
    let notifier = build_notifier(&config.notifications, reqwest::Client::new())?;

    Ok(SeaOrmUserService::new(
        store,
        config.security.clone(),
        notifier,
        config.notifications.from_address.clone(),
    ))
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn print_user_error(err: &UserError) {
    match err {
        UserError::Validation(fields) => {
            println!("Could not save user:");
            for (field, messages) in fields.clone().into_inner() {
                for message in messages {
                    println!("  {field}: {message}");
                }
            }
        }
        other => println!("{other}"),
    }
}

pub async fn cmd_users_list(config: &Config, search: Option<&str>, page: u64) -> anyhow::Result<()> {
    let service = user_service(config).await?;
    let users = match service.list_users(search, page).await {
        Ok(users) => users,
        Err(e) => {
            print_user_error(&e);
            return Ok(());
        }
    };

    if users.total == 0 {
        println!("No users found.");
        return Ok(());
    }

    println!(
        "Users (page {} of {}, {} total)",
        users.page, users.last_page, users.total
    );
    println!("{:-<70}", "");

    for user in &users.items {
        println!("[{}] {} <{}>", user.id, user.name, user.email);
        println!("    Created: {} | Updated: {}", user.created_at, user.updated_at);
    }

    Ok(())
}

pub async fn cmd_users_show(config: &Config, id: i32) -> anyhow::Result<()> {
    let service = user_service(config).await?;

    match service.get_user(id).await {
        Ok(user) => {
            println!("ID:      {}", user.id);
            println!("Name:    {}", user.name);
            println!("Email:   {}", user.email);
            println!("Created: {}", user.created_at);
            println!("Updated: {}", user.updated_at);
        }
        Err(e) => print_user_error(&e),
    }

    Ok(())
}

pub async fn cmd_users_create(config: &Config, name: &str, email: &str) -> anyhow::Result<()> {
    let service = user_service(config).await?;

    let password = prompt("Password")?;
    let password_confirmation = prompt("Confirm password")?;

    let result = service
        .create_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password,
            password_confirmation,
        })
        .await;

    match result {
        Ok(user) => println!("✓ User created! (ID: {})", user.id),
        Err(e) => print_user_error(&e),
    }

    Ok(())
}

pub async fn cmd_users_delete(config: &Config, id: i32, yes: bool) -> anyhow::Result<()> {
    let service = user_service(config).await?;

    let user = match service.get_user(id).await {
        Ok(user) => user,
        Err(e) => {
            print_user_error(&e);
            return Ok(());
        }
    };

    if !yes {
        println!("Delete '{}' <{}> (ID: {})?", user.name, user.email, user.id);
        let answer = prompt("Enter 'y' to confirm, anything else to cancel")?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match service.delete_user(id).await {
        Ok(()) => println!("✓ User deleted!"),
        Err(e) => print_user_error(&e),
    }

    Ok(())
}
