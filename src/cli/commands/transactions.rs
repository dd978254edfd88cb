use chrono::NaiveDate;

use crate::config::Config;
use crate::store::{TransactionFilter, TransactionStore};

async fn loaded_store(config: &Config) -> anyhow::Result<Option<TransactionStore>> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            config.transactions.request_timeout_seconds,
        ))
        .build()?;
    let store = TransactionStore::from_config(&config.transactions, client)?;

    if let Err(e) = store.load().await {
        println!("Could not load transactions: {e}");
        return Ok(None);
    }

    Ok(Some(store))
}

fn parse_date(flag: &str, value: Option<&str>) -> Option<Result<NaiveDate, String>> {
    value.map(|raw| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| format!("Invalid --{flag} '{raw}', expected YYYY-MM-DD"))
    })
}

pub async fn cmd_transactions_list(
    config: &Config,
    search: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> anyhow::Result<()> {
    let (start, end) = match (parse_date("from", from).transpose(), parse_date("to", to).transpose()) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(msg), _) | (_, Err(msg)) => {
            println!("{msg}");
            return Ok(());
        }
    };

    let Some(store) = loaded_store(config).await? else {
        return Ok(());
    };

    let filter = TransactionFilter::new(search.unwrap_or_default()).with_range(start, end);
    let items = store.query(&filter).await;

    if items.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!("Transactions ({} shown)", items.len());
    println!("{:-<90}", "");

    for t in &items {
        println!(
            "{:<12} {:<10} {:<20} {:>12.2} {:<8} {}",
            t.date, t.reference_code, t.student_name, t.amount, t.payment_method, t.status
        );
    }

    Ok(())
}

pub async fn cmd_transactions_set_status(
    config: &Config,
    reference_code: &str,
    status: &str,
) -> anyhow::Result<()> {
    let Some(store) = loaded_store(config).await? else {
        return Ok(());
    };

    match store.update_status(reference_code, status).await {
        Ok(true) => println!("✓ {reference_code} is now {status}"),
        Ok(false) => println!("Transaction {reference_code} not found."),
        Err(e) => println!("Status change was not saved: {e}"),
    }

    Ok(())
}

pub async fn cmd_transactions_autofill(config: &Config) -> anyhow::Result<()> {
    let Some(store) = loaded_store(config).await? else {
        return Ok(());
    };

    for student in store.student_autofill().await {
        println!(
            "{:<8} {:<20} {:<28} {:<10} {}",
            student.campus_id, student.name, student.course, student.year_level, student.school_year
        );
    }

    Ok(())
}
