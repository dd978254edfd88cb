pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, TransactionCommands, UserCommands};
pub use config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("Config file already exists.");
        }
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config, prometheus_handle).await,

        Commands::Init => Ok(()),

        Commands::Users { command } => match command {
            UserCommands::List { search, page } => {
                cli::cmd_users_list(&config, search.as_deref(), page).await
            }
            UserCommands::Show { id } => cli::cmd_users_show(&config, id).await,
            UserCommands::Create { name, email } => {
                cli::cmd_users_create(&config, &name, &email).await
            }
            UserCommands::Delete { id, yes } => cli::cmd_users_delete(&config, id, yes).await,
        },

        Commands::Transactions { command } => match command {
            TransactionCommands::List { search, from, to } => {
                cli::cmd_transactions_list(
                    &config,
                    search.as_deref(),
                    from.as_deref(),
                    to.as_deref(),
                )
                .await
            }
            TransactionCommands::SetStatus {
                reference_code,
                status,
            } => cli::cmd_transactions_set_status(&config, &reference_code, &status).await,
            TransactionCommands::Autofill => cli::cmd_transactions_autofill(&config).await,
        },
    }
}

/// `RUST_LOG` wins over `general.log_level`.
fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Bursar v{} starting...", env!("CARGO_PKG_VERSION"));

    if !config.server.enabled {
        info!("Web API disabled in config; nothing to serve");
        return Ok(());
    }

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let transactions = api_state.transactions().clone();

    let app = api::router(api_state).await;
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web API running at http://{}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Error listening for shutdown: {}", e),
        }
    });

    let result = server.await;
    transactions.dispose();
    info!("Server stopped");

    result.context("Web server error")
}
