//! visa-alerts CLI
//!
//! Runs the alert API and drives a running one from the command line.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use uuid::Uuid;

use visa_alerts::alerting::{AlertService, PageLimits};
use visa_alerts::api::HttpServer;
use visa_alerts::client::{AlertClient, ClientError, ListParams};
use visa_alerts::config::{Config, Environment, LogFormat, LoggingConfig};
use visa_alerts::db::{self, MemoryAlertStore, PostgresPool};
use visa_alerts::models::{Alert, AlertPage, AlertStatus, NewAlert, VisaType};

/// visa-alerts - Visa appointment slot alerts
#[derive(Parser)]
#[command(name = "visa-alerts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "VISA_ALERTS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (for commands that support it)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Base URL of a running API (client commands)
    #[arg(long, global = true, env = "VISA_ALERTS_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the API backed by PostgreSQL
    Serve {
        /// Address to bind to
        #[arg(long)]
        host: Option<String>,

        /// HTTP port
        #[arg(long)]
        port: Option<u16>,

        /// Apply pending migrations before serving
        #[arg(long)]
        migrate: bool,
    },

    /// Serve the API from an in-memory store with verbose errors
    Dev {
        /// HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Apply database migrations
    Migrate,

    /// Manage alerts on a running API
    Alerts {
        #[command(subcommand)]
        command: AlertsCommands,
    },

    /// Check whether a running API is reachable
    Health,
}

#[derive(Subcommand)]
enum AlertsCommands {
    /// List alerts
    List {
        /// Country substring filter (case-insensitive)
        #[arg(long)]
        country: Option<String>,

        /// Status filter (Active, Booked, Expired)
        #[arg(long)]
        status: Option<AlertStatus>,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Page size
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Create an alert
    Create {
        /// Destination country
        #[arg(long)]
        country: String,

        /// Consulate city
        #[arg(long)]
        city: String,

        /// Visa type (Tourist, Business, Student)
        #[arg(long)]
        visa_type: VisaType,
    },

    /// Change an alert's status
    Update {
        /// Alert ID
        id: Uuid,

        /// New status (Active, Booked, Expired)
        #[arg(long)]
        status: AlertStatus,
    },

    /// Delete an alert
    Delete {
        /// Alert ID
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = cli.api_url.clone() {
        config.client.api_url = url;
    }

    // Initialize logging
    init_logging(&config.logging, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Serve {
            host,
            port,
            migrate,
        } => run_serve(config, host, port, migrate).await,
        Commands::Dev { port } => run_dev(config, port).await,
        Commands::Migrate => run_migrate(config).await,
        Commands::Alerts { command } => run_alerts(config, command, cli.format).await,
        Commands::Health => run_health(config, cli.format).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    migrate: bool,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let store = db::connect(&config.database, migrate).await?;
    info!("Database connection healthy");

    let service = AlertService::new(store, PageLimits::from(&config.pagination));
    let addr = config.server.addr();

    info!("Visa alert API on http://{addr}, health check at /api/health");
    HttpServer::new(service, &config).serve(&addr).await?;
    Ok(())
}

async fn run_dev(mut config: Config, port: Option<u16>) -> anyhow::Result<()> {
    config.environment = Environment::Development;
    if let Some(port) = port {
        config.server.port = port;
    }

    warn!("Serving from an in-memory store; alerts are lost on exit");
    let service = AlertService::new(
        Arc::new(MemoryAlertStore::new()),
        PageLimits::from(&config.pagination),
    );
    let addr = config.server.addr();

    info!("Visa alert API (dev) on http://{addr}");
    HttpServer::new(service, &config).serve(&addr).await?;
    Ok(())
}

async fn run_migrate(config: Config) -> anyhow::Result<()> {
    let pool = PostgresPool::new(&config.database).await?;
    pool.migrate().await?;
    println!("Migrations applied");
    Ok(())
}

async fn run_alerts(
    config: Config,
    command: AlertsCommands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let client = AlertClient::new(&config.client)?;

    let result = match command {
        AlertsCommands::List {
            country,
            status,
            page,
            limit,
        } => {
            let params = ListParams {
                country,
                status,
                page,
                limit,
            };
            client.list(&params).await.map(|page| print_page(&page, format))
        }
        AlertsCommands::Create {
            country,
            city,
            visa_type,
        } => {
            let input = NewAlert {
                country,
                city,
                visa_type,
            };
            client.create(&input).await.map(|alert| print_alert(&alert, format))
        }
        AlertsCommands::Update { id, status } => client
            .update_status(id, status)
            .await
            .map(|alert| print_alert(&alert, format)),
        AlertsCommands::Delete { id } => client.delete(id).await.map(|()| {
            println!("Deleted alert {id}");
        }),
    };

    result.map_err(explain)
}

async fn run_health(config: Config, format: OutputFormat) -> anyhow::Result<()> {
    let client = AlertClient::new(&config.client)?;

    match client.health().await {
        Ok(health) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
                OutputFormat::Text => println!("API: {} ({})", health.status, health.timestamp),
            }
            Ok(())
        }
        Err(e) => Err(explain(e)),
    }
}

fn explain(err: ClientError) -> anyhow::Error {
    match err {
        ClientError::Unreachable(_) => {
            anyhow::anyhow!("{err}\nThe service may be waking up; retry in a few seconds.")
        }
        ClientError::Validation { error, details } => {
            let lines: Vec<String> = details.iter().map(|d| format!("  - {d}")).collect();
            anyhow::anyhow!("{error}\n{}", lines.join("\n"))
        }
        other => other.into(),
    }
}

fn print_alert(alert: &Alert, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(alert) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {e}"),
        },
        OutputFormat::Text => println!("{}", alert_line(alert)),
    }
}

fn print_page(page: &AlertPage, format: OutputFormat) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(page) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {e}"),
        },
        OutputFormat::Text => {
            if page.data.is_empty() {
                println!("No alerts found");
            }
            for alert in &page.data {
                println!("{}", alert_line(alert));
            }
            let meta = page.pagination;
            println!(
                "Page {} of {} ({} alerts, {} per page)",
                meta.page, meta.pages, meta.total, meta.limit
            );
        }
    }
}

fn alert_line(alert: &Alert) -> String {
    format!(
        "{}  {:<20} {:<20} {:<9} {:<8} {}",
        alert.id,
        alert.country,
        alert.city,
        alert.visa_type,
        alert.status,
        alert.created_at.format("%Y-%m-%d")
    )
}
