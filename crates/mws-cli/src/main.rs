use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mws")]
#[command(about = "MWS order sync CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> region -> shop ...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// GetServiceStatus health check. Exits non-zero unless GREEN.
    Status {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },

    /// Stream orders in the sync window as JSON lines
    Orders {
        #[command(subcommand)]
        cmd: OrdersCmd,
    },

    /// Single-order lookups
    Order {
        #[command(subcommand)]
        cmd: OrderCmd,
    },
}

#[derive(Subcommand)]
enum OrdersCmd {
    /// Orders whose last update falls in [since, now - buffer)
    Modified {
        /// Window start (RFC 3339, e.g. 2014-03-01T00:00:00Z)
        #[arg(long, value_parser = parse_since)]
        since: DateTime<Utc>,

        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },

    /// Orders created in [since, now - buffer); initial backfill
    Created {
        /// Window start (RFC 3339)
        #[arg(long, value_parser = parse_since)]
        since: DateTime<Utc>,

        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum OrderCmd {
    /// Print one order
    Get {
        /// Amazon order id
        #[arg(long)]
        id: String,

        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },

    /// Print the line items of one order
    Items {
        /// Amazon order id
        #[arg(long)]
        id: String,

        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },
}

fn parse_since(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 (e.g. 2014-03-01T00:00:00Z): {e}"))
}

fn main() -> Result<()> {
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = mws_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Status { config_paths } => {
            let transport = commands::build_transport(&config_paths)?;
            let healthy = transport.get_status()?;
            println!("healthy={healthy}");
            if !healthy {
                anyhow::bail!("SERVICE_UNHEALTHY: GetServiceStatus did not report GREEN");
            }
        }

        Commands::Orders { cmd } => match cmd {
            OrdersCmd::Modified {
                since,
                config_paths,
            } => {
                let transport = commands::build_transport(&config_paths)?;
                commands::print_json_lines("orders", transport.get_mod_orders(since))?;
            }
            OrdersCmd::Created {
                since,
                config_paths,
            } => {
                let transport = commands::build_transport(&config_paths)?;
                commands::print_json_lines("orders", transport.get_initial_orders(since))?;
            }
        },

        Commands::Order { cmd } => match cmd {
            OrderCmd::Get { id, config_paths } => {
                let transport = commands::build_transport(&config_paths)?;
                let n = commands::print_json_lines("orders", transport.get_order(&id))?;
                if n == 0 {
                    anyhow::bail!("ORDER_NOT_FOUND: {id}");
                }
            }
            OrderCmd::Items { id, config_paths } => {
                let transport = commands::build_transport(&config_paths)?;
                commands::print_json_lines("order_items", transport.get_order_items(&id))?;
            }
        },
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
