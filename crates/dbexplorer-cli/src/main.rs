//! dbexplorer CLI - instant CRUD API over a MySQL/MariaDB database.

mod server;

use clap::{Parser, Subcommand};
use dbexplorer::{drivers, Config, ExplorerError, QueryEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "dbexplorer")]
#[command(about = "Instant CRUD API over every table of a MySQL/MariaDB database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the CRUD API over HTTP
    Serve {
        /// Override listen address
        #[arg(long)]
        host: Option<String>,

        /// Override listen port
        #[arg(long)]
        port: Option<u16>,

        /// Override number of HTTP workers
        #[arg(long)]
        workers: Option<usize>,
    },

    /// List the tables found in the database
    Tables,

    /// Show the columns of one table
    Describe {
        /// Table name
        table: String,
    },

    /// Test the database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ExplorerError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(ExplorerError::Config)?;

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Serve {
            host,
            port,
            workers,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(w) = workers {
                config.server.workers = Some(w);
            }
            config.validate()?;

            let engine = connect_engine(&config).await?;
            server::serve(engine, &config.server.bind_address(), config.server.workers).await?;
        }

        Commands::Tables => {
            let engine = connect_engine(&config).await?;
            let tables = engine.table_names();

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(tables)?);
            } else {
                println!("Tables in {}:", config.database.database);
                for table in tables {
                    println!("  {}", table);
                }
            }
        }

        Commands::Describe { table } => {
            let engine = connect_engine(&config).await?;
            let schema = engine.describe(&table)?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(schema)?);
            } else {
                println!("Table {}:", schema.name);
                for col in &schema.columns {
                    let mut flags = Vec::new();
                    if col.is_primary_key {
                        flags.push("primary key");
                    }
                    if col.nullable {
                        flags.push("nullable");
                    }
                    if col.has_default {
                        flags.push("default");
                    }
                    println!(
                        "  {:<24} {:<20} {:<14} {}",
                        col.name.as_str(),
                        col.raw_type,
                        col.declared_type.to_string(),
                        flags.join(", ")
                    );
                }
            }
        }

        Commands::HealthCheck => {
            let start = Instant::now();
            let result = match drivers::connect(&config.database).await {
                Ok(storage) => storage.ping().await,
                Err(e) => Err(e),
            };
            let latency_ms = start.elapsed().as_millis() as u64;

            if cli.output_json {
                let report = serde_json::json!({
                    "healthy": result.is_ok(),
                    "latency_ms": latency_ms,
                    "error": result.as_ref().err().map(ToString::to_string),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Database (MySQL): {} ({}ms)",
                    if result.is_ok() { "OK" } else { "FAILED" },
                    latency_ms
                );
                if let Err(ref err) = result {
                    println!("    Error: {}", err);
                }
            }

            result?;
        }
    }

    Ok(())
}

/// Connect and introspect; a failed introspection stops the process.
async fn connect_engine(config: &Config) -> Result<QueryEngine, ExplorerError> {
    let storage = drivers::connect(&config.database).await?;
    QueryEngine::connect(storage).await
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
