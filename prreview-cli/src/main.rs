//! prreview CLI - reviewer assignment for pull requests
//!
//! Runs the HTTP service and exposes the same operations as subcommands
//! against the configured database.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prreview_core::config::LogConfig;
use prreview_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, ServeArgs, TeamArgs, UserArgs};

/// prreview: automatic reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "prreview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/prreview/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path (overrides config and env)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Create and inspect teams
    Team(TeamArgs),

    /// Manage users
    User(UserArgs),

    /// Create, merge and reassign pull requests
    #[command(visible_alias = "pull-request")]
    Pr(PrArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        let (host, port) = match &self.command {
            Some(Commands::Serve(args)) => (args.host.clone(), args.port),
            _ => (None, None),
        };

        CliOverrides {
            host,
            port,
            database_path: self.db.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for command output
    if log.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_overrides(cli.config.as_deref(), cli.overrides())?;
    init_tracing(&config.log);

    tracing::debug!(
        bind = %config.server.bind_addr(),
        database = %config.database.path.display(),
        "configuration loaded"
    );

    match cli.command {
        Some(Commands::Serve(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Team(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::User(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Pr(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Version) => {
            println!("prreview {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Config) => {
            print_config(&config, cli.config.as_deref());
        }
        None => {
            println!("prreview - reviewer assignment for pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit: Option<&std::path::Path>) {
    println!("prreview Configuration");
    println!("======================");
    println!();
    println!("Server:");
    println!("  host: {}", config.server.host);
    println!("  port: {}", config.server.port);
    println!(
        "  request_timeout: {}s",
        config.server.request_timeout.as_secs_f64()
    );
    println!();
    println!("Database:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!(
        "  busy_timeout: {}ms",
        config.database.busy_timeout.as_millis()
    );
    println!();
    println!("Log:");
    println!("  level: {}", config.log.level);
    println!("  format: {}", config.log.format);
    println!();

    let path = explicit
        .map(|p| p.to_path_buf())
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
