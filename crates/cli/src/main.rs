use clap::{Parser, Subcommand};
use nodelink_core::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
use commands::{
    handle_config_command, handle_nodes_command, handle_query_command, handle_store_command,
    ConfigCommands, NodesCommands, QueryArgs, StoreCommands,
};

#[derive(Parser)]
#[command(name = "nodelink-cli")]
#[command(about = "nodelink CLI - endpoint selection, fallback queries and config tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $NODELINK_CONFIG, then config/config.toml)
    #[arg(long, global = true, env = "NODELINK_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Inspect and check the endpoints of a network
    #[command(subcommand)]
    Nodes(NodesCommands),

    /// Run a chain query through the fallback chain
    Query(QueryArgs),

    /// Check and merge exported store documents
    #[command(subcommand)]
    Store(StoreCommands),
}

/// Initializes logging from the configured format.
///
/// `RUST_LOG=debug` and `RUST_LOG=trace` expand to the nodelink crates only.
fn init_logging(config: &AppConfig) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        if env_filter == "debug" {
            EnvFilter::new("warn,nodelink_core=debug,nodelink_cli=debug")
        } else if env_filter == "trace" {
            EnvFilter::new("warn,nodelink_core=trace,nodelink_cli=trace")
        } else {
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("warn,nodelink_core=debug,nodelink_cli=debug"))
        }
    } else {
        let level = &config.logging.level;
        EnvFilter::try_new(format!("warn,nodelink_core={level},nodelink_cli={level}"))
            .unwrap_or_else(|_| EnvFilter::new("warn,nodelink_core=info,nodelink_cli=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    match cli.command {
        Commands::Config(config_command) => handle_config_command(config_command)?,
        Commands::Nodes(nodes_command) => handle_nodes_command(nodes_command, &config).await?,
        Commands::Query(query_args) => handle_query_command(query_args, &config).await?,
        Commands::Store(store_command) => handle_store_command(store_command)?,
    }

    Ok(())
}
