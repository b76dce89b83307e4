use clap::Subcommand;
use nodelink_core::config::AppConfig;
use std::path::Path;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the current configuration
    Validate {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show current configuration
    Show {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,

        /// Show sensitive values (API keys, node credentials)
        #[arg(long)]
        show_sensitive: bool,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file, show_sensitive } => show_config(&file, show_sensitive),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));

    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    println!("Configuration Summary:");
    println!("  Networks: {}", config.networks.len());
    for network in &config.networks {
        println!(
            "    {} (chain {}): {} nodes{}",
            network.id,
            network.chain_id,
            network.nodes.len(),
            network.selected_node().map(|n| format!(", selected {n}")).unwrap_or_default()
        );
    }
    println!("  Infura key: {}", if config.api_keys.infura.is_some() { "set" } else { "unset" });
    println!(
        "  Etherscan key: {}",
        if config.api_keys.etherscan.is_some() { "set" } else { "unset" }
    );

    Ok(())
}

fn mask(value: Option<&str>, show_sensitive: bool) -> String {
    match value {
        None => "(none)".to_string(),
        Some(value) if show_sensitive => value.to_string(),
        Some(_) => "[hidden - use --show-sensitive to reveal]".to_string(),
    }
}

fn show_config(file: &str, show_sensitive: bool) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    println!("Configuration from {file}:");

    println!("\n[API Keys]");
    println!("  Etherscan: {}", mask(config.api_keys.etherscan.as_deref(), show_sensitive));
    println!("  Infura: {}", mask(config.api_keys.infura.as_deref(), show_sensitive));

    println!("\n[HTTP]");
    println!("  Concurrent Limit: {}", config.http.concurrent_limit);
    println!(
        "  Permit Timeout: {}ms ({}ms when scarce, below {} permits)",
        config.http.permit_timeout_ms,
        config.http.permit_timeout_scarce_ms,
        config.http.scarce_permit_threshold
    );
    println!("  Request Timeout: {}ms", config.http.request_timeout_ms);

    println!("\n[Networks] ({} networks)", config.networks.len());
    for network in &config.networks {
        println!("  {} (chain {})", network.id, network.chain_id);
        for node in &network.nodes {
            let mut line = format!("    {} [{}]", node.name, node.node_type);
            if let Some(url) = &node.url {
                line.push_str(&format!(" {url}"));
            }
            if let Some(auth) = &node.auth {
                line.push_str(&format!(
                    " as {}:{}",
                    auth.username,
                    mask(Some(auth.password.as_str()), show_sensitive)
                ));
            }
            if node.is_disabled_by_default() {
                line.push_str(" (disabled by default)");
            }
            if network.selected_node() == Some(node.name.as_str()) {
                line.push_str(" (selected)");
            }
            println!("{line}");
        }
    }

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nodelink configuration
# Networks listed here are overlaid onto the built-in Ethereum and Goerli networks.

[api_keys]
# etherscan = "YOUR_ETHERSCAN_KEY"
# infura = "YOUR_INFURA_PROJECT_ID"

[http]
concurrent_limit = 64
permit_timeout_ms = 2000
permit_timeout_scarce_ms = 500
scarce_permit_threshold = 8
request_timeout_ms = 10000

[logging]
level = "info"
format = "pretty"

[[networks]]
id = "Ethereum"
chain_id = 1
# selected_node = "local"

[[networks.nodes]]
name = "local"
type = "JSON_RPC"
url = "http://localhost:8545"
disable_by_default = true

[[networks]]
id = "Devnet"
chain_id = 1337

[[networks.nodes]]
name = "anvil"
type = "JSON_RPC"
url = "http://127.0.0.1:8545"
"#;

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    if Path::new(output).exists() && !force {
        return Err(CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    if let Some(parent) = Path::new(output).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, SAMPLE_CONFIG)?;

    print_success(&format!("Sample configuration generated: {output}"));
    print_info("Remember to:");
    print_info("  1. Set API keys for the hosted endpoints you use");
    print_info("  2. Point the sample nodes at your own endpoints");

    Ok(())
}
