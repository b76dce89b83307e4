use clap::Subcommand;
use nodelink_core::store::{check_import, merge_network_config, networks_from_store};
use serde_json::Value;
use std::path::Path;

use super::utils::{print_error, print_info, print_json, print_success, CliResult};

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Check whether an exported store document can be imported over the current one
    Check {
        /// Exported document to import
        import: String,

        /// Current store document
        #[arg(short, long)]
        current: String,
    },

    /// Overlay the networks of one store document onto another's
    MergeNetworks {
        /// Document holding the networks to overlay
        inbound: String,

        /// Document holding the networks to overlay onto
        original: String,

        /// Write the merged networks here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

pub fn handle_store_command(command: StoreCommands) -> CliResult<()> {
    match command {
        StoreCommands::Check { import, current } => check_store(&import, &current),
        StoreCommands::MergeNetworks { inbound, original, output } => {
            merge_networks(&inbound, &original, output.as_deref())
        }
    }
}

fn read_document(path: &str) -> CliResult<Value> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn check_store(import: &str, current: &str) -> CliResult<()> {
    let to_import = read_document(import)?;
    let current = read_document(current)?;

    match check_import(&to_import, &current) {
        Ok(()) => {
            print_success(&format!("{import} can be imported"));
            Ok(())
        }
        Err(e) => {
            print_error(&e.to_string());
            Err(e.into())
        }
    }
}

fn merge_networks(inbound: &str, original: &str, output: Option<&str>) -> CliResult<()> {
    let inbound_networks = networks_from_store(&read_document(inbound)?)?;
    let original_networks = networks_from_store(&read_document(original)?)?;

    let merged = merge_network_config(&inbound_networks, &original_networks);
    print_info(&format!(
        "Merged {} inbound network(s) onto {}: {} total",
        inbound_networks.len(),
        original_networks.len(),
        merged.len()
    ));

    match output {
        Some(path) => {
            if Path::new(path).exists() {
                print_info(&format!("Overwriting {path}"));
            }
            std::fs::write(path, serde_json::to_string_pretty(&merged)?)?;
            print_success(&format!("Merged networks written to {path}"));
            Ok(())
        }
        None => print_json(&merged),
    }
}
