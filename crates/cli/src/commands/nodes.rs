use clap::Subcommand;
use nodelink_core::{
    config::AppConfig,
    network::select_endpoints,
    node::{ChainNode, EndpointEnvironment, HttpClient, NodeClient, NodeError},
    types::{NetworkDescriptor, NodeDescriptor},
};
use std::sync::Arc;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum NodesCommands {
    /// List the endpoints a network would use, in fallback order
    List {
        /// Network id (e.g. Ethereum)
        #[arg(short, long, default_value = "Ethereum")]
        network: String,

        /// Treat an injected wallet as available
        #[arg(long)]
        injected: bool,
    },

    /// Ping every selected endpoint and verify its chain id
    Check {
        /// Network id (e.g. Ethereum)
        #[arg(short, long, default_value = "Ethereum")]
        network: String,
    },
}

pub async fn handle_nodes_command(command: NodesCommands, config: &AppConfig) -> CliResult<()> {
    match command {
        NodesCommands::List { network, injected } => {
            list_nodes(find_network(config, &network)?, injected);
            Ok(())
        }
        NodesCommands::Check { network } => {
            check_nodes(find_network(config, &network)?, &environment(config)?).await
        }
    }
}

pub(crate) fn find_network<'a>(config: &'a AppConfig, id: &str) -> CliResult<&'a NetworkDescriptor> {
    config.network(id).ok_or_else(|| {
        let known: Vec<&str> = config.networks.iter().map(|n| n.id.as_str()).collect();
        CliError::Input(format!("unknown network {id} (configured: {})", known.join(", ")))
    })
}

/// Endpoint environment for the CLI. No injected wallet exists outside a browser.
pub(crate) fn environment(config: &AppConfig) -> CliResult<EndpointEnvironment> {
    let http = HttpClient::with_config(config.http.client_config()).map_err(NodeError::from)?;
    Ok(EndpointEnvironment::new(Arc::new(http)).with_api_keys(config.api_keys.clone()))
}

fn list_nodes(network: &NetworkDescriptor, injected: bool) {
    let selected = select_endpoints(network, injected);

    println!("Network {} (chain {}):", network.id, network.chain_id);
    if selected.is_empty() {
        print_error("No eligible endpoints");
        return;
    }
    for (position, node) in selected.iter().enumerate() {
        println!(
            "  {}. {} [{}]{}",
            position + 1,
            node.name,
            node.node_type,
            node.url.as_deref().map(|url| format!(" {url}")).unwrap_or_default()
        );
    }

    let skipped = network.nodes.len() - selected.len();
    if skipped > 0 {
        print_info(&format!("{skipped} configured node(s) not eligible"));
    }
}

async fn check_nodes(network: &NetworkDescriptor, env: &EndpointEnvironment) -> CliResult<()> {
    let selected = select_endpoints(network, env.injected_available());
    if selected.is_empty() {
        return Err(NodeError::NoAvailableEndpoint { network: network.id.clone() }.into());
    }

    print_info(&format!("Checking {} endpoint(s) for {}...", selected.len(), network.id));

    let mut healthy = 0;
    for node in &selected {
        match check_node(network, node, env).await {
            Ok(elapsed_ms) => {
                println!("  {}: [OK] ({elapsed_ms}ms)", node.name);
                healthy += 1;
            }
            Err(reason) => println!("  {}: [ERROR] {reason}", node.name),
        }
    }

    if healthy == selected.len() {
        print_success("All endpoints are responding");
    } else {
        print_error(&format!("{} of {} endpoints failed", selected.len() - healthy, selected.len()));
    }

    Ok(())
}

/// Pings one node and verifies its chain id, returning the round trip in milliseconds.
async fn check_node(
    network: &NetworkDescriptor,
    node: &NodeDescriptor,
    env: &EndpointEnvironment,
) -> Result<u128, String> {
    let client = NodeClient::from_descriptor(network, node, env).map_err(|e| e.to_string())?;

    let start = std::time::Instant::now();
    if !client.ping().await {
        return Err("no answer".to_string());
    }
    client.check_chain_id().await.map_err(|e| e.to_string())?;
    Ok(start.elapsed().as_millis())
}
