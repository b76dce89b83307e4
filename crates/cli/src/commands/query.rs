use alloy_primitives::U256;
use clap::{Args, Subcommand};
use nodelink_core::{
    config::AppConfig,
    node::{ChainNode, TransactionRequest},
    types::Asset,
    utils::{format_bytes, parse_address, parse_bytes, parse_decimal, parse_hash, parse_quantity},
    FallbackClient,
};
use serde_json::Value;

use super::{
    nodes::{environment, find_network},
    utils::{print_error, print_json, print_success, CliError, CliResult},
};

#[derive(Args)]
pub struct QueryArgs {
    /// Network id (e.g. Ethereum)
    #[arg(short, long, default_value = "Ethereum", global = true)]
    pub network: String,

    /// Use only the first configured node, without selection or fallback
    #[arg(long, global = true)]
    pub single: bool,

    #[command(subcommand)]
    pub command: QueryCommands,
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Check that an endpoint answers
    Ping,

    /// Current block number
    BlockNumber,

    /// Native balance of an address, in wei
    Balance { address: String },

    /// Pending transaction count of an address
    Nonce { address: String },

    /// Transaction by hash
    Tx { hash: String },

    /// Transaction receipt by hash
    Receipt { hash: String },

    /// Gas estimate for a transaction
    EstimateGas {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Value in wei, decimal or 0x-prefixed hex
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        data: Option<String>,
    },

    /// Read-only contract call (eth_call)
    Call {
        #[arg(long)]
        to: String,
        #[arg(long)]
        data: String,
    },

    /// ERC-20 balances of an owner for one or more token contracts
    TokenBalance {
        owner: String,
        /// Token contract address (repeatable)
        #[arg(short, long = "contract", required = true)]
        contracts: Vec<String>,
    },

    /// Broadcast a signed raw transaction
    SendRaw { transaction: String },

    /// Arbitrary JSON-RPC method with JSON array params
    Rpc {
        method: String,
        #[arg(default_value = "[]")]
        params: String,
    },
}

pub async fn handle_query_command(args: QueryArgs, config: &AppConfig) -> CliResult<()> {
    let network = find_network(config, &args.network)?;
    let env = environment(config)?;

    let node: Box<dyn ChainNode> = if args.single {
        Box::new(FallbackClient::create_single(network, &env)?)
    } else {
        Box::new(FallbackClient::for_network(network, &env)?)
    };

    run_query(node.as_ref(), args.command, &network.id).await
}

async fn run_query(node: &dyn ChainNode, command: QueryCommands, network_id: &str) -> CliResult<()> {
    match command {
        QueryCommands::Ping => {
            if node.ping().await {
                print_success("Endpoint is responding");
            } else {
                print_error("No endpoint answered");
            }
        }
        QueryCommands::BlockNumber => println!("{}", node.get_current_block_number().await?),
        QueryCommands::Balance { address } => {
            println!("{}", node.get_balance(parse_address(&address)?).await?);
        }
        QueryCommands::Nonce { address } => {
            println!("{}", node.get_transaction_count(parse_address(&address)?).await?);
        }
        QueryCommands::Tx { hash } => {
            print_json(&node.get_transaction_by_hash(parse_hash(&hash)?).await?)?;
        }
        QueryCommands::Receipt { hash } => {
            print_json(&node.get_transaction_receipt(parse_hash(&hash)?).await?)?;
        }
        QueryCommands::EstimateGas { from, to, value, data } => {
            let tx = build_transaction(from, to, value, data)?;
            println!("{}", node.estimate_gas(&tx).await?);
        }
        QueryCommands::Call { to, data } => {
            let tx = build_transaction(None, Some(to), None, Some(data))?;
            println!("{}", format_bytes(node.send_call_request(&tx).await?));
        }
        QueryCommands::TokenBalance { owner, contracts } => {
            let owner = parse_address(&owner)?;
            let tokens = contracts
                .iter()
                .map(|contract| -> CliResult<Asset> {
                    Ok(Asset::token(contract, contract, network_id, parse_address(contract)?, 18))
                })
                .collect::<CliResult<Vec<_>>>()?;
            let balances = node.get_token_balances(owner, &tokens).await;
            for (contract, result) in contracts.iter().zip(&balances) {
                match &result.error {
                    None => println!("{contract}: {}", result.balance),
                    Some(error) => println!("{contract}: error: {error}"),
                }
            }
        }
        QueryCommands::SendRaw { transaction } => {
            let hash = node.send_raw_transaction(&parse_bytes(&transaction)?).await?;
            println!("{hash}");
        }
        QueryCommands::Rpc { method, params } => {
            let params: Vec<Value> = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("params must be a JSON array: {e}")))?;
            print_json(&node.call(&method, params).await?)?;
        }
    }
    Ok(())
}

/// Accepts a wei amount as decimal digits or a 0x-prefixed hex quantity.
fn parse_amount(raw: &str) -> CliResult<U256> {
    let amount = if raw.starts_with("0x") || raw.starts_with("0X") {
        parse_quantity(raw)?
    } else {
        parse_decimal(raw)?
    };
    Ok(amount)
}

fn build_transaction(
    from: Option<String>,
    to: Option<String>,
    value: Option<String>,
    data: Option<String>,
) -> CliResult<TransactionRequest> {
    let mut tx = TransactionRequest::default();
    if let Some(from) = from {
        tx = tx.from(parse_address(&from)?);
    }
    if let Some(to) = to {
        tx = tx.to(parse_address(&to)?);
    }
    if let Some(value) = value {
        tx = tx.value(parse_amount(&value)?);
    }
    if let Some(data) = data {
        tx = tx.data(parse_bytes(&data)?);
    }
    Ok(tx)
}
