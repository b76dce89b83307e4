//! Test Helper Functions and Utilities
//!
//! Common helpers for creating test data and fixtures.

use alloy_primitives::Address;
use nodelink_core::{
    node::{ApiKeys, EndpointEnvironment, HttpClient, HttpClientConfig},
    types::{Asset, NetworkDescriptor, NodeDescriptor},
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Endpoint environment with short timeouts suited to local mock servers.
#[must_use]
pub fn test_environment() -> EndpointEnvironment {
    test_environment_with_keys(ApiKeys::default())
}

/// Endpoint environment carrying the given API keys.
#[must_use]
pub fn test_environment_with_keys(api_keys: ApiKeys) -> EndpointEnvironment {
    let config = HttpClientConfig { request_timeout_ms: 2_000, ..HttpClientConfig::default() };
    let http = HttpClient::with_config(config).expect("Failed to create HTTP client");
    EndpointEnvironment::new(Arc::new(http)).with_api_keys(api_keys)
}

/// An Ethereum mainnet network with one JSON-RPC node per `(name, url)` pair, in order.
#[must_use]
pub fn json_rpc_network(nodes: &[(&str, String)]) -> NetworkDescriptor {
    nodes.iter().fold(NetworkDescriptor::new("Ethereum", 1), |network, (name, url)| {
        network.with_node(NodeDescriptor::json_rpc(*name, url.clone()))
    })
}

/// A deterministic test address.
#[must_use]
pub fn test_address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// A token asset whose contract address repeats `byte`.
#[must_use]
pub fn test_token(ticker: &str, byte: u8) -> Asset {
    Asset::token(ticker, ticker, "Ethereum", Address::repeat_byte(byte), 18)
}

/// A 32-byte hash, hex encoded, whose bytes all equal `byte`.
#[must_use]
pub fn test_hash(byte: u8) -> String {
    format!("0x{}", format!("{byte:02x}").repeat(32))
}

/// A transaction object as returned by `eth_getTransactionByHash`.
#[must_use]
pub fn create_test_transaction(hash_byte: u8, block_number: Option<u64>) -> Value {
    json!({
        "hash": test_hash(hash_byte),
        "from": "0x0000000000000000000000000000000000000001",
        "to": "0x0000000000000000000000000000000000000002",
        "value": "0xde0b6b3a7640000",
        "gas": "0x5208",
        "gasPrice": "0x3b9aca00",
        "nonce": "0x7",
        "input": "0x",
        "blockHash": block_number.map(|_| test_hash(0xbb)),
        "blockNumber": block_number.map(|n| format!("0x{n:x}")),
        "transactionIndex": block_number.map(|_| "0x0")
    })
}

/// A receipt object as returned by `eth_getTransactionReceipt`.
#[must_use]
pub fn create_test_receipt(hash_byte: u8, block_number: u64, success: bool) -> Value {
    json!({
        "transactionHash": test_hash(hash_byte),
        "blockHash": test_hash(0xbb),
        "blockNumber": format!("0x{block_number:x}"),
        "transactionIndex": "0x0",
        "from": "0x0000000000000000000000000000000000000001",
        "to": "0x0000000000000000000000000000000000000002",
        "contractAddress": null,
        "gasUsed": "0x5208",
        "cumulativeGasUsed": "0xa410",
        "status": if success { "0x1" } else { "0x0" },
        "logs": []
    })
}

/// A batch reply entry carrying a result.
#[must_use]
pub fn batch_result(id: u64, result: &Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

/// A batch reply entry carrying an error.
#[must_use]
pub fn batch_error(id: u64, code: i64, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
}
