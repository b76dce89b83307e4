//! JSON-RPC request builders for the methods the node client issues.
//!
//! Account-state queries read the `pending` block so freshly broadcast transactions are
//! reflected in balances and nonces.

use alloy_primitives::{Address, Bytes, B256};
use serde_json::{json, Value};

use crate::{
    node::{models::TransactionRequest, NodeError},
    types::{Asset, JsonRpcRequest},
    utils::format_bytes,
};

/// Block tag used for account-state queries.
pub const PENDING_BLOCK: &str = "pending";

/// ERC-20 `balanceOf(address)` selector.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

const REQUEST_ID: u64 = 1;

fn request(method: &str, params: Vec<Value>) -> JsonRpcRequest {
    JsonRpcRequest::new(method, params, REQUEST_ID)
}

fn transaction_object(tx: &TransactionRequest) -> Result<Value, NodeError> {
    serde_json::to_value(tx).map_err(|e| NodeError::InvalidRequest(e.to_string()))
}

#[must_use]
pub fn net_version() -> JsonRpcRequest {
    request("net_version", vec![])
}

#[must_use]
pub fn chain_id() -> JsonRpcRequest {
    request("eth_chainId", vec![])
}

#[must_use]
pub fn get_balance(address: Address) -> JsonRpcRequest {
    request("eth_getBalance", vec![json!(format_bytes(address)), json!(PENDING_BLOCK)])
}

#[must_use]
pub fn get_transaction_count(address: Address) -> JsonRpcRequest {
    request("eth_getTransactionCount", vec![json!(format_bytes(address)), json!(PENDING_BLOCK)])
}

#[must_use]
pub fn get_transaction_by_hash(hash: B256) -> JsonRpcRequest {
    request("eth_getTransactionByHash", vec![json!(format_bytes(hash))])
}

#[must_use]
pub fn get_transaction_receipt(hash: B256) -> JsonRpcRequest {
    request("eth_getTransactionReceipt", vec![json!(format_bytes(hash))])
}

#[must_use]
pub fn block_number() -> JsonRpcRequest {
    request("eth_blockNumber", vec![])
}

#[must_use]
pub fn send_raw_transaction(signed: &Bytes) -> JsonRpcRequest {
    request("eth_sendRawTransaction", vec![json!(format_bytes(signed))])
}

/// Builds an `eth_estimateGas` request.
///
/// # Errors
///
/// Returns [`NodeError::InvalidRequest`] if the transaction cannot be serialized.
pub fn estimate_gas(tx: &TransactionRequest) -> Result<JsonRpcRequest, NodeError> {
    Ok(request("eth_estimateGas", vec![transaction_object(tx)?]))
}

/// Builds an `eth_call` request against the pending block.
///
/// # Errors
///
/// Returns [`NodeError::InvalidRequest`] if the transaction cannot be serialized.
pub fn eth_call(tx: &TransactionRequest) -> Result<JsonRpcRequest, NodeError> {
    Ok(request("eth_call", vec![transaction_object(tx)?, json!(PENDING_BLOCK)]))
}

/// ABI-encodes `balanceOf(owner)`.
#[must_use]
pub fn encode_balance_of(owner: Address) -> Bytes {
    let mut data = Vec::with_capacity(4 + 32);
    data.extend_from_slice(&BALANCE_OF_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(owner.as_slice());
    Bytes::from(data)
}

/// Builds the `eth_call` that reads `owner`'s balance of `token`.
///
/// # Errors
///
/// Returns [`NodeError::InvalidRequest`] if the asset has no contract address.
pub fn token_balance(owner: Address, token: &Asset) -> Result<JsonRpcRequest, NodeError> {
    let contract = token.contract_address.ok_or_else(|| {
        NodeError::InvalidRequest(format!("asset {} has no contract address", token.ticker))
    })?;
    eth_call(&TransactionRequest::default().to(contract).data(encode_balance_of(owner)))
}
