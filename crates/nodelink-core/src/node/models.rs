//! Typed values produced from raw JSON-RPC results.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    node::NodeError,
    utils::{parse_address, parse_bytes, parse_hash, parse_quantity, parse_quantity_u64},
};

/// Outcome of a token balance lookup.
///
/// Lookups never fail: a failure yields a zero balance with `error` describing why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalanceResult {
    pub balance: U256,
    pub error: Option<String>,
}

impl TokenBalanceResult {
    #[must_use]
    pub fn ok(balance: U256) -> Self {
        Self { balance, error: None }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self { balance: U256::ZERO, error: Some(error.into()) }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Partial transaction used for `eth_call` and `eth_estimateGas`.
///
/// Absent fields are omitted from the wire object so the node fills its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U64>,
}

impl TransactionRequest {
    #[must_use]
    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    #[must_use]
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn data(mut self, data: Bytes) -> Self {
        self.data = Some(data);
        self
    }
}

/// A transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub hash: B256,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_price: U256,
    pub gas: U256,
    pub nonce: u64,
    pub input: Bytes,
    pub block_hash: Option<B256>,
    /// `None` while pending.
    pub block_number: Option<u64>,
    /// `None` while pending.
    pub transaction_index: Option<u64>,
}

impl TransactionRecord {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

/// A receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub transaction_index: Option<u64>,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    pub gas_used: U256,
    pub cumulative_gas_used: U256,
    /// `Some(1)` on success, `Some(0)` on failure, `None` for pre-Byzantium receipts.
    pub status: Option<u64>,
    /// Post-transaction state root, present on pre-Byzantium receipts only.
    pub root: Option<B256>,
}

impl TransactionReceipt {
    /// `Some(true)` when the receipt reports success; `None` when it carries no status.
    #[must_use]
    pub fn succeeded(&self) -> Option<bool> {
        self.status.map(|status| status == 1)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    hash: String,
    from: String,
    #[serde(default)]
    to: Option<String>,
    value: String,
    gas_price: String,
    gas: String,
    nonce: String,
    #[serde(alias = "data")]
    input: String,
    #[serde(default)]
    block_hash: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    transaction_index: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_hash: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    transaction_index: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    contract_address: Option<String>,
    gas_used: String,
    cumulative_gas_used: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    root: Option<String>,
}

fn parse_object<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, NodeError> {
    if !value.is_object() {
        return Err(NodeError::MalformedResponse(format!("expected {what} object, got {value}")));
    }
    serde_json::from_value(value)
        .map_err(|e| NodeError::MalformedResponse(format!("invalid {what}: {e}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<Value> for TransactionRecord {
    type Error = NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let raw: RawTransaction = parse_object(value, "transaction")?;
        Ok(Self {
            hash: parse_hash(&raw.hash)?,
            from: parse_address(&raw.from)?,
            to: non_empty(raw.to).as_deref().map(parse_address).transpose()?,
            value: parse_quantity(&raw.value)?,
            gas_price: parse_quantity(&raw.gas_price)?,
            gas: parse_quantity(&raw.gas)?,
            nonce: parse_quantity_u64(&raw.nonce)?,
            input: parse_bytes(&raw.input)?,
            block_hash: non_empty(raw.block_hash).as_deref().map(parse_hash).transpose()?,
            block_number: non_empty(raw.block_number)
                .as_deref()
                .map(parse_quantity_u64)
                .transpose()?,
            transaction_index: non_empty(raw.transaction_index)
                .as_deref()
                .map(parse_quantity_u64)
                .transpose()?,
        })
    }
}

impl TryFrom<Value> for TransactionReceipt {
    type Error = NodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let raw: RawReceipt = parse_object(value, "receipt")?;
        Ok(Self {
            transaction_hash: parse_hash(&raw.transaction_hash)?,
            block_hash: non_empty(raw.block_hash).as_deref().map(parse_hash).transpose()?,
            block_number: non_empty(raw.block_number)
                .as_deref()
                .map(parse_quantity_u64)
                .transpose()?,
            transaction_index: non_empty(raw.transaction_index)
                .as_deref()
                .map(parse_quantity_u64)
                .transpose()?,
            from: non_empty(raw.from).as_deref().map(parse_address).transpose()?,
            to: non_empty(raw.to).as_deref().map(parse_address).transpose()?,
            contract_address: non_empty(raw.contract_address)
                .as_deref()
                .map(parse_address)
                .transpose()?,
            gas_used: parse_quantity(&raw.gas_used)?,
            cumulative_gas_used: parse_quantity(&raw.cumulative_gas_used)?,
            status: non_empty(raw.status).as_deref().map(parse_quantity_u64).transpose()?,
            root: non_empty(raw.root).as_deref().map(parse_hash).transpose()?,
        })
    }
}
