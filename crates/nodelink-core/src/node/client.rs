use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt, sync::Arc};

use crate::{
    node::{
        models::{TokenBalanceResult, TransactionReceipt, TransactionRecord, TransactionRequest},
        requests,
        transport::{build_transport, EndpointEnvironment, Transport},
        NodeError,
    },
    types::{Asset, JsonRpcRequest, JsonRpcResponse, NetworkDescriptor, NodeDescriptor, NodeType},
    utils::{parse_bytes, parse_hash, parse_quantity, parse_quantity_u64},
};

/// Description attached to batch entries whose response cannot be read as a balance.
pub const INVALID_SHAPE: &str = "Invalid object shape";

/// The query surface shared by a single node and the fallback aggregator.
#[async_trait]
pub trait ChainNode: Send + Sync {
    /// `true` if the endpoint answers `net_version`. Never fails.
    async fn ping(&self) -> bool;

    /// Issues `method` and returns its raw result.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, NodeError>;

    /// Issues several requests, returning one envelope per request in input order.
    async fn batch_call(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, NodeError>;

    async fn get_balance(&self, address: Address) -> Result<U256, NodeError>;

    /// Never fails: failures yield a zero balance with an error description.
    async fn get_token_balance(&self, address: Address, token: &Asset) -> TokenBalanceResult;

    /// Never fails: yields exactly one entry per token, in input order.
    async fn get_token_balances(
        &self,
        address: Address,
        tokens: &[Asset],
    ) -> Vec<TokenBalanceResult>;

    /// Failures are reported as [`NodeError::GasEstimation`].
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, NodeError>;

    async fn get_transaction_by_hash(&self, hash: B256) -> Result<TransactionRecord, NodeError>;

    async fn get_transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, NodeError>;

    async fn get_current_block_number(&self) -> Result<u64, NodeError>;

    /// Broadcasts a signed transaction and returns its hash.
    async fn send_raw_transaction(&self, signed: &Bytes) -> Result<B256, NodeError>;

    async fn get_transaction_count(&self, address: Address) -> Result<u64, NodeError>;

    /// Executes `eth_call` and returns the raw return data.
    async fn send_call_request(&self, tx: &TransactionRequest) -> Result<Bytes, NodeError>;
}

/// Typed queries against one endpoint.
///
/// Holds no mutable state; cloning the transport handle is the only per-call cost.
#[derive(Clone)]
pub struct NodeClient {
    name: String,
    chain_id: u64,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClient")
            .field("name", &self.name)
            .field("chain_id", &self.chain_id)
            .field("transport", &self.transport)
            .finish()
    }
}

/// Unwraps a response envelope into its result.
///
/// A `null` result is treated as missing.
fn into_result(response: JsonRpcResponse) -> Result<Value, NodeError> {
    if let Some(error) = response.error {
        return Err(NodeError::Rpc { code: error.code, message: error.message });
    }
    match response.result {
        Some(Value::Null) | None => {
            Err(NodeError::MalformedResponse("response has no result".to_string()))
        }
        Some(result) => Ok(result),
    }
}

fn expect_str(value: &Value) -> Result<&str, NodeError> {
    value
        .as_str()
        .ok_or_else(|| NodeError::MalformedResponse(format!("expected hex string, got {value}")))
}

fn token_balance_from(response: JsonRpcResponse) -> Result<U256, NodeError> {
    let result = into_result(response)?;
    Ok(parse_quantity(expect_str(&result)?)?)
}

impl NodeClient {
    #[must_use]
    pub fn new(name: impl Into<String>, chain_id: u64, transport: Arc<dyn Transport>) -> Self {
        Self { name: name.into(), chain_id, transport }
    }

    /// Builds a client for one node of `network`.
    ///
    /// # Errors
    ///
    /// Propagates endpoint construction failures from [`build_transport`].
    pub fn from_descriptor(
        network: &NetworkDescriptor,
        node: &NodeDescriptor,
        env: &EndpointEnvironment,
    ) -> Result<Self, NodeError> {
        let transport = build_transport(network, node, env)?;
        Ok(Self::new(node.name.clone(), network.chain_id, transport))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.transport.kind()
    }

    async fn request(&self, request: JsonRpcRequest) -> Result<Value, NodeError> {
        let response = self.transport.send(&request).await?;
        into_result(response)
    }

    /// Token balance lookup that reports failures instead of recovering from them.
    ///
    /// # Errors
    ///
    /// Any transport, RPC or shape failure.
    pub async fn fetch_token_balance(
        &self,
        address: Address,
        token: &Asset,
    ) -> Result<U256, NodeError> {
        let request = requests::token_balance(address, token)?;
        let response = self.transport.send(&request).await?;
        token_balance_from(response)
    }

    /// Batched token balance lookup.
    ///
    /// Per-entry failures become error entries; only a failure of the batch as a whole is
    /// returned as an error.
    ///
    /// # Errors
    ///
    /// Transport or envelope failures affecting the whole batch.
    pub async fn fetch_token_balances(
        &self,
        address: Address,
        tokens: &[Asset],
    ) -> Result<Vec<TokenBalanceResult>, NodeError> {
        let built: Vec<Result<JsonRpcRequest, NodeError>> =
            tokens.iter().map(|token| requests::token_balance(address, token)).collect();
        let batch: Vec<JsonRpcRequest> =
            built.iter().filter_map(|request| request.as_ref().ok().cloned()).collect();

        let responses = if batch.is_empty() {
            Vec::new()
        } else {
            self.transport.send_batch(&batch).await?
        };
        let mut responses = responses.into_iter();

        Ok(built
            .into_iter()
            .map(|request| match request {
                Err(err) => TokenBalanceResult::failed(err.to_string()),
                Ok(_) => match responses.next().map(token_balance_from) {
                    Some(Ok(balance)) => TokenBalanceResult::ok(balance),
                    Some(Err(_)) | None => TokenBalanceResult::failed(INVALID_SHAPE),
                },
            })
            .collect())
    }

    /// Verifies the endpoint serves the configured chain.
    ///
    /// # Errors
    ///
    /// [`NodeError::ChainIdMismatch`] when the endpoint reports another chain, or any
    /// failure of the `eth_chainId` call itself.
    pub async fn check_chain_id(&self) -> Result<(), NodeError> {
        let result = self.request(requests::chain_id()).await?;
        let actual = parse_quantity_u64(expect_str(&result)?)?;
        if actual == self.chain_id {
            Ok(())
        } else {
            Err(NodeError::ChainIdMismatch { expected: self.chain_id, actual })
        }
    }
}

/// Recovery applied to a failed token balance lookup.
pub(crate) fn recovered_token_balance(err: &NodeError) -> TokenBalanceResult {
    TokenBalanceResult::failed(format!("Caught error: {err}"))
}

#[async_trait]
impl ChainNode for NodeClient {
    async fn ping(&self) -> bool {
        match self.request(requests::net_version()).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(node = %self.name, error = %err, "ping failed");
                false
            }
        }
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, NodeError> {
        self.request(JsonRpcRequest::new(method, params, 1)).await
    }

    async fn batch_call(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, NodeError> {
        self.transport.send_batch(&requests).await
    }

    async fn get_balance(&self, address: Address) -> Result<U256, NodeError> {
        let result = self.request(requests::get_balance(address)).await?;
        Ok(parse_quantity(expect_str(&result)?)?)
    }

    async fn get_token_balance(&self, address: Address, token: &Asset) -> TokenBalanceResult {
        match self.fetch_token_balance(address, token).await {
            Ok(balance) => TokenBalanceResult::ok(balance),
            Err(err) => recovered_token_balance(&err),
        }
    }

    async fn get_token_balances(
        &self,
        address: Address,
        tokens: &[Asset],
    ) -> Vec<TokenBalanceResult> {
        match self.fetch_token_balances(address, tokens).await {
            Ok(balances) => balances,
            Err(err) => tokens.iter().map(|_| recovered_token_balance(&err)).collect(),
        }
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, NodeError> {
        let estimate = async {
            let result = self.request(requests::estimate_gas(tx)?).await?;
            Ok::<_, NodeError>(parse_quantity(expect_str(&result)?)?)
        };
        estimate.await.map_err(|err| match err {
            NodeError::Rpc { message, .. } => NodeError::GasEstimation(message),
            err @ NodeError::GasEstimation(_) => err,
            other => NodeError::GasEstimation(other.to_string()),
        })
    }

    async fn get_transaction_by_hash(&self, hash: B256) -> Result<TransactionRecord, NodeError> {
        let result = self.request(requests::get_transaction_by_hash(hash)).await?;
        TransactionRecord::try_from(result)
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, NodeError> {
        let result = self.request(requests::get_transaction_receipt(hash)).await?;
        TransactionReceipt::try_from(result)
    }

    async fn get_current_block_number(&self) -> Result<u64, NodeError> {
        let result = self.request(requests::block_number()).await?;
        Ok(parse_quantity_u64(expect_str(&result)?)?)
    }

    async fn send_raw_transaction(&self, signed: &Bytes) -> Result<B256, NodeError> {
        let result = self.request(requests::send_raw_transaction(signed)).await?;
        Ok(parse_hash(expect_str(&result)?)?)
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, NodeError> {
        let result = self.request(requests::get_transaction_count(address)).await?;
        Ok(parse_quantity_u64(expect_str(&result)?)?)
    }

    async fn send_call_request(&self, tx: &TransactionRequest) -> Result<Bytes, NodeError> {
        let result = self.request(requests::eth_call(tx)?).await?;
        Ok(parse_bytes(expect_str(&result)?)?)
    }
}
