//! First-success fallback across an ordered list of node clients.
//!
//! Calls try each client strictly in sequence; the first success is returned unchanged
//! and no further endpoint is contacted. When every client fails, the call fails with
//! [`NodeError::AllEndpointsFailed`] carrying the last underlying error.
//!
//! ```text
//! caller ──► FallbackClient ──► A ──✗──► B ──✗──► C ──✓──► result
//! ```

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::Value;
use std::{future::Future, sync::Arc};

use crate::{
    network::select_endpoints,
    node::{
        client::recovered_token_balance, ChainNode, EndpointEnvironment, NodeClient, NodeError,
        TokenBalanceResult, TransactionReceipt, TransactionRecord, TransactionRequest,
    },
    types::{Asset, JsonRpcRequest, JsonRpcResponse, NetworkDescriptor},
};

/// One logical client over an ordered chain of endpoints.
#[derive(Debug, Clone)]
pub struct FallbackClient {
    network: String,
    clients: Vec<Arc<NodeClient>>,
}

impl FallbackClient {
    /// Wraps `clients` in their given order.
    ///
    /// # Errors
    ///
    /// [`NodeError::NoAvailableEndpoint`] if `clients` is empty.
    pub fn new(network: impl Into<String>, clients: Vec<NodeClient>) -> Result<Self, NodeError> {
        let network = network.into();
        if clients.is_empty() {
            return Err(NodeError::NoAvailableEndpoint { network });
        }
        Ok(Self { network, clients: clients.into_iter().map(Arc::new).collect() })
    }

    /// Selects the eligible nodes of `network` and builds the fallback chain over them.
    ///
    /// A selected node whose endpoint cannot be built (a missing API key, an invalid url)
    /// is logged and left out of the chain.
    ///
    /// # Errors
    ///
    /// [`NodeError::NoAvailableEndpoint`] if selection leaves nothing or no selected node
    /// can be built.
    pub fn for_network(
        network: &NetworkDescriptor,
        env: &EndpointEnvironment,
    ) -> Result<Self, NodeError> {
        let selected = select_endpoints(network, env.injected_available());
        let clients: Vec<NodeClient> = selected
            .iter()
            .filter_map(|node| match NodeClient::from_descriptor(network, node, env) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(
                        network = %network.id,
                        node = %node.name,
                        error_kind = e.kind(),
                        error = %e,
                        "skipping endpoint that cannot be built"
                    );
                    None
                }
            })
            .collect();

        tracing::info!(
            network = %network.id,
            selected = selected.len(),
            endpoints = clients.len(),
            "built fallback client"
        );

        Self::new(network.id.clone(), clients)
    }

    /// Client over the first configured node only: no selection filtering, no fallback.
    ///
    /// # Errors
    ///
    /// - [`NodeError::NoAvailableEndpoint`] if the network has no nodes
    /// - endpoint construction failures for that node
    pub fn create_single(
        network: &NetworkDescriptor,
        env: &EndpointEnvironment,
    ) -> Result<NodeClient, NodeError> {
        let node = network
            .nodes
            .first()
            .ok_or_else(|| NodeError::NoAvailableEndpoint { network: network.id.clone() })?;
        NodeClient::from_descriptor(network, node, env)
    }

    #[must_use]
    pub fn network(&self) -> &str {
        &self.network
    }

    #[must_use]
    pub fn clients(&self) -> &[Arc<NodeClient>] {
        &self.clients
    }

    /// Endpoint names in the order they are tried.
    #[must_use]
    pub fn endpoint_names(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.name()).collect()
    }

    /// Runs `op` against each client in turn until one succeeds.
    async fn first_success<T, F, Fut>(
        &self,
        operation: &'static str,
        op: F,
    ) -> Result<T, NodeError>
    where
        F: Fn(Arc<NodeClient>) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, NodeError>> + Send,
        T: Send,
    {
        let total = self.clients.len();
        let mut last_error: Option<NodeError> = None;

        for (attempt, client) in self.clients.iter().enumerate() {
            tracing::debug!(
                network = %self.network,
                endpoint = %client.name(),
                operation = operation,
                attempt = attempt + 1,
                total = total,
                "trying endpoint"
            );

            match op(Arc::clone(client)).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            network = %self.network,
                            endpoint = %client.name(),
                            operation = operation,
                            failovers = attempt,
                            "endpoint succeeded after failover"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => {
                    tracing::warn!(
                        network = %self.network,
                        endpoint = %client.name(),
                        operation = operation,
                        error_kind = err.kind(),
                        rpc_category = err.rpc_category().map(|c| c.as_str()),
                        error = %err,
                        "endpoint failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        tracing::error!(
            network = %self.network,
            operation = operation,
            attempts = total,
            "all endpoints failed"
        );

        Err(NodeError::AllEndpointsFailed {
            attempts: total,
            last: Box::new(last_error.unwrap_or_else(|| NodeError::NoAvailableEndpoint {
                network: self.network.clone(),
            })),
        })
    }

    /// Token balance lookup through the chain, reporting failures instead of recovering.
    ///
    /// # Errors
    ///
    /// [`NodeError::AllEndpointsFailed`] when no endpoint produced a balance.
    pub async fn fetch_token_balance(
        &self,
        address: Address,
        token: &Asset,
    ) -> Result<U256, NodeError> {
        self.first_success("token_balance", |client| {
            let token = token.clone();
            async move { client.fetch_token_balance(address, &token).await }
        })
        .await
    }

    /// Batched token balance lookup through the chain.
    ///
    /// Only whole-batch failures move on to the next endpoint.
    ///
    /// # Errors
    ///
    /// [`NodeError::AllEndpointsFailed`] when every endpoint failed the batch.
    pub async fn fetch_token_balances(
        &self,
        address: Address,
        tokens: &[Asset],
    ) -> Result<Vec<TokenBalanceResult>, NodeError> {
        self.first_success("token_balances", |client| {
            let tokens = tokens.to_vec();
            async move { client.fetch_token_balances(address, &tokens).await }
        })
        .await
    }
}

#[async_trait]
impl ChainNode for FallbackClient {
    async fn ping(&self) -> bool {
        for client in &self.clients {
            if client.ping().await {
                return true;
            }
            tracing::debug!(network = %self.network, endpoint = %client.name(), "ping failed");
        }
        false
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, NodeError> {
        self.first_success("call", |client| {
            let method = method.to_string();
            let params = params.clone();
            async move { client.call(&method, params).await }
        })
        .await
    }

    async fn batch_call(
        &self,
        requests: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, NodeError> {
        self.first_success("batch_call", |client| {
            let requests = requests.clone();
            async move { client.batch_call(requests).await }
        })
        .await
    }

    async fn get_balance(&self, address: Address) -> Result<U256, NodeError> {
        self.first_success("get_balance", |client| async move {
            client.get_balance(address).await
        })
        .await
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
        self.first_success("estimate_gas", |client| {
            let tx = tx.clone();
            async move { client.estimate_gas(&tx).await }
        })
        .await
    }

    async fn get_transaction_by_hash(&self, hash: B256) -> Result<TransactionRecord, NodeError> {
        self.first_success("get_transaction_by_hash", |client| async move {
            client.get_transaction_by_hash(hash).await
        })
        .await
    }

    async fn get_transaction_receipt(&self, hash: B256) -> Result<TransactionReceipt, NodeError> {
        self.first_success("get_transaction_receipt", |client| async move {
            client.get_transaction_receipt(hash).await
        })
        .await
    }

    async fn get_current_block_number(&self) -> Result<u64, NodeError> {
        self.first_success("get_current_block_number", |client| async move {
            client.get_current_block_number().await
        })
        .await
    }

    async fn send_raw_transaction(&self, signed: &Bytes) -> Result<B256, NodeError> {
        self.first_success("send_raw_transaction", |client| {
            let signed = signed.clone();
            async move { client.send_raw_transaction(&signed).await }
        })
        .await
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, NodeError> {
        self.first_success("get_transaction_count", |client| async move {
            client.get_transaction_count(address).await
        })
        .await
    }

    async fn send_call_request(&self, tx: &TransactionRequest) -> Result<Bytes, NodeError> {
        self.first_success("send_call_request", |client| {
            let tx = tx.clone();
            async move { client.send_call_request(&tx).await }
        })
        .await
    }
}
