use async_trait::async_trait;
use serde_json::Value;
use std::{fmt, sync::Arc};
use thiserror::Error;

use super::Transport;
use crate::{
    node::NodeError,
    types::{JsonRpcRequest, JsonRpcResponse, NodeType},
};

/// Error returned by an injected provider, shaped like an EIP-1193 `ProviderRpcError`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("provider error {code}: {message}")]
pub struct InjectedProviderError {
    pub code: i64,
    pub message: String,
}

/// A wallet-supplied provider exposing EIP-1193 `request({ method, params })`.
///
/// The host application implements this for whatever bridge it has to the wallet.
#[async_trait]
pub trait InjectedProvider: Send + Sync + fmt::Debug {
    async fn request(&self, method: &str, params: Value) -> Result<Value, InjectedProviderError>;
}

/// Routes requests through an [`InjectedProvider`].
#[derive(Debug)]
pub struct InjectedTransport {
    provider: Arc<dyn InjectedProvider>,
    chain_id: u64,
}

impl InjectedTransport {
    #[must_use]
    pub fn new(provider: Arc<dyn InjectedProvider>, chain_id: u64) -> Self {
        Self { provider, chain_id }
    }

    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl Transport for InjectedTransport {
    fn kind(&self) -> NodeType {
        NodeType::Web3Injected
    }

    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError> {
        tracing::debug!(method = %request.method, "sending request to injected provider");

        let params = Value::Array(request.params.clone());
        match self.provider.request(&request.method, params).await {
            Ok(result) => Ok(JsonRpcResponse::success(result, request.id.clone())),
            Err(err) => Ok(JsonRpcResponse::error(err.code, err.message, request.id.clone())),
        }
    }
}
