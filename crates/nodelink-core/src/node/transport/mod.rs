//! Wire transports behind a node client.
//!
//! A [`Transport`] moves one JSON-RPC request (or a batch) to a single endpoint and hands
//! back the raw response envelope. Each [`NodeType`] has its own transport:
//!
//! - `JSON_RPC` and `INFURA`: [`JsonRpcTransport`] (HTTP POST, optional basic auth)
//! - `ETHERSCAN`: [`EtherscanTransport`] (scanner HTTP GET API)
//! - `WEB3_INJECTED`: [`InjectedTransport`] (host-supplied EIP-1193 provider)
//!
//! [`build_transport`] dispatches on the descriptor type.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use crate::{
    node::{http_client::HttpClient, NodeError},
    types::{JsonRpcRequest, JsonRpcResponse, NetworkDescriptor, NodeDescriptor, NodeType},
};

pub mod etherscan;
pub mod injected;
pub mod json_rpc;

pub use etherscan::EtherscanTransport;
pub use injected::{InjectedProvider, InjectedProviderError, InjectedTransport};
pub use json_rpc::JsonRpcTransport;

/// Moves JSON-RPC requests to one endpoint.
///
/// Implementations return the response envelope as received; a JSON-RPC error object is
/// a successful transport round trip. Only failures to obtain an envelope are errors.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    fn kind(&self) -> NodeType;

    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError>;

    /// Sends several requests, returning one envelope per request in input order.
    ///
    /// The default sends independent concurrent requests. Any transport failure fails the
    /// whole batch.
    async fn send_batch(
        &self,
        requests: &[JsonRpcRequest],
    ) -> Result<Vec<JsonRpcResponse>, NodeError> {
        join_all(requests.iter().map(|request| self.send(request)))
            .await
            .into_iter()
            .collect()
    }
}

/// API keys for hosted endpoint types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub etherscan: Option<String>,
    #[serde(default)]
    pub infura: Option<String>,
}

/// Everything endpoint construction needs beyond the descriptors themselves.
///
/// Passed explicitly so that nothing is read from process globals.
#[derive(Clone)]
pub struct EndpointEnvironment {
    pub http: Arc<HttpClient>,
    pub api_keys: ApiKeys,
    pub injected: Option<Arc<dyn InjectedProvider>>,
}

impl fmt::Debug for EndpointEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointEnvironment")
            .field("has_etherscan_key", &self.api_keys.etherscan.is_some())
            .field("has_infura_key", &self.api_keys.infura.is_some())
            .field("injected_available", &self.injected_available())
            .finish_non_exhaustive()
    }
}

impl EndpointEnvironment {
    #[must_use]
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http, api_keys: ApiKeys::default(), injected: None }
    }

    #[must_use]
    pub fn with_api_keys(mut self, api_keys: ApiKeys) -> Self {
        self.api_keys = api_keys;
        self
    }

    #[must_use]
    pub fn with_injected(mut self, provider: Arc<dyn InjectedProvider>) -> Self {
        self.injected = Some(provider);
        self
    }

    #[must_use]
    pub fn injected_available(&self) -> bool {
        self.injected.is_some()
    }
}

/// Network identity as understood by hosted providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Networkish {
    Named(&'static str),
    ChainId(u64),
}

const NAMED_NETWORKS: [&str; 4] = ["ropsten", "rinkeby", "kovan", "goerli"];

impl Networkish {
    /// Derives the provider network name: `Ethereum` is `homestead`, the well-known test
    /// networks use their lowercase name, anything else is identified by chain id.
    #[must_use]
    pub fn resolve(network_id: &str, chain_id: u64) -> Self {
        if network_id == "Ethereum" {
            return Self::Named("homestead");
        }
        let lower = network_id.to_lowercase();
        NAMED_NETWORKS
            .iter()
            .find(|name| **name == lower)
            .map_or(Self::ChainId(chain_id), |name| Self::Named(*name))
    }

    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Named(name) => Some(*name),
            Self::ChainId(_) => None,
        }
    }
}

impl fmt::Display for Networkish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::ChainId(id) => write!(f, "{id}"),
        }
    }
}

fn named_network(
    networkish: Networkish,
    node_type: NodeType,
) -> Result<&'static str, NodeError> {
    networkish.name().ok_or_else(|| NodeError::UnsupportedNetwork {
        network: networkish.to_string(),
        node_type: node_type.to_string(),
    })
}

/// Builds the transport for one node of `network`.
///
/// # Errors
///
/// - [`NodeError::UnsupportedNetwork`] for ETHERSCAN/INFURA on an unnamed network with no
///   url override
/// - [`NodeError::InjectedProviderUnavailable`] for WEB3_INJECTED without a provider
/// - [`NodeError::InvalidRequest`] for a JSON_RPC node without a url, an unparsable url or
///   a missing Infura key
pub fn build_transport(
    network: &NetworkDescriptor,
    node: &NodeDescriptor,
    env: &EndpointEnvironment,
) -> Result<Arc<dyn Transport>, NodeError> {
    let networkish = Networkish::resolve(&network.id, network.chain_id);
    let override_url = node.url.as_deref().filter(|url| !url.is_empty());

    let transport: Arc<dyn Transport> = match node.node_type {
        NodeType::Etherscan => {
            let base_url = match override_url {
                Some(url) => url.to_string(),
                None => EtherscanTransport::base_url(named_network(networkish, node.node_type)?),
            };
            Arc::new(EtherscanTransport::new(
                Arc::clone(&env.http),
                base_url,
                env.api_keys.etherscan.clone(),
                network.chain_id,
            )?)
        }
        NodeType::Infura => {
            let url = match override_url {
                Some(url) => url.to_string(),
                None => {
                    let name = named_network(networkish, node.node_type)?;
                    let key = env.api_keys.infura.as_deref().ok_or_else(|| {
                        NodeError::InvalidRequest("missing infura api key".to_string())
                    })?;
                    JsonRpcTransport::infura_url(name, key)
                }
            };
            Arc::new(
                JsonRpcTransport::new(Arc::clone(&env.http), url, network.chain_id)?
                    .with_kind(NodeType::Infura),
            )
        }
        NodeType::Web3Injected => {
            let provider = env.injected.clone().ok_or(NodeError::InjectedProviderUnavailable)?;
            Arc::new(InjectedTransport::new(provider, network.chain_id))
        }
        NodeType::JsonRpc => {
            let url = override_url.ok_or_else(|| {
                NodeError::InvalidRequest(format!("node {} has no url", node.name))
            })?;
            let transport = JsonRpcTransport::new(Arc::clone(&env.http), url, network.chain_id)?;
            Arc::new(match &node.auth {
                Some(auth) => transport.with_auth(auth.clone()),
                None => transport,
            })
        }
    };

    tracing::debug!(
        network = %network.id,
        node = %node.name,
        node_type = %node.node_type,
        networkish = %networkish,
        "built endpoint transport"
    );

    Ok(transport)
}
