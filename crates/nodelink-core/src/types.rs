//! Core type definitions for JSON-RPC framing and endpoint configuration.
//!
//! # Type Categories
//!
//! ## JSON-RPC Protocol Types
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]: Protocol conformance
//!
//! ## Endpoint Configuration Types
//! - [`NetworkDescriptor`], [`NodeDescriptor`], [`NodeType`], [`NodeAuth`]: the per-network
//!   node list consumed by the endpoint selector
//! - [`DPath`], [`DPathFormat`]: derivation paths keyed by wallet format
//!
//! ## Persisted Store Types
//! - [`Asset`]: a native asset or token, also used as the token descriptor for balance
//!   lookups

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::BTreeMap};
use uuid::Uuid;

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for JSON-RPC version - zero allocation for static usage.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

fn default_jsonrpc() -> Cow<'static, str> {
    JSONRPC_VERSION_COW
}

/// JSON-RPC 2.0 request structure.
///
/// Parameters are always sent as a positional array; an empty array is sent for
/// parameterless methods such as `eth_blockNumber`.
///
/// # Example
///
/// ```
/// use nodelink_core::types::JsonRpcRequest;
/// use serde_json::json;
///
/// let request = JsonRpcRequest::new("eth_blockNumber", vec![], 1);
///
/// assert_eq!(request.method, "eth_blockNumber");
/// assert_eq!(request.id, json!(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub method: String,
    pub params: Vec<serde_json::Value>,
    pub id: serde_json::Value,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with zero allocation for the version string.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<serde_json::Value>, id: u64) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, method: method.into(), params, id: id.into() }
    }

    /// Returns a copy of this request carrying a different id.
    ///
    /// Batches renumber their members so responses can be correlated back to input order.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id.into();
        self
    }
}

/// JSON-RPC 2.0 response structure.
///
/// A response contains either a `result` (success) or an `error` (failure). Some providers
/// omit `jsonrpc` or `id` on error paths, so both default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default = "default_jsonrpc")]
    pub jsonrpc: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: serde_json::Value,
}

impl JsonRpcResponse {
    /// Creates a successful JSON-RPC response.
    #[must_use]
    pub fn success(result: serde_json::Value, id: serde_json::Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, result: Some(result), error: None, id }
    }

    /// Creates an error JSON-RPC response.
    #[must_use]
    pub fn error(code: i64, message: impl Into<String>, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object.
///
/// Standard error codes follow the JSON-RPC 2.0 convention:
///
/// - `-32700`: Parse error (invalid JSON)
/// - `-32600`: Invalid request (malformed JSON-RPC)
/// - `-32601`: Method not found
/// - `-32602`: Invalid params
/// - `-32603`: Internal error
/// - `-32000` to `-32099`: Server-defined errors (reverts, nonce errors, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// The kind of access point a node descriptor points at.
///
/// Each kind is served by a different transport: a scanner HTTP API, a hosted gateway, a
/// wallet-injected provider, or a plain JSON-RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Etherscan,
    Infura,
    #[serde(alias = "WEB3")]
    Web3Injected,
    JsonRpc,
}

impl NodeType {
    /// Returns a static label for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Etherscan => "etherscan",
            Self::Infura => "infura",
            Self::Web3Injected => "web3_injected",
            Self::JsonRpc => "json_rpc",
        }
    }

    /// Returns `true` when endpoints of this type need an explicit `url`.
    #[must_use]
    pub fn requires_url(&self) -> bool {
        matches!(self, Self::JsonRpc)
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP basic-auth credentials for a private JSON-RPC node.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for NodeAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeAuth")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// A single configured node within a network.
///
/// # Example
///
/// ```
/// use nodelink_core::types::{NodeDescriptor, NodeType};
///
/// let node = NodeDescriptor::json_rpc("local", "http://localhost:8545");
/// assert_eq!(node.node_type, NodeType::JsonRpc);
/// assert!(!node.is_disabled_by_default());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Unique within the owning network.
    pub name: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Endpoint URL. Required for `JSON_RPC`; overrides the derived endpoint for
    /// `ETHERSCAN`/`INFURA`; ignored for `WEB3_INJECTED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<NodeAuth>,

    /// Excluded from the fallback chain unless it is the network's selected node.
    /// Absent means enabled, and an absent override keeps the overridden value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_by_default: Option<bool>,
}

impl NodeDescriptor {
    /// Creates a descriptor of the given type with no url or credentials.
    #[must_use]
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self { name: name.into(), node_type, url: None, auth: None, disable_by_default: None }
    }

    /// Creates a plain JSON-RPC node descriptor.
    #[must_use]
    pub fn json_rpc(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { url: Some(url.into()), ..Self::new(name, NodeType::JsonRpc) }
    }

    #[must_use]
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(NodeAuth { username: username.into(), password: password.into() });
        self
    }

    #[must_use]
    pub fn disabled_by_default(mut self) -> Self {
        self.disable_by_default = Some(true);
        self
    }

    #[must_use]
    pub fn is_disabled_by_default(&self) -> bool {
        self.disable_by_default.unwrap_or(false)
    }
}

/// Wallet format a derivation path is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DPathFormat {
    LedgerNanoS,
    Trezor,
    MnemonicPhrase,
    KeystoreFile,
}

/// A labelled BIP-44 style derivation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DPath {
    pub label: String,
    pub value: String,
}

/// A blockchain network and the nodes that can serve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// Unique network identifier (e.g. `Ethereum`, `Goerli`).
    pub id: String,

    pub chain_id: u64,

    /// Nodes in preference order: the first listed node is tried first.
    #[serde(default)]
    pub nodes: Vec<NodeDescriptor>,

    /// Name of a node explicitly chosen by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dpaths: BTreeMap<DPathFormat, DPath>,
}

impl NetworkDescriptor {
    #[must_use]
    pub fn new(id: impl Into<String>, chain_id: u64) -> Self {
        Self { id: id.into(), chain_id, nodes: Vec::new(), selected_node: None, dpaths: BTreeMap::new() }
    }

    #[must_use]
    pub fn with_node(mut self, node: NodeDescriptor) -> Self {
        self.nodes.push(node);
        self
    }

    #[must_use]
    pub fn with_selected_node(mut self, name: impl Into<String>) -> Self {
        self.selected_node = Some(name.into());
        self
    }

    /// Returns the selected node name, treating an empty string as no selection.
    #[must_use]
    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref().filter(|name| !name.is_empty())
    }

    /// Looks up a node by name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// A native asset or token tracked by the wallet.
///
/// Assets with a `contract_address` are tokens and can be passed to token balance
/// lookups; assets without one are the network's base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub uuid: Uuid,
    pub name: String,
    pub ticker: String,
    pub network_id: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
}

impl Asset {
    /// Creates a token asset with a fresh uuid.
    #[must_use]
    pub fn token(
        name: impl Into<String>,
        ticker: impl Into<String>,
        network_id: impl Into<String>,
        contract_address: Address,
        decimals: u8,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            ticker: ticker.into(),
            network_id: network_id.into(),
            decimals,
            contract_address: Some(contract_address),
        }
    }

    #[must_use]
    pub fn is_token(&self) -> bool {
        self.contract_address.is_some()
    }
}
