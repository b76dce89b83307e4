use async_trait::async_trait;
use std::{collections::HashMap, fmt, sync::Arc};

use super::Transport;
use crate::{
    node::{
        http_client::{host_of, HttpClient},
        NodeError,
    },
    types::{JsonRpcRequest, JsonRpcResponse, NodeAuth, NodeType, JSONRPC_VERSION_COW},
};

/// JSON-RPC 2.0 over HTTP POST.
///
/// Serves `JSON_RPC` nodes directly and `INFURA` nodes through the gateway URL. Batches go
/// out as a single JSON array and are correlated back to input order by id.
pub struct JsonRpcTransport {
    http: Arc<HttpClient>,
    url: String,
    chain_id: u64,
    auth: Option<NodeAuth>,
    kind: NodeType,
}

impl fmt::Debug for JsonRpcTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcTransport")
            .field("host", &host_of(&self.url))
            .field("chain_id", &self.chain_id)
            .field("kind", &self.kind)
            .field("authenticated", &self.auth.is_some())
            .finish()
    }
}

impl JsonRpcTransport {
    /// Creates a transport for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidRequest`] if the url is not an http(s) URL.
    pub fn new(
        http: Arc<HttpClient>,
        url: impl Into<String>,
        chain_id: u64,
    ) -> Result<Self, NodeError> {
        let url = url.into();
        let parsed = url::Url::parse(&url)
            .map_err(|e| NodeError::InvalidRequest(format!("invalid endpoint url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NodeError::InvalidRequest(format!(
                "unsupported url scheme: {}",
                parsed.scheme()
            )));
        }
        Ok(Self { http, url, chain_id, auth: None, kind: NodeType::JsonRpc })
    }

    /// Gateway URL for a named network. `homestead` is served as `mainnet`.
    #[must_use]
    pub fn infura_url(network: &str, api_key: &str) -> String {
        let host = if network == "homestead" { "mainnet" } else { network };
        format!("https://{host}.infura.io/v3/{api_key}")
    }

    #[must_use]
    pub fn with_auth(mut self, auth: NodeAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NodeType) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn post(&self, body: Vec<u8>) -> Result<bytes::Bytes, NodeError> {
        Ok(self.http.post_json(&self.url, bytes::Bytes::from(body), self.auth.as_ref()).await?)
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    fn kind(&self) -> NodeType {
        self.kind
    }

    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError> {
        tracing::debug!(
            host = %host_of(&self.url),
            method = %request.method,
            "sending request"
        );

        let body = serde_json::to_vec(request)
            .map_err(|e| NodeError::InvalidRequest(e.to_string()))?;
        let response_bytes = self.post(body).await?;

        serde_json::from_slice(&response_bytes).map_err(|e| {
            NodeError::MalformedResponse(format!("invalid JSON-RPC response: {e}"))
        })
    }

    async fn send_batch(
        &self,
        requests: &[JsonRpcRequest],
    ) -> Result<Vec<JsonRpcResponse>, NodeError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            host = %host_of(&self.url),
            batch_size = requests.len(),
            "sending batch request"
        );

        let numbered: Vec<JsonRpcRequest> = requests
            .iter()
            .zip(0u64..)
            .map(|(request, id)| request.clone().with_id(id))
            .collect();
        let body = serde_json::to_vec(&numbered)
            .map_err(|e| NodeError::InvalidRequest(e.to_string()))?;
        let response_bytes = self.post(body).await?;

        let value: serde_json::Value = serde_json::from_slice(&response_bytes).map_err(|e| {
            NodeError::MalformedResponse(format!("invalid JSON-RPC batch response: {e}"))
        })?;

        let entries = match value {
            serde_json::Value::Array(entries) => entries,
            // Nodes without batch support answer with a single error object
            serde_json::Value::Object(_) => {
                let single: JsonRpcResponse = serde_json::from_value(value).map_err(|e| {
                    NodeError::MalformedResponse(format!("invalid JSON-RPC response: {e}"))
                })?;
                return Err(match single.error {
                    Some(error) => NodeError::Rpc { code: error.code, message: error.message },
                    None => NodeError::MalformedResponse(
                        "expected array for batch response".to_string(),
                    ),
                });
            }
            other => {
                return Err(NodeError::MalformedResponse(format!(
                    "expected array for batch response, got {other}"
                )))
            }
        };

        let mut by_id: HashMap<u64, JsonRpcResponse> = HashMap::with_capacity(entries.len());
        for entry in entries {
            // Entries that cannot be read are left unmatched and surface per entry below
            let Ok(response) = serde_json::from_value::<JsonRpcResponse>(entry) else {
                continue;
            };
            if let Some(id) = response.id.as_u64() {
                by_id.insert(id, response);
            }
        }

        Ok(requests
            .iter()
            .zip(0u64..)
            .map(|(original, id)| {
                by_id.remove(&id).map_or_else(
                    || JsonRpcResponse {
                        jsonrpc: JSONRPC_VERSION_COW,
                        result: None,
                        error: None,
                        id: original.id.clone(),
                    },
                    |mut response| {
                        response.id = original.id.clone();
                        response
                    },
                )
            })
            .collect())
    }
}
