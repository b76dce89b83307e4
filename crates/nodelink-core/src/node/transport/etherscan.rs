use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{fmt, sync::Arc};

use super::Transport;
use crate::{
    node::{
        http_client::{host_of, HttpClient},
        NodeError,
    },
    types::{JsonRpcRequest, JsonRpcResponse, NodeType},
    utils::{format_quantity, format_u256, parse_decimal},
};

/// Scanner HTTP GET API.
///
/// Most methods map onto `module=proxy&action=<method>`, which answers with a JSON-RPC
/// envelope. Balances use `module=account&action=balance`, which answers with a decimal
/// string that is re-encoded as a hex quantity. `net_version` and `eth_chainId` are answered
/// locally from the configured chain id.
pub struct EtherscanTransport {
    http: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
    chain_id: u64,
}

impl fmt::Debug for EtherscanTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtherscanTransport")
            .field("host", &host_of(&self.base_url))
            .field("chain_id", &self.chain_id)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

/// Envelope of the scanner's non-proxy modules.
#[derive(Debug, Deserialize)]
struct ScannerEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

impl EtherscanTransport {
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidRequest`] if `base_url` is not an http(s) URL.
    pub fn new(
        http: Arc<HttpClient>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        chain_id: u64,
    ) -> Result<Self, NodeError> {
        let base_url = base_url.into();
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| NodeError::InvalidRequest(format!("invalid scanner url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NodeError::InvalidRequest(format!(
                "unsupported url scheme: {}",
                parsed.scheme()
            )));
        }
        Ok(Self { http, base_url, api_key, chain_id })
    }

    /// API base URL for a named network.
    #[must_use]
    pub fn base_url(network: &str) -> String {
        if network == "homestead" {
            "https://api.etherscan.io/api".to_string()
        } else {
            format!("https://api-{network}.etherscan.io/api")
        }
    }

    /// Maps a JSON-RPC request onto scanner query parameters.
    ///
    /// Returns `None` for methods answered locally.
    fn query_for(
        &self,
        request: &JsonRpcRequest,
    ) -> Result<Option<Vec<(&'static str, String)>>, NodeError> {
        let method = request.method.as_str();
        let mut query: Vec<(&'static str, String)> = match method {
            "net_version" | "eth_chainId" => return Ok(None),
            "eth_getBalance" => vec![
                ("module", "account".to_string()),
                ("action", "balance".to_string()),
                ("address", string_param(request, 0)?),
                ("tag", "latest".to_string()),
            ],
            "eth_blockNumber" => proxy(method),
            "eth_getTransactionByHash" | "eth_getTransactionReceipt" => {
                let mut query = proxy(method);
                query.push(("txhash", string_param(request, 0)?));
                query
            }
            "eth_getTransactionCount" => {
                let mut query = proxy(method);
                query.push(("address", string_param(request, 0)?));
                query.push(("tag", block_tag(request, 1)));
                query
            }
            "eth_sendRawTransaction" => {
                let mut query = proxy(method);
                query.push(("hex", string_param(request, 0)?));
                query
            }
            "eth_call" | "eth_estimateGas" => {
                let mut query = proxy(method);
                let tx = request.params.first().and_then(Value::as_object).ok_or_else(|| {
                    NodeError::InvalidRequest(format!("{method} needs a transaction object"))
                })?;
                for field in ["to", "data", "value", "gas", "gasPrice"] {
                    if let Some(value) = tx.get(field).and_then(Value::as_str) {
                        query.push((field, value.to_string()));
                    }
                }
                if method == "eth_call" {
                    query.push(("tag", block_tag(request, 1)));
                }
                query
            }
            other => return Err(NodeError::UnsupportedMethod(other.to_string())),
        };

        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }
        Ok(Some(query))
    }

    fn local_response(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = if request.method == "eth_chainId" {
            json!(format_quantity(self.chain_id))
        } else {
            json!(self.chain_id.to_string())
        };
        JsonRpcResponse::success(result, request.id.clone())
    }

    fn decode_account_balance(
        &self,
        body: &[u8],
        id: Value,
    ) -> Result<JsonRpcResponse, NodeError> {
        let envelope: ScannerEnvelope = serde_json::from_slice(body).map_err(|e| {
            NodeError::MalformedResponse(format!("invalid scanner response: {e}"))
        })?;
        if envelope.status != "1" {
            let detail = envelope.result.as_str().unwrap_or(&envelope.message).to_string();
            return Ok(JsonRpcResponse::error(-32000, detail, id));
        }
        let decimal = envelope.result.as_str().ok_or_else(|| {
            NodeError::MalformedResponse("scanner balance is not a string".to_string())
        })?;
        let balance = parse_decimal(decimal)?;
        Ok(JsonRpcResponse::success(json!(format_u256(balance)), id))
    }

    fn decode_proxy(body: &[u8], id: Value) -> Result<JsonRpcResponse, NodeError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            NodeError::MalformedResponse(format!("invalid scanner response: {e}"))
        })?;

        // Rejections (bad key, rate limit) come back in the non-proxy envelope
        if let Ok(envelope) = serde_json::from_value::<ScannerEnvelope>(value.clone()) {
            if envelope.status == "0" {
                let detail = envelope.result.as_str().unwrap_or(&envelope.message).to_string();
                return Ok(JsonRpcResponse::error(-32000, detail, id));
            }
        }

        let mut response: JsonRpcResponse = serde_json::from_value(value).map_err(|e| {
            NodeError::MalformedResponse(format!("invalid scanner response: {e}"))
        })?;
        response.id = id;
        Ok(response)
    }
}

fn proxy(method: &str) -> Vec<(&'static str, String)> {
    vec![("module", "proxy".to_string()), ("action", method.to_string())]
}

fn string_param(request: &JsonRpcRequest, index: usize) -> Result<String, NodeError> {
    request
        .params
        .get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            NodeError::InvalidRequest(format!(
                "{} needs a string parameter at {index}",
                request.method
            ))
        })
}

/// The scanner does not serve the pending block; it is read as `latest`.
fn block_tag(request: &JsonRpcRequest, index: usize) -> String {
    match request.params.get(index).and_then(Value::as_str) {
        None | Some("pending") => "latest".to_string(),
        Some(tag) => tag.to_string(),
    }
}

#[async_trait]
impl Transport for EtherscanTransport {
    fn kind(&self) -> NodeType {
        NodeType::Etherscan
    }

    async fn send(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse, NodeError> {
        let Some(query) = self.query_for(request)? else {
            return Ok(self.local_response(request));
        };

        tracing::debug!(
            host = %host_of(&self.base_url),
            method = %request.method,
            "sending scanner request"
        );

        let body = self.http.get_query(&self.base_url, &query).await?;

        if request.method == "eth_getBalance" {
            self.decode_account_balance(&body, request.id.clone())
        } else {
            Self::decode_proxy(&body, request.id.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn transport(api_key: Option<&str>) -> EtherscanTransport {
        EtherscanTransport::new(
            Arc::new(HttpClient::new().unwrap()),
            "https://api.etherscan.io/api",
            api_key.map(str::to_string),
            1,
        )
        .unwrap()
    }

    fn lookup<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_base_urls() {
        assert_eq!(EtherscanTransport::base_url("homestead"), "https://api.etherscan.io/api");
        assert_eq!(EtherscanTransport::base_url("goerli"), "https://api-goerli.etherscan.io/api");
    }

    #[test]
    fn test_balance_uses_account_module() {
        let request =
            JsonRpcRequest::new("eth_getBalance", vec![json!("0xabc"), json!("pending")], 1);
        let query = transport(Some("key")).query_for(&request).unwrap().unwrap();
        assert_eq!(lookup(&query, "module"), Some("account"));
        assert_eq!(lookup(&query, "action"), Some("balance"));
        assert_eq!(lookup(&query, "tag"), Some("latest"));
        assert_eq!(lookup(&query, "apikey"), Some("key"));
    }

    #[test]
    fn test_call_flattens_transaction_fields() {
        let request = JsonRpcRequest::new(
            "eth_call",
            vec![json!({"to": "0x01", "data": "0x70a08231"}), json!("pending")],
            1,
        );
        let query = transport(None).query_for(&request).unwrap().unwrap();
        assert_eq!(lookup(&query, "module"), Some("proxy"));
        assert_eq!(lookup(&query, "action"), Some("eth_call"));
        assert_eq!(lookup(&query, "to"), Some("0x01"));
        assert_eq!(lookup(&query, "data"), Some("0x70a08231"));
        assert_eq!(lookup(&query, "apikey"), None);
    }

    #[test]
    fn test_unsupported_method() {
        let request = JsonRpcRequest::new("eth_getLogs", vec![], 1);
        assert!(matches!(
            transport(None).query_for(&request),
            Err(NodeError::UnsupportedMethod(m)) if m == "eth_getLogs"
        ));
    }

    #[tokio::test]
    async fn test_chain_identity_answered_locally() {
        let scanner = transport(None);
        let version = scanner.send(&JsonRpcRequest::new("net_version", vec![], 3)).await.unwrap();
        assert_eq!(version.result, Some(json!("1")));
        assert_eq!(version.id, json!(3));

        let chain = scanner.send(&JsonRpcRequest::new("eth_chainId", vec![], 4)).await.unwrap();
        assert_eq!(chain.result, Some(json!("0x1")));
    }

    #[test]
    fn test_account_balance_decimal_is_exact() {
        let body =
            br#"{"status":"1","message":"OK","result":"340282366920938463463374607431768211456"}"#;
        let response = transport(None).decode_account_balance(body, json!(1)).unwrap();
        let expected = format_u256(U256::from(1u8) << 128usize);
        assert_eq!(response.result, Some(json!(expected)));
    }

    #[test]
    fn test_rejection_becomes_rpc_error() {
        let body = br#"{"status":"0","message":"NOTOK","result":"Invalid API Key"}"#;
        let response = EtherscanTransport::decode_proxy(body, json!(1)).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.message, "Invalid API Key");

        let response = transport(None).decode_account_balance(body, json!(1)).unwrap();
        assert!(response.error.is_some());
    }

    #[test]
    fn test_proxy_envelope_passes_through() {
        let body = br#"{"jsonrpc":"2.0","id":83,"result":"0x10d4f"}"#;
        let response = EtherscanTransport::decode_proxy(body, json!(9)).unwrap();
        assert_eq!(response.result, Some(json!("0x10d4f")));
        assert_eq!(response.id, json!(9));
    }
}
