//! RPC Mock Builder for Ethereum JSON-RPC Testing
//!
//! Wraps mockito to provide Ethereum-specific response builders for common RPC methods.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// Builder for creating mock Ethereum RPC responses.
///
/// Uses mockito internally but provides Ethereum-specific helpers.
pub struct RpcMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

fn method_matcher(method: &str) -> Matcher {
    Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#))
}

impl RpcMockBuilder {
    /// Creates a new RPC mock builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Returns the block explorer API base URL served by this mock.
    #[must_use]
    pub fn scanner_url(&self) -> String {
        format!("{}/api", self.server.url())
    }

    /// Mocks a generic JSON-RPC method with custom response.
    pub fn mock_method(&mut self, method: &str, result: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": result
                })
                .to_string(),
            )
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks a JSON-RPC method that only answers when `header` carries `value`.
    pub fn mock_method_with_header(
        &mut self,
        method: &str,
        result: &Value,
        header: &'static str,
        value: &str,
    ) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_header(header, value)
            .match_body(method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string())
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks an `eth_blockNumber` request.
    pub fn mock_block_number(&mut self, block_number: u64) -> &mut Self {
        self.mock_method("eth_blockNumber", &json!(format!("0x{block_number:x}")))
    }

    /// Mocks an RPC error response.
    pub fn mock_rpc_error(&mut self, method: &str, code: i64, message: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": {
                        "code": code,
                        "message": message
                    }
                })
                .to_string(),
            )
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks a server error (500) for every POST.
    pub fn mock_server_error(&mut self) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .with_status(500)
            .with_body("Internal Server Error")
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks a batch request, answering with `entries` verbatim.
    ///
    /// Entries may be reordered or missing to exercise id correlation.
    pub fn mock_batch(&mut self, entries: &[Value]) -> &mut Self {
        self.mock_batch_body(&Value::Array(entries.to_vec()))
    }

    /// Mocks a batch request with an arbitrary reply body.
    pub fn mock_batch_body(&mut self, body: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Matcher::Regex(r"^\s*\[".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks a block explorer GET call matching every `(key, value)` query pair.
    pub fn mock_scanner(&mut self, query: &[(&str, &str)], body: &Value) -> &mut Self {
        let matchers = query
            .iter()
            .map(|(key, value)| Matcher::UrlEncoded((*key).to_string(), (*value).to_string()))
            .collect();
        let mock = self
            .server
            .mock("GET", "/api")
            .match_query(Matcher::AllOf(matchers))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create();

        self.mocks.push(mock);
        self
    }

    /// Returns a reference to the underlying mockito server for advanced mocking.
    pub fn get_server(&mut self) -> &mut mockito::ServerGuard {
        &mut self.server
    }

    /// Verifies all mocks were called.
    #[must_use]
    pub fn verify_all_called(&self) -> bool {
        self.mocks.iter().all(mockito::Mock::matched)
    }

    /// Gets the number of mocks that were called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.mocks.iter().filter(|m| m.matched()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rpc_mock_builder_creation() {
        let mock = RpcMockBuilder::new().await;
        assert!(!mock.url().is_empty());
        assert!(mock.scanner_url().ends_with("/api"));
    }

    #[tokio::test]
    async fn test_unused_mock_is_not_counted() {
        let mut mock = RpcMockBuilder::new().await;
        mock.mock_block_number(1);
        assert_eq!(mock.call_count(), 0);
        assert!(!mock.verify_all_called());
    }
}
