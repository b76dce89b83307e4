use thiserror::Error;

use crate::utils::HexParseError;

/// Classification of JSON-RPC error objects returned by a node.
///
/// Used for log fields so operators can tell a reverted call from a misbehaving provider.
/// Every category still fails over: the fallback chain does not distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorCategory {
    /// Invalid request, method not found, invalid params.
    ClientError,
    /// Internal error or a server-defined error unrelated to execution.
    ProviderError,
    /// Rate limiting (-32005).
    RateLimit,
    /// The node could not parse the request (-32700).
    ParseError,
    /// Reverts, out of gas, nonce problems.
    ExecutionError,
}

impl RpcErrorCategory {
    /// Classifies a JSON-RPC error code and message.
    ///
    /// For the -32000 to -32099 range the message is inspected to separate execution
    /// failures from provider failures.
    #[must_use]
    pub fn from_code_and_message(code: i64, message: &str) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32602..=-32600 => Self::ClientError,
            -32603 => Self::ProviderError,
            -32005 => Self::RateLimit,
            -32099..=-32000 => {
                let message_lower = message.to_lowercase();
                if message_lower.contains("revert") ||
                    message_lower.contains("out of gas") ||
                    message_lower.contains("insufficient funds") ||
                    message_lower.contains("nonce too low") ||
                    message_lower.contains("gas required exceeds")
                {
                    Self::ExecutionError
                } else {
                    Self::ProviderError
                }
            }
            _ => Self::ProviderError,
        }
    }

    /// Returns a static string representation for log fields.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientError => "client_error",
            Self::ProviderError => "provider_error",
            Self::RateLimit => "rate_limit",
            Self::ParseError => "parse_error",
            Self::ExecutionError => "execution_error",
        }
    }
}

/// Failures below the JSON-RPC layer.
///
/// Messages never contain the endpoint URL or credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// Request or permit acquisition exceeded its deadline.
    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-2xx HTTP status with a truncated response body.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    #[error("concurrency limit reached")]
    ConcurrencyLimit,

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Errors produced by node clients, transports and the fallback aggregator.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum NodeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The node answered, but the payload did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The node returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Gas estimation failed; carries the underlying message only.
    #[error("{0}")]
    GasEstimation(String),

    /// Endpoint selection left nothing to call.
    #[error("no available endpoint for network {network}")]
    NoAvailableEndpoint { network: String },

    /// Every endpoint in the fallback chain failed.
    #[error("all {attempts} endpoints failed; last error: {last}")]
    AllEndpointsFailed { attempts: usize, last: Box<NodeError> },

    /// The endpoint type needs a named network (or an explicit url) it cannot derive.
    #[error("unsupported network {network} for {node_type} endpoint")]
    UnsupportedNetwork { network: String, node_type: String },

    /// The transport cannot serve this method.
    #[error("method {0} is not supported by this endpoint")]
    UnsupportedMethod(String),

    #[error("no injected provider is available")]
    InjectedProviderUnavailable,

    /// The endpoint reports a different chain than the network it was configured for.
    #[error("chain id mismatch: expected {expected}, endpoint reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    /// The request could not be built (bad descriptor, bad url, bad input).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl NodeError {
    /// Returns the RPC error category if this is an RPC error.
    #[must_use]
    pub fn rpc_category(&self) -> Option<RpcErrorCategory> {
        match self {
            Self::Rpc { code, message } => {
                Some(RpcErrorCategory::from_code_and_message(*code, message))
            }
            _ => None,
        }
    }

    /// Static label for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Rpc { .. } => "rpc",
            Self::GasEstimation(_) => "gas_estimation",
            Self::NoAvailableEndpoint { .. } => "no_available_endpoint",
            Self::AllEndpointsFailed { .. } => "all_endpoints_failed",
            Self::UnsupportedNetwork { .. } => "unsupported_network",
            Self::UnsupportedMethod(_) => "unsupported_method",
            Self::InjectedProviderUnavailable => "injected_provider_unavailable",
            Self::ChainIdMismatch { .. } => "chain_id_mismatch",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl From<HexParseError> for NodeError {
    fn from(err: HexParseError) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
