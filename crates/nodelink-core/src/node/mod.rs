//! Single-endpoint access: transports, the shared HTTP client and the typed node client.

pub mod client;
pub mod errors;
pub mod http_client;
pub mod models;
pub mod requests;
pub mod transport;

pub use client::{ChainNode, NodeClient, INVALID_SHAPE};
pub use errors::{NodeError, RpcErrorCategory, TransportError};
pub use http_client::{HttpClient, HttpClientConfig};
pub use models::{TokenBalanceResult, TransactionReceipt, TransactionRecord, TransactionRequest};
pub use transport::{
    build_transport, ApiKeys, EndpointEnvironment, EtherscanTransport, InjectedProvider,
    InjectedProviderError, InjectedTransport, JsonRpcTransport, Networkish, Transport,
};
