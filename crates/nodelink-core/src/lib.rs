//! # Nodelink Core
//!
//! Node access for wallet software: pick the endpoints that may serve a network, query them
//! through typed JSON-RPC calls, and fail over down the chain until one answers.
//!
//! - **[`types`]**: JSON-RPC envelopes, node/network descriptors and assets.
//!
//! - **[`node`]**: Per-endpoint transports (plain JSON-RPC, hosted gateway, block explorer API,
//!   injected wallet), the shared HTTP client and the typed [`NodeClient`].
//!
//! - **[`network`]**: Endpoint selection and derivation path lookup.
//!
//! - **[`fallback`]**: [`FallbackClient`], one logical client over an ordered list of nodes.
//!
//! - **[`store`]**: Overlaying user configuration onto defaults and gating store imports.
//!
//! - **[`config`]**: Layered application configuration.
//!
//! ## Request Flow
//!
//! ```text
//! NetworkDescriptor
//!       │
//!       ▼
//! ┌──────────────────┐
//! │ select_endpoints │ ─── nothing eligible ──► NoAvailableEndpoint
//! └────────┬─────────┘
//!          │ ordered nodes
//!          ▼
//! ┌──────────────────┐
//! │  FallbackClient  │
//! └────────┬─────────┘
//!          │ one attempt at a time
//!          ▼
//! ┌──────────────────┐
//! │    NodeClient    │ ─── failure ──► next node (or AllEndpointsFailed)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    Transport     │  JSON-RPC │ Infura │ Etherscan │ injected
//! └────────┬─────────┘
//!          │
//!          ▼
//!     typed result
//! ```

pub mod config;
pub mod fallback;
pub mod network;
pub mod node;
pub mod store;
pub mod types;
pub mod utils;

pub use fallback::FallbackClient;
pub use node::{ChainNode, NodeClient, NodeError};
