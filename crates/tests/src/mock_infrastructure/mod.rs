//! Mock Infrastructure for Testing nodelink
//!
//! This module provides reusable mock types for testing endpoint interactions
//! without requiring real network connections.
//!
//! ## Components
//!
//! - `RpcMockBuilder`: Wraps mockito to provide Ethereum-specific RPC mocking, including
//!   batch replies and block explorer GET endpoints
//! - Test helpers for environments, networks and chain data
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{json_rpc_network, test_environment, RpcMockBuilder};
//!
//! let mut mock = RpcMockBuilder::new().await;
//! mock.mock_block_number(100);
//!
//! let network = json_rpc_network(&[("primary", mock.url())]);
//! ```

pub mod rpc_mock;
pub mod test_helpers;

pub use rpc_mock::RpcMockBuilder;
pub use test_helpers::*;
