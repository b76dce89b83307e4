//! Integration Tests for nodelink
//!
//! These tests drive the node client, transports and fallback chain against real HTTP
//! servers provided by mockito:
//!
//! - `node_client_tests`: typed queries over plain JSON-RPC, including basic auth
//! - `batch_tests`: batch renumbering, correlation and per-entry failures
//! - `fallback_tests`: ordered failover, selection and single-node clients
//! - `scanner_tests`: block explorer API mapping over HTTP GET
//! - `mock_infrastructure`: Reusable mock types for testing
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```
//!
//! Tests that start mock servers are marked `#[serial]` so their request counts stay
//! independent of one another.

#[cfg(test)]
mod batch_tests;

#[cfg(test)]
mod fallback_tests;

#[cfg(test)]
mod node_client_tests;

#[cfg(test)]
mod scanner_tests;

/// Mock infrastructure for testing
pub mod mock_infrastructure;
