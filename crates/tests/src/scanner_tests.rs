//! Integration tests for block explorer API access over HTTP GET.

use crate::mock_infrastructure::{
    test_address, test_environment_with_keys, RpcMockBuilder,
};
use alloy_primitives::U256;
use nodelink_core::{
    node::{ApiKeys, ChainNode, NodeClient, NodeError},
    types::{NetworkDescriptor, NodeDescriptor, NodeType},
    FallbackClient,
};
use serde_json::json;
use serial_test::serial;

fn scanner_node(url: String) -> NodeDescriptor {
    NodeDescriptor { url: Some(url), ..NodeDescriptor::new("scanner", NodeType::Etherscan) }
}

fn keys() -> ApiKeys {
    ApiKeys { etherscan: Some("test-key".to_string()), infura: None }
}

#[tokio::test]
#[serial]
async fn test_balance_uses_account_module_and_decimal_result() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_scanner(
        &[("module", "account"), ("action", "balance"), ("tag", "latest"), ("apikey", "test-key")],
        &json!({"status": "1", "message": "OK", "result": "1000000000000000000"}),
    );

    let network = NetworkDescriptor::new("Ethereum", 1).with_node(scanner_node(mock.scanner_url()));
    let client =
        NodeClient::from_descriptor(&network, &network.nodes[0], &test_environment_with_keys(keys()))
            .unwrap();

    assert_eq!(
        client.get_balance(test_address(0x11)).await.unwrap(),
        U256::from(1_000_000_000_000_000_000u64)
    );
    assert!(mock.verify_all_called());
}

#[tokio::test]
#[serial]
async fn test_proxy_module_block_number() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_scanner(
        &[("module", "proxy"), ("action", "eth_blockNumber")],
        &json!({"jsonrpc": "2.0", "id": 83, "result": "0xc36b29"}),
    );

    let network = NetworkDescriptor::new("Ethereum", 1).with_node(scanner_node(mock.scanner_url()));
    let client = NodeClient::from_descriptor(
        &network,
        &network.nodes[0],
        &test_environment_with_keys(ApiKeys::default()),
    )
    .unwrap();

    assert_eq!(client.get_current_block_number().await.unwrap(), 0x00c3_6b29);
}

#[tokio::test]
#[serial]
async fn test_chain_id_is_answered_without_http() {
    let mock = RpcMockBuilder::new().await;

    let network = NetworkDescriptor::new("Goerli", 5).with_node(scanner_node(mock.scanner_url()));
    let client =
        NodeClient::from_descriptor(&network, &network.nodes[0], &test_environment_with_keys(keys()))
            .unwrap();

    assert!(client.ping().await);
    assert!(client.check_chain_id().await.is_ok());
}

#[tokio::test]
#[serial]
async fn test_rejection_becomes_rpc_error_and_fails_over() {
    let mut scanner = RpcMockBuilder::new().await;
    scanner.mock_scanner(
        &[("module", "proxy"), ("action", "eth_getTransactionCount")],
        &json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"}),
    );
    let mut backup = RpcMockBuilder::new().await;
    backup.mock_method("eth_getTransactionCount", &json!("0x3"));

    let network = NetworkDescriptor::new("Ethereum", 1)
        .with_node(scanner_node(scanner.scanner_url()))
        .with_node(NodeDescriptor::json_rpc("backup", backup.url()));
    let env = test_environment_with_keys(keys());

    let scanner_only = NodeClient::from_descriptor(&network, &network.nodes[0], &env).unwrap();
    assert_eq!(
        scanner_only.get_transaction_count(test_address(0x11)).await,
        Err(NodeError::Rpc { code: -32000, message: "Invalid API Key".into() })
    );

    let client = FallbackClient::for_network(&network, &env).unwrap();
    assert_eq!(client.get_transaction_count(test_address(0x11)).await.unwrap(), 3);
}
