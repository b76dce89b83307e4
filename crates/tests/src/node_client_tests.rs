//! Integration tests for the single-endpoint `NodeClient` over HTTP JSON-RPC.

use crate::mock_infrastructure::{
    create_test_receipt, create_test_transaction, json_rpc_network, test_address,
    test_environment, test_hash, RpcMockBuilder,
};
use alloy_primitives::{Bytes, U256};
use nodelink_core::{
    node::{ChainNode, NodeClient, NodeError, TransactionRequest, TransportError},
    types::{NetworkDescriptor, NodeDescriptor},
    utils::parse_hash,
};
use serde_json::json;
use serial_test::serial;

fn client_for(network: &NetworkDescriptor) -> NodeClient {
    NodeClient::from_descriptor(network, &network.nodes[0], &test_environment())
        .expect("Failed to build node client")
}

#[tokio::test]
#[serial]
async fn test_block_number_and_balance() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_block_number(0x1234)
        .mock_method("eth_getBalance", &json!("0xde0b6b3a7640000"))
        .mock_method("eth_getTransactionCount", &json!("0x2a"));

    let client = client_for(&json_rpc_network(&[("primary", mock.url())]));

    assert_eq!(client.get_current_block_number().await.unwrap(), 0x1234);
    assert_eq!(
        client.get_balance(test_address(0x11)).await.unwrap(),
        U256::from(1_000_000_000_000_000_000u64)
    );
    assert_eq!(client.get_transaction_count(test_address(0x11)).await.unwrap(), 42);
    assert!(mock.verify_all_called());
}

#[tokio::test]
#[serial]
async fn test_transaction_and_receipt() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_method("eth_getTransactionByHash", &create_test_transaction(0xaa, None))
        .mock_method("eth_getTransactionReceipt", &create_test_receipt(0xaa, 100, true));

    let client = client_for(&json_rpc_network(&[("primary", mock.url())]));
    let hash = parse_hash(&test_hash(0xaa)).unwrap();

    let tx = client.get_transaction_by_hash(hash).await.unwrap();
    assert_eq!(tx.hash, hash);
    assert_eq!(tx.nonce, 7);
    assert!(tx.is_pending());

    let receipt = client.get_transaction_receipt(hash).await.unwrap();
    assert_eq!(receipt.block_number, Some(100));
    assert_eq!(receipt.succeeded(), Some(true));
    assert_eq!(receipt.gas_used, U256::from(21_000u64));
}

#[tokio::test]
#[serial]
async fn test_unknown_transaction_is_malformed() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_method("eth_getTransactionReceipt", &json!(null));

    let client = client_for(&json_rpc_network(&[("primary", mock.url())]));
    let hash = parse_hash(&test_hash(0x01)).unwrap();

    assert!(matches!(
        client.get_transaction_receipt(hash).await,
        Err(NodeError::MalformedResponse(_))
    ));
}

#[tokio::test]
#[serial]
async fn test_estimate_gas_and_failure_message() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_method("eth_estimateGas", &json!("0x5208"));

    let client = client_for(&json_rpc_network(&[("primary", mock.url())]));
    let tx = TransactionRequest::default().to(test_address(0x22)).value(U256::from(1u64));
    assert_eq!(client.estimate_gas(&tx).await.unwrap(), U256::from(21_000u64));

    let mut failing = RpcMockBuilder::new().await;
    failing.mock_rpc_error("eth_estimateGas", -32000, "insufficient funds for transfer");

    let client = client_for(&json_rpc_network(&[("primary", failing.url())]));
    match client.estimate_gas(&tx).await {
        Err(err @ NodeError::GasEstimation(_)) => {
            assert_eq!(err.to_string(), "insufficient funds for transfer");
        }
        other => panic!("Expected GasEstimation, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_send_raw_transaction_and_call() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_method("eth_sendRawTransaction", &json!(test_hash(0xcc)))
        .mock_method("eth_call", &json!("0x0000000000000000000000000000000000000000000000000000000000000005"));

    let client = client_for(&json_rpc_network(&[("primary", mock.url())]));

    let hash = client.send_raw_transaction(&Bytes::from(vec![0xf8, 0x6b])).await.unwrap();
    assert_eq!(hash, parse_hash(&test_hash(0xcc)).unwrap());

    let tx = TransactionRequest::default().to(test_address(0x33)).data(Bytes::from(vec![0x01]));
    let data = client.send_call_request(&tx).await.unwrap();
    assert_eq!(data.len(), 32);
    assert_eq!(data[31], 5);
}

#[tokio::test]
#[serial]
async fn test_basic_auth_header_is_sent() {
    let mut mock = RpcMockBuilder::new().await;
    // base64("alice:secret")
    mock.mock_method_with_header(
        "eth_blockNumber",
        &json!("0x10"),
        "authorization",
        "Basic YWxpY2U6c2VjcmV0",
    );

    let network = NetworkDescriptor::new("Ethereum", 1)
        .with_node(NodeDescriptor::json_rpc("private", mock.url()).with_auth("alice", "secret"));
    let client = client_for(&network);

    assert_eq!(client.get_current_block_number().await.unwrap(), 16);
    assert!(mock.verify_all_called());
}

#[tokio::test]
#[serial]
async fn test_ping_and_chain_id_check() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_method("net_version", &json!("1")).mock_method("eth_chainId", &json!("0x5"));

    let client = client_for(&json_rpc_network(&[("primary", mock.url())]));
    assert!(client.ping().await);
    assert_eq!(
        client.check_chain_id().await,
        Err(NodeError::ChainIdMismatch { expected: 1, actual: 5 })
    );
}

#[tokio::test]
#[serial]
async fn test_http_failure_surfaces_as_transport_error() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_server_error();

    let client = client_for(&json_rpc_network(&[("primary", mock.url())]));
    assert!(!client.ping().await);
    assert!(matches!(
        client.get_current_block_number().await,
        Err(NodeError::Transport(TransportError::HttpStatus(500, _)))
    ));
}
