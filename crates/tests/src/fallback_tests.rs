//! Integration tests for the fallback chain against several mock endpoints.

use crate::mock_infrastructure::{
    json_rpc_network, test_address, test_environment, test_token, RpcMockBuilder,
};
use alloy_primitives::U256;
use nodelink_core::{
    node::{ChainNode, NodeError},
    types::NodeDescriptor,
    FallbackClient,
};
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_fails_over_in_order_and_stops_at_first_success() {
    let mut a = RpcMockBuilder::new().await;
    a.mock_server_error();
    let mut b = RpcMockBuilder::new().await;
    b.mock_rpc_error("eth_blockNumber", -32005, "rate limited");
    let mut c = RpcMockBuilder::new().await;
    c.mock_block_number(500);
    let mut d = RpcMockBuilder::new().await;
    d.mock_block_number(999);

    let network =
        json_rpc_network(&[("a", a.url()), ("b", b.url()), ("c", c.url()), ("d", d.url())]);
    let client = FallbackClient::for_network(&network, &test_environment()).unwrap();
    assert_eq!(client.endpoint_names(), vec!["a", "b", "c", "d"]);

    assert_eq!(client.get_current_block_number().await.unwrap(), 500);
    assert!(b.verify_all_called());
    assert!(c.verify_all_called());
    assert_eq!(d.call_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_exhausted_chain_reports_last_error() {
    let mut a = RpcMockBuilder::new().await;
    a.mock_rpc_error("eth_getBalance", -32000, "header not found");
    let mut b = RpcMockBuilder::new().await;
    b.mock_rpc_error("eth_getBalance", -32005, "rate limited");

    let network = json_rpc_network(&[("a", a.url()), ("b", b.url())]);
    let client = FallbackClient::for_network(&network, &test_environment()).unwrap();

    match client.get_balance(test_address(0x11)).await {
        Err(NodeError::AllEndpointsFailed { attempts, last }) => {
            assert_eq!(attempts, 2);
            assert_eq!(*last, NodeError::Rpc { code: -32005, message: "rate limited".into() });
        }
        other => panic!("Expected AllEndpointsFailed, got {other:?}"),
    }
}

#[tokio::test]
#[serial]
async fn test_selected_node_is_the_only_endpoint() {
    let mut a = RpcMockBuilder::new().await;
    a.mock_block_number(1);
    let mut b = RpcMockBuilder::new().await;
    b.mock_block_number(2);

    let network = json_rpc_network(&[("a", a.url())])
        .with_node(NodeDescriptor::json_rpc("b", b.url()).disabled_by_default())
        .with_selected_node("b");
    let client = FallbackClient::for_network(&network, &test_environment()).unwrap();

    assert_eq!(client.endpoint_names(), vec!["b"]);
    assert_eq!(client.get_current_block_number().await.unwrap(), 2);
    assert_eq!(a.call_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_ping_succeeds_when_any_endpoint_answers() {
    let mut a = RpcMockBuilder::new().await;
    a.mock_server_error();
    let mut b = RpcMockBuilder::new().await;
    b.mock_method("net_version", &json!("1"));

    let network = json_rpc_network(&[("a", a.url()), ("b", b.url())]);
    let client = FallbackClient::for_network(&network, &test_environment()).unwrap();
    assert!(client.ping().await);

    let mut dead = RpcMockBuilder::new().await;
    dead.mock_server_error();
    let network = json_rpc_network(&[("dead", dead.url())]);
    let client = FallbackClient::for_network(&network, &test_environment()).unwrap();
    assert!(!client.ping().await);
}

#[tokio::test]
#[serial]
async fn test_token_balance_recovers_when_chain_is_exhausted() {
    let mut a = RpcMockBuilder::new().await;
    a.mock_rpc_error("eth_call", 3, "execution reverted");

    let network = json_rpc_network(&[("a", a.url())]);
    let client = FallbackClient::for_network(&network, &test_environment()).unwrap();

    let result = client.get_token_balance(test_address(0x11), &test_token("AAA", 0x0a)).await;
    assert_eq!(result.balance, U256::ZERO);
    assert!(result.error.as_deref().unwrap().starts_with("Caught error: "));
}

#[tokio::test]
#[serial]
async fn test_create_single_ignores_the_rest_of_the_network() {
    let mut a = RpcMockBuilder::new().await;
    a.mock_server_error();
    let mut b = RpcMockBuilder::new().await;
    b.mock_block_number(7);

    let network = json_rpc_network(&[("a", a.url()), ("b", b.url())]);
    let single = FallbackClient::create_single(&network, &test_environment()).unwrap();

    assert_eq!(single.name(), "a");
    assert!(single.get_current_block_number().await.is_err());
    assert_eq!(b.call_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_network_without_eligible_nodes() {
    let network = json_rpc_network(&[])
        .with_node(NodeDescriptor::json_rpc("off", "http://127.0.0.1:9").disabled_by_default());

    assert_eq!(
        FallbackClient::for_network(&network, &test_environment()).unwrap_err(),
        NodeError::NoAvailableEndpoint { network: "Ethereum".into() }
    );
}
