//! Integration tests for batched requests: renumbering, correlation and per-entry failures.

use crate::mock_infrastructure::{
    batch_error, batch_result, json_rpc_network, test_address, test_environment, test_token,
    RpcMockBuilder,
};
use alloy_primitives::U256;
use nodelink_core::{
    node::{ChainNode, NodeClient, NodeError, INVALID_SHAPE},
    types::{Asset, JsonRpcRequest},
};
use serde_json::json;
use serial_test::serial;

fn balance_word(value: u64) -> String {
    format!("0x{value:064x}")
}

#[tokio::test]
#[serial]
async fn test_batch_call_correlates_out_of_order_replies() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_batch(&[
        batch_result(2, &json!("0x3")),
        batch_result(0, &json!("0x1")),
        batch_error(1, -32601, "method not found"),
    ]);

    let network = json_rpc_network(&[("primary", mock.url())]);
    let client = NodeClient::from_descriptor(&network, &network.nodes[0], &test_environment())
        .unwrap();

    // Caller ids are arbitrary and restored on the way out
    let requests = vec![
        JsonRpcRequest::new("eth_blockNumber", vec![], 77),
        JsonRpcRequest::new("eth_unknown", vec![], 77),
        JsonRpcRequest::new("net_version", vec![], 9),
    ];
    let responses = client.batch_call(requests).await.unwrap();

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0].result, Some(json!("0x1")));
    assert_eq!(responses[0].id, json!(77));
    assert_eq!(responses[1].error.as_ref().unwrap().code, -32601);
    assert_eq!(responses[2].result, Some(json!("0x3")));
    assert_eq!(responses[2].id, json!(9));
}

#[tokio::test]
#[serial]
async fn test_token_balances_keep_input_order_with_entry_failures() {
    let mut mock = RpcMockBuilder::new().await;
    // Entry 1 is missing, entry 3 is not a quantity
    mock.mock_batch(&[
        batch_result(3, &json!({"unexpected": true})),
        batch_result(2, &json!(balance_word(300))),
        batch_result(0, &json!(balance_word(100))),
    ]);

    let network = json_rpc_network(&[("primary", mock.url())]);
    let client = NodeClient::from_descriptor(&network, &network.nodes[0], &test_environment())
        .unwrap();

    let mut native = test_token("ETH", 0x00);
    native.contract_address = None;
    let tokens: Vec<Asset> = vec![
        test_token("AAA", 0x0a),
        test_token("BBB", 0x0b),
        native,
        test_token("CCC", 0x0c),
        test_token("DDD", 0x0d),
    ];

    let balances = client.get_token_balances(test_address(0x11), &tokens).await;

    assert_eq!(balances.len(), 5);
    assert_eq!(balances[0].balance, U256::from(100u64));
    assert!(balances[0].is_ok());
    assert_eq!(balances[1].error.as_deref(), Some(INVALID_SHAPE));
    assert_eq!(balances[1].balance, U256::ZERO);
    // Asset without a contract never reaches the wire
    assert!(balances[2].error.as_deref().unwrap().contains("no contract address"));
    assert_eq!(balances[3].balance, U256::from(300u64));
    assert_eq!(balances[4].error.as_deref(), Some(INVALID_SHAPE));
}

#[tokio::test]
#[serial]
async fn test_single_error_object_fails_the_batch() {
    let mut mock = RpcMockBuilder::new().await;
    mock.mock_batch_body(&batch_error(0, -32600, "batch requests are not supported"));

    let network = json_rpc_network(&[("primary", mock.url())]);
    let client = NodeClient::from_descriptor(&network, &network.nodes[0], &test_environment())
        .unwrap();

    let result = client
        .fetch_token_balances(test_address(0x11), &[test_token("AAA", 0x0a)])
        .await;
    assert_eq!(
        result,
        Err(NodeError::Rpc { code: -32600, message: "batch requests are not supported".into() })
    );
}
