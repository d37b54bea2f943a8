//! API endpoint integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use rpc_explorer::ParamValue;
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::{StubNode, build_test_router};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn error_code(body: &str) -> String {
    let value: Value = serde_json::from_str(body).unwrap();
    value["error"]["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_getblockcount_is_a_structured_call() {
    let node = Arc::new(StubNode::with_height(42));
    let app = build_test_router(node.clone(), &[]);

    let (status, body) = get(app, "/getblockcount").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "42");

    let invocations = node.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].0, "getblockcount");
    assert!(invocations[0].1.is_empty());
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn test_getblockhash_converts_height() {
    let node = Arc::new(StubNode::with_height(5));
    let app = build_test_router(node.clone(), &[]);

    let (status, body) = get(app, "/getblockhash?height=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, StubNode::hash_at(1).to_string());

    let (_, args) = &node.invocations()[0];
    assert_eq!(args.get("height"), Some(&ParamValue::Int(1)));
}

#[tokio::test]
async fn test_index_lists_blocks_in_height_order() {
    let node = Arc::new(StubNode::with_height(3));
    let app = build_test_router(node.clone(), &[]);

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);

    let positions: Vec<usize> = (0..3)
        .map(|h| body.find(&StubNode::hash_at(h).to_string()).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(body.contains("/getblockhash?height=2"));

    // one count plus one hash per height
    assert_eq!(node.invocations().len(), 4);
}

#[tokio::test]
async fn test_index_with_empty_chain() {
    let node = Arc::new(StubNode::with_height(0));
    let app = build_test_router(node, &[]);

    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No blocks"));
}

#[tokio::test]
async fn test_getblock_always_uses_fallback() {
    let node = Arc::new(StubNode::with_height(1));
    let app = build_test_router(node.clone(), &[]);

    let hash = "00000000000000000000000000000000000000000000000000000000000000ab";
    let (status, body) = get(app, &format!("/getblock?block_hash={hash}")).await;
    assert_eq!(status, StatusCode::OK);

    let reply: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(reply["command"], "getblock");
    assert!(node.invocations().is_empty());
    assert_eq!(node.calls(), [("getblock".to_string(), vec![json!(hash), json!(true)])]);
}

#[tokio::test]
async fn test_uncataloged_command_sends_only_the_mode_flag() {
    let node = Arc::new(StubNode::default());
    let app = build_test_router(node.clone(), &[]);

    let (status, _) = get(app, "/getpeerinfo?ignored=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node.calls(), [("getpeerinfo".to_string(), vec![json!(true)])]);
}

#[tokio::test]
async fn test_txid_is_converted_to_internal_order() {
    let node = Arc::new(StubNode::default());
    let app = build_test_router(node.clone(), &[]);

    let txid = format!("00{}", "11".repeat(31));
    let (status, body) = get(app, &format!("/getrawtransaction?txid={txid}&verbose=1")).await;
    assert_eq!(status, StatusCode::OK);

    let (command, args) = &node.invocations()[0];
    assert_eq!(command, "getrawtransaction");
    let mut expected = vec![0x11; 31];
    expected.push(0x00);
    assert_eq!(args.get("txid"), Some(&ParamValue::Bytes(expected)));
    assert_eq!(args.get("verbose"), Some(&ParamValue::Bool(true)));

    let reply: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(reply["txid"], txid);
}

#[tokio::test]
async fn test_default_is_used_when_parameter_is_omitted() {
    let node = Arc::new(StubNode::default());
    let app = build_test_router(node.clone(), &[]);

    let txid = "ab".repeat(32);
    let (status, _) = get(app, &format!("/getrawtransaction?txid={txid}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, args) = &node.invocations()[0];
    assert_eq!(args.get("verbose"), Some(&ParamValue::Bool(false)));
}

#[tokio::test]
async fn test_omitted_required_parameter_passes_null() {
    let node = Arc::new(StubNode::default());
    let app = build_test_router(node.clone(), &[]);

    let (status, body) = get(app, "/getrawtransaction").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "missing_argument");

    let (_, args) = &node.invocations()[0];
    assert_eq!(args.get("txid"), Some(&ParamValue::Null));
}

#[tokio::test]
async fn test_malformed_hex_is_rejected_before_the_node() {
    let node = Arc::new(StubNode::default());
    let app = build_test_router(node.clone(), &[]);

    let (status, body) = get(app, "/getrawtransaction?txid=zz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "conversion_failed");
    assert!(node.invocations().is_empty());
}

#[tokio::test]
async fn test_paths_outside_the_allow_list_are_not_found() {
    let node = Arc::new(StubNode::default());

    for path in ["/sendrawtransaction", "/stop", "/getnewaddress", "/getblockcount/extra"] {
        let app = build_test_router(node.clone(), &[]);
        let (status, body) = get(app, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(error_code(&body), "unknown_endpoint");
    }

    assert!(node.invocations().is_empty());
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn test_disabled_command_is_not_found() {
    let node = Arc::new(StubNode::with_height(1));
    let app = build_test_router(node.clone(), &["getblockcount".to_string()]);

    let (status, _) = get(app.clone(), "/getblockcount").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app, "/getbestblockhash").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_remote_failure_is_isolated_to_the_request() {
    let node = Arc::new(StubNode::with_height(7));
    let app = build_test_router(node.clone(), &[]);

    node.set_failing(true);
    let (status, body) = get(app.clone(), "/getblockcount").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error_code(&body), "remote_error");

    let (status, _) = get(app.clone(), "/").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    node.set_failing(false);
    let (status, body) = get(app, "/getblockcount").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "7");
}

#[tokio::test]
async fn test_repeated_requests_are_independent() {
    let node = Arc::new(StubNode::default());
    let app = build_test_router(node.clone(), &[]);

    let txid = "cd".repeat(32);
    get(app.clone(), &format!("/getrawtransaction?txid={txid}&verbose=true")).await;
    get(app, &format!("/getrawtransaction?txid={txid}")).await;

    let invocations = node.invocations();
    assert_eq!(invocations[0].1.get("verbose"), Some(&ParamValue::Bool(true)));
    assert_eq!(invocations[1].1.get("verbose"), Some(&ParamValue::Bool(false)));
}

#[tokio::test]
async fn test_rate_limit_rejects_over_budget() {
    use rpc_explorer::api::{self, GatewayState, rate_limit};

    let node = Arc::new(StubNode::with_height(1));
    let mut state = GatewayState::new(node, common::reference_catalog(&[]));
    state.rate_limiter = Some(rate_limit::limiter_per_minute(1));
    let app = api::router(Arc::new(state));

    let (status, _) = get(app.clone(), "/getblockcount").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(app, "/getblockcount").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
