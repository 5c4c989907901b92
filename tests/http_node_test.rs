use mockito::Matcher;
use serde_json::json;
use std::net::TcpListener;
use std::time::Duration;
use transaction_tracker::constants::CONNECTION_ID_HEADER;
use transaction_tracker::errors::NodeError;
use transaction_tracker::nodes::http_node::HttpNode;
use transaction_tracker::nodes::NodeApi;
use transaction_tracker::types::{NodeTxStatus, TransactionId};
mod utils;

#[test]
fn send_transaction_returns_id() -> Result<(), anyhow::Error> {
    let mut server = mockito::Server::new();
    let node = HttpNode::new(&server.url())?;

    let mock = server
        .mock("POST", "/v2/chain/send_transaction")
        .match_header(CONNECTION_ID_HEADER, node.connection_id().to_string().as_str())
        .match_body(Matcher::PartialJson(json!({
            "from": "defproducera",
            "to": "defproducerb",
            "quantity": "1.0000 SYS",
            "authorization": "defproducera@active"
        })))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(r#"{"transaction_id":"6b1c3a"}"#)
        .create();

    let tx_id = node.submit_transfer(&utils::transfer("defproducera", "defproducerb"))?;

    assert_eq!(tx_id, TransactionId::new("6b1c3a"));
    mock.assert();

    Ok(())
}

#[test]
fn send_transaction_errors() -> Result<(), anyhow::Error> {
    let mut server = mockito::Server::new();
    let node = HttpNode::new(&server.url())?;
    let transfer = utils::transfer("defproducera", "defproducerb");

    let missing_id = server
        .mock("POST", "/v2/chain/send_transaction")
        .with_status(202)
        .with_body(r#"{"processed":true}"#)
        .create();
    assert!(matches!(
        node.submit_transfer(&transfer),
        Err(NodeError::MalformedResponse(_))
    ));
    missing_id.remove();

    let unauthorized = server
        .mock("POST", "/v2/chain/send_transaction")
        .with_status(401)
        .with_body("missing authority of defproducera")
        .create();
    assert!(matches!(
        node.submit_transfer(&transfer),
        Err(NodeError::Unauthorized(_))
    ));
    unauthorized.remove();

    server
        .mock("POST", "/v2/chain/send_transaction")
        .with_status(500)
        .with_body("overdrawn balance")
        .create();
    match node.submit_transfer(&transfer) {
        Err(NodeError::Rejected(message)) => assert_eq!(message, "500 overdrawn balance"),
        other => panic!("unexpected submission result: {other:?}"),
    }

    Ok(())
}

/// Registers the answer of the node to a wait request for `condition`.
fn wait_mock(
    server: &mut mockito::ServerGuard,
    condition: &str,
    status: usize,
    body: &str,
) -> mockito::Mock {
    server
        .mock("POST", "/v2/chain/wait_transaction")
        .match_body(Matcher::Json(
            json!({ "transaction_id": "6b1c3a", "condition": condition }),
        ))
        .with_status(status)
        .with_body(body)
        .create()
}

#[test]
fn finalized_transaction_status() -> Result<(), anyhow::Error> {
    let mut server = mockito::Server::new();
    let node = HttpNode::new(&server.url())?;

    let finalized = wait_mock(&mut server, "finalized", 201, r#"{"block_num":601}"#);
    let accepted = wait_mock(&mut server, "accepted", 202, r#"{"block_num":600}"#).expect(0);

    assert_eq!(
        node.get_transaction_status(&TransactionId::new("6b1c3a"))?,
        NodeTxStatus::Finalized { block_num: 601 }
    );

    finalized.assert();
    accepted.assert();

    Ok(())
}

#[test]
fn accepted_transaction_status() -> Result<(), anyhow::Error> {
    let mut server = mockito::Server::new();
    let node = HttpNode::new(&server.url())?;
    let pending_wait = r#"{"code":403,"message":"pending wait on the transaction exists"}"#;

    let finalized = wait_mock(&mut server, "finalized", 403, pending_wait);
    let accepted = wait_mock(&mut server, "accepted", 202, r#"{"block_num":600}"#);

    assert_eq!(
        node.get_transaction_status(&TransactionId::new("6b1c3a"))?,
        NodeTxStatus::Accepted { block_num: 600 }
    );

    finalized.assert();
    accepted.assert();

    Ok(())
}

#[test]
fn pending_wait_means_not_reached_yet() -> Result<(), anyhow::Error> {
    let mut server = mockito::Server::new();
    let node = HttpNode::new(&server.url())?;
    let pending_wait = r#"{"code":403,"message":"pending wait on the transaction exists"}"#;

    wait_mock(&mut server, "finalized", 403, pending_wait);
    wait_mock(&mut server, "accepted", 403, pending_wait);

    assert_eq!(
        node.get_transaction_status(&TransactionId::new("6b1c3a"))?,
        NodeTxStatus::Pending
    );

    Ok(())
}

#[test]
fn untracked_and_expired_transaction_status() -> Result<(), anyhow::Error> {
    let mut server = mockito::Server::new();
    let node = HttpNode::new(&server.url())?;
    let tx_id = TransactionId::new("6b1c3a");

    let cases = [
        (404, NodeTxStatus::Untracked),
        (504, NodeTxStatus::Expired),
    ];

    for (status, expected) in cases {
        let finalized = wait_mock(&mut server, "finalized", status, r#"{"code":0}"#);
        let accepted = wait_mock(&mut server, "accepted", 202, r#"{"block_num":600}"#).expect(0);

        assert_eq!(node.get_transaction_status(&tx_id)?, expected);

        finalized.assert();
        accepted.assert();
        finalized.remove();
        accepted.remove();
    }

    Ok(())
}

#[test]
fn held_wait_request_is_pending() -> Result<(), anyhow::Error> {
    // Accepts connections and never answers, as a node holding the wait until the condition is met.
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let endpoint = format!("http://{}", listener.local_addr()?);
    let node = HttpNode::new(&endpoint)?.with_wait_probe(Duration::from_millis(100));

    assert_eq!(
        node.get_transaction_status(&TransactionId::new("6b1c3a"))?,
        NodeTxStatus::Pending
    );

    Ok(())
}

#[test]
fn malformed_transaction_status() -> Result<(), anyhow::Error> {
    let mut server = mockito::Server::new();
    let node = HttpNode::new(&server.url())?;
    let tx_id = TransactionId::new("6b1c3a");

    for body in [r#"{"processed":true}"#, "not json"] {
        let mock = wait_mock(&mut server, "finalized", 201, body);

        assert!(matches!(
            node.get_transaction_status(&tx_id),
            Err(NodeError::MalformedResponse(_))
        ));

        mock.remove();
    }

    let mock = wait_mock(&mut server, "finalized", 500, "chain database is locked");
    match node.get_transaction_status(&tx_id) {
        Err(NodeError::Rejected(message)) => assert!(message.starts_with("500 ")),
        other => panic!("unexpected status: {other:?}"),
    }
    mock.remove();

    Ok(())
}

#[test]
fn unreachable_node_is_a_transport_error() -> Result<(), anyhow::Error> {
    let node = HttpNode::new("http://127.0.0.1:1")?;

    assert!(matches!(
        node.get_transaction_status(&TransactionId::new("6b1c3a")),
        Err(NodeError::Transport(_))
    ));

    Ok(())
}
