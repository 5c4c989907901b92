use transaction_tracker::errors::NodeError;
use transaction_tracker::nodes::MockNodeApi;
use transaction_tracker::submitter::TransferSubmitter;
use transaction_tracker::types::TransactionId;
mod utils;

#[test]
fn submit_returns_transaction() -> Result<(), anyhow::Error> {
    let mut mock_node = MockNodeApi::new();
    let transfer = utils::transfer("defproducera", "defproducerb");

    let expected = transfer.clone();
    mock_node
        .expect_submit_transfer()
        .withf(move |t| *t == expected)
        .times(1)
        .returning(|_| Ok(TransactionId::new("a1b2c3")));

    let transaction = TransferSubmitter::new(&mock_node).submit(&transfer)?;

    assert_eq!(transaction.id, TransactionId::new("a1b2c3"));
    assert_eq!(transaction.from, "defproducera");
    assert_eq!(transaction.to, "defproducerb");
    assert_eq!(transaction.quantity.to_string(), "1.0000 SYS");

    Ok(())
}

#[test]
fn node_errors_become_submission_failed_without_retry() {
    let errors = vec![
        NodeError::Transport("connection reset".to_string()),
        NodeError::MalformedResponse("response has no transaction_id".to_string()),
        NodeError::Unauthorized("no signing key available".to_string()),
    ];

    for error in errors {
        let message = error.to_string();
        let mut mock_node = MockNodeApi::new();
        let mut error = Some(error);

        // Exactly one call: a failed transfer is never sent twice.
        mock_node
            .expect_submit_transfer()
            .times(1)
            .returning(move |_| Err(error.take().unwrap()));

        let result =
            TransferSubmitter::new(&mock_node).submit(&utils::transfer("alice", "bob"));

        let failure = result.unwrap_err();
        assert_eq!(failure.detail, message);
    }
}

#[test]
fn empty_transaction_id_is_a_failure() {
    let mut mock_node = MockNodeApi::new();
    mock_node
        .expect_submit_transfer()
        .times(1)
        .returning(|_| Ok(TransactionId::new("")));

    let result = TransferSubmitter::new(&mock_node).submit(&utils::transfer("alice", "bob"));

    assert!(result.is_err());
}

#[test]
fn invalid_transfers_are_not_sent() {
    let mut mock_node = MockNodeApi::new();
    mock_node.expect_submit_transfer().times(0);

    let submitter = TransferSubmitter::new(&mock_node);

    let to_self = utils::transfer("alice", "alice");
    assert!(submitter.submit(&to_self).is_err());

    let mut long_memo = utils::transfer("alice", "bob");
    long_memo.memo = "m".repeat(257);
    assert!(submitter.submit(&long_memo).is_err());

    let mut no_destination = utils::transfer("alice", "bob");
    no_destination.to = String::new();
    assert!(submitter.submit(&no_destination).is_err());
}
