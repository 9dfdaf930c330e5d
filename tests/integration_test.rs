//! Live backend integration tests for the explorer API.
//!
//! These tests talk to a running explorer backend and require network access.
//! Run with: `cargo test --features integration-tests`

#![cfg(feature = "integration-tests")]

mod common;

use std::time::Instant;

use flowscope::classify::classify;
use flowscope::graph::{ExpansionOutcome, GraphScene, Size};
use flowscope::merge::merge_senders_receivers;

#[tokio::test]
async fn test_fetch_address_graph() {
    let client = common::test_client();
    let address = common::test_address();

    let graph = client
        .address_graph(&address)
        .await
        .expect("Failed to fetch address graph");
    assert_eq!(graph.center, address);
}

#[tokio::test]
async fn test_fetch_and_classify_transactions() {
    let client = common::test_client();
    let address = common::test_address();

    let page = client
        .address_transactions(&address, 5, 1)
        .await
        .expect("Failed to fetch transactions");
    assert!(page.list.len() <= 5);

    for tx in &page.list {
        assert!(tx.involves(&address), "{} does not involve {address}", tx.txid);
        let classification = classify(tx, &address);
        assert!(classification.amount >= rust_decimal::Decimal::ZERO);

        let merged = merge_senders_receivers(&tx.senders, &tx.receivers);
        let listed = merged.senders.len() + merged.receivers.len();
        assert!(listed <= tx.senders.len() + tx.receivers.len());
    }
}

#[tokio::test]
async fn test_fetch_transaction_detail_matches_list() {
    let client = common::test_client();
    let address = common::test_address();

    let page = client
        .address_transactions(&address, 1, 1)
        .await
        .expect("Failed to fetch transactions");
    let Some(first) = page.list.first() else {
        return;
    };

    let detail = client
        .transaction(&first.txid)
        .await
        .expect("Failed to fetch transaction detail");
    assert_eq!(detail.txid, first.txid);
    assert_eq!(detail.fee, first.fee);
}

#[tokio::test]
async fn test_fetch_address_detail() {
    let client = common::test_client();
    let address = common::test_address();

    let detail = client
        .address_detail(&address)
        .await
        .expect("Failed to fetch address detail");
    assert_eq!(detail.address, address);
    assert_eq!(detail.received - detail.sent, detail.balance);
}

#[tokio::test]
async fn test_expand_first_counterparty() {
    let client = common::test_client();
    let address = common::test_address();

    let graph = client
        .address_graph(&address)
        .await
        .expect("Failed to fetch address graph");
    let mut scene = GraphScene::new(&graph, Size::new(1280.0, 720.0));

    let Some(target) = scene
        .graph()
        .address_nodes()
        .find(|n| n.address.as_deref() != Some(address.as_str()))
        .map(|n| n.id.clone())
    else {
        return;
    };
    let p = scene.overlay().region(&target).unwrap().rect.center();
    let ticket = scene
        .click(p, Instant::now())
        .expect("Failed to start expansion");

    let result = client.address_graph(&ticket.address).await;
    let before = scene.graph().node_count();
    match scene.apply_expansion(&ticket, result) {
        ExpansionOutcome::Merged(stats) => {
            assert_eq!(scene.graph().node_count(), before + stats.nodes_added)
        }
        ExpansionOutcome::Failed(reason) => panic!("expansion failed: {reason}"),
    }
}
