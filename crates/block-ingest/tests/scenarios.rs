//! End-to-end scenarios driven through the JSON dispatch entry point.

mod common;

use block_ingest::{ChainEvent, ChainStore, SyncStep};
use common::{chain_id, transaction, value_true, Node};
use serde_json::json;
use shared_types::{ErrorCode, ZERO_HASH};

#[tokio::test]
async fn test_append_three_headers() {
    let node = Node::new().with_chain(1, 100).await;

    for header in node.producers.chain(1, 3, ZERO_HASH) {
        assert_eq!(node.add_block(1, &header).await, value_true());
    }

    assert_eq!(node.heights(1).await, vec![1, 2, 3]);
    assert_eq!(node.bus.event_count(), 3);
    let sync = node.store.sync_info(chain_id(1)).unwrap();
    assert_eq!(sync.current_height, 3);
    assert_eq!(sync.step, SyncStep::TipAdvanced);
}

#[tokio::test]
async fn test_skipped_height_is_rejected() {
    let node = Node::new().with_chain(1, 100).await;
    let headers = node.producers.chain(1, 5, ZERO_HASH);
    for header in &headers[..3] {
        node.add_block(1, header).await;
    }

    let response = node.add_block(1, &headers[4]).await;

    assert_eq!(response.code, ErrorCode::Discontinuity);
    assert!(response.msg.is_some());
    assert_eq!(node.heights(1).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_roll_back_then_replace() {
    let node = Node::new().with_chain(1, 100).await;
    let headers = node.producers.chain(1, 3, ZERO_HASH);
    for header in &headers {
        node.add_block(1, header).await;
    }

    assert_eq!(node.roll_back(1, 2).await, value_true());
    assert_eq!(node.heights(1).await, vec![1]);
    assert_eq!(
        node.bus.get_events().last(),
        Some(&ChainEvent::RolledBack {
            chain_id: chain_id(1),
            target_height: 2,
            removed: 2,
            new_tip: Some(1),
        })
    );

    assert_eq!(node.add_block(1, &headers[1]).await, value_true());
    assert_eq!(node.heights(1).await, vec![1, 2]);
}

#[tokio::test]
async fn test_history_batches_on_empty_chain() {
    let node = Node::new().with_chain(1, 100).await;
    let headers = node.producers.chain(7, 6, ZERO_HASH);

    assert_eq!(node.receive_headers(1, &headers[3..]).await, value_true());
    assert_eq!(node.receive_headers(1, &headers[..3]).await, value_true());

    assert_eq!(node.heights(1).await, vec![7, 8, 9, 10, 11, 12]);
    let tip = node.service.tip(chain_id(1)).await.unwrap().unwrap();
    assert_eq!(tip.height, 12);
}

#[tokio::test]
async fn test_live_mode_rejects_clock_drift() {
    let node = Node::new().with_chain(1, 100).await;
    let block = node.producers.block(1, ZERO_HASH, vec![transaction(3)]);
    let drift = block_ingest::domain::DEFAULT_MAX_TIMESTAMP_DRIFT_SECS;
    node.clock.set(block.header.timestamp + 2 * drift);

    let live = node.valid_block(1, &block, 1).await;
    assert_eq!(live.code, ErrorCode::TimestampInvalid);

    let download = node.valid_block(1, &block, 0).await;
    assert!(download.is_success());
    assert_eq!(download.data, None);
}

#[tokio::test]
async fn test_unknown_chain_on_every_operation() {
    let node = Node::new().with_chain(1, 100).await;
    let block = node.producers.block(1, ZERO_HASH, vec![]);

    let responses = [
        node.add_block(999, &block.header).await,
        node.roll_back(999, 1).await,
        node.receive_headers(999, std::slice::from_ref(&block.header)).await,
        node.valid_block(999, &block, 0).await,
    ];

    for response in responses {
        assert_eq!(response.code, ErrorCode::ChainNotExist);
    }
}

#[tokio::test]
async fn test_missing_keys_and_unknown_method() {
    let node = Node::new().with_chain(1, 100).await;

    let missing = node.call("validBlock", json!({"chainId": 1, "download": 0})).await;
    assert_eq!(missing.code, ErrorCode::ParamError);

    let unknown = node.call("pruneChain", json!({"chainId": 1})).await;
    assert_eq!(unknown.code, ErrorCode::ParamError);
    assert!(unknown.msg.unwrap().contains("pruneChain"));
}

#[tokio::test]
async fn test_forged_signature_is_rejected() {
    let node = Node::new().with_chain(1, 100).await;
    let mut block = node.producers.block(1, ZERO_HASH, vec![]);
    block.header.signature[0] ^= 0xff;

    let response = node.valid_block(1, &block, 0).await;

    assert_eq!(response.code, ErrorCode::SignatureInvalid);
}

#[tokio::test]
async fn test_wrong_slot_producer_is_ineligible() {
    let node = Node::new().with_chain(1, 100).await;
    let mut block = node.producers.block(1, ZERO_HASH, vec![]);
    block.header.extension.packing_index = 2;
    block.header = block.header.seal();

    let response = node.valid_block(1, &block, 0).await;

    assert_eq!(response.code, ErrorCode::ProducerIneligible);
}
