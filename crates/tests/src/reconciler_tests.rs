//! Reconciler behavior over mock adapters.
//!
//! Covers the comparison rule (strict decimal-string equality), the
//! chain-wins sync direction, idempotence, and how each upstream failure is
//! classified.

use crate::mock_infrastructure::{mock_tx_hash, Harness, MemoryValueStore, MockChainClient};
use bridge_core::reconcile::{submit_value, ReconcileError, SyncStatus, UpstreamSide};
use num_bigint::{BigInt, BigUint};
use std::str::FromStr;

#[tokio::test]
async fn test_set_value_passes_value_unaltered() {
    let harness = Harness::with_values(0, "0");

    let receipt = harness.reconciler.set_value("500").await.unwrap();

    assert_eq!(receipt.value, "500");
    assert_eq!(receipt.tx_hash, format!("{:#x}", mock_tx_hash(0)));
    assert_eq!(receipt.tx_hash.len(), 66);
    assert_eq!(harness.chain.writes().await, vec![BigInt::from(500)]);
}

#[tokio::test]
async fn test_set_value_echoes_input_verbatim() {
    let harness = Harness::with_values(0, "0");

    let receipt = harness.reconciler.set_value("+0042").await.unwrap();

    assert_eq!(receipt.value, "+0042");
    assert_eq!(harness.chain.writes().await, vec![BigInt::from(42)]);
}

#[tokio::test]
async fn test_set_value_does_not_touch_store() {
    let harness = Harness::with_values(0, "0");

    harness.reconciler.set_value("7").await.unwrap();

    assert_eq!(harness.store.read_calls(), 0);
    assert_eq!(harness.store.write_calls(), 0);
    assert_eq!(harness.store.current().await.unwrap().value, "0");
}

#[tokio::test]
async fn test_submit_value_needs_only_chain() {
    let chain = MockChainClient::new(0);

    let receipt = submit_value(&chain, "500").await.unwrap();
    assert_eq!(receipt.value, "500");
    assert_eq!(receipt.tx_hash, format!("{:#x}", mock_tx_hash(0)));

    let err = submit_value(&chain, "abc").await.unwrap_err();
    assert!(matches!(err, ReconcileError::Validation { .. }));
    assert_eq!(chain.writes().await, vec![BigInt::from(500)]);
}

#[tokio::test]
async fn test_set_value_rejects_non_numeric_without_chain_call() {
    let harness = Harness::with_values(0, "0");

    for input in ["abc", "", "1.0", "0x1f", " 5"] {
        let err = harness.reconciler.set_value(input).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Validation { .. }), "input {input:?}");
        assert!(err.is_client_error());
    }

    assert_eq!(harness.chain.write_calls(), 0);
}

#[tokio::test]
async fn test_set_value_negative_fails_at_encoding() {
    let harness = Harness::with_values(0, "0");

    let err = harness.reconciler.set_value("-5").await.unwrap_err();

    assert!(matches!(err, ReconcileError::UpstreamWrite(_)));
    assert!(!err.is_client_error());
    assert_eq!(err.summary(), "Failed to set value on blockchain");
    assert_eq!(harness.chain.write_calls(), 1);
}

#[tokio::test]
async fn test_set_value_oversized_fails_at_encoding() {
    let harness = Harness::with_values(0, "0");
    let too_big = format!("1{}", "0".repeat(78));

    let err = harness.reconciler.set_value(&too_big).await.unwrap_err();

    assert!(matches!(err, ReconcileError::UpstreamWrite(_)));
}

#[tokio::test]
async fn test_set_value_broadcast_failure() {
    let harness = Harness::with_values(0, "0");
    harness.chain.fail_writes(true);

    let err = harness.reconciler.set_value("1").await.unwrap_err();

    assert!(matches!(err, ReconcileError::UpstreamWrite(_)));
    assert!(err.detail().contains("mock broadcast rejected"));
}

#[tokio::test]
async fn test_get_value_renders_decimal() {
    let harness = Harness::with_values(0, "0");
    let big = BigUint::from_str("340282366920938463463374607431768211456").unwrap();
    harness.chain.set_chain_value(big).await;

    let value = harness.reconciler.get_value().await.unwrap();

    assert_eq!(value, "340282366920938463463374607431768211456");
    assert_eq!(harness.store.read_calls(), 0);
}

#[tokio::test]
async fn test_get_value_chain_failure() {
    let harness = Harness::with_values(0, "0");
    harness.chain.fail_reads(true);

    let err = harness.reconciler.get_value().await.unwrap_err();

    assert!(matches!(err, ReconcileError::UpstreamRead { side: UpstreamSide::Chain, .. }));
}

#[tokio::test]
async fn test_check_matches_equal_values() {
    let harness = Harness::with_values(500, "500");

    let report = harness.reconciler.check().await.unwrap();

    assert!(report.matches);
    assert_eq!(report.chain_value, "500");
    assert_eq!(report.stored_value, "500");
}

#[tokio::test]
async fn test_check_is_strict_string_equality() {
    for stored in ["0500", "+500", "500 ", "500.0"] {
        let harness = Harness::with_values(500, stored);

        let report = harness.reconciler.check().await.unwrap();

        assert!(!report.matches, "stored {stored:?} should not match 500");
        assert_eq!(report.stored_value, stored);
    }
}

#[tokio::test]
async fn test_check_on_empty_store_materializes_zero() {
    let harness = Harness::new(MockChainClient::new(0), MemoryValueStore::empty());

    let report = harness.reconciler.check().await.unwrap();

    assert!(report.matches);
    assert_eq!(report.stored_value, "0");
    assert_eq!(harness.store.current().await.unwrap().value, "0");
}

#[tokio::test]
async fn test_check_is_read_only() {
    let harness = Harness::with_values(500, "300");

    let report = harness.reconciler.check().await.unwrap();

    assert!(!report.matches);
    assert_eq!(harness.store.write_calls(), 0);
    assert_eq!(harness.chain.write_calls(), 0);
    assert_eq!(harness.store.current().await.unwrap().value, "300");
}

#[tokio::test]
async fn test_check_chain_failure_skips_store() {
    let harness = Harness::with_values(500, "500");
    harness.chain.fail_reads(true);

    let err = harness.reconciler.check().await.unwrap_err();

    assert!(matches!(err, ReconcileError::UpstreamRead { side: UpstreamSide::Chain, .. }));
    assert_eq!(err.summary(), "Failed to retrieve value from blockchain");
    assert_eq!(harness.store.read_calls(), 0);
}

#[tokio::test]
async fn test_check_store_failure() {
    let harness = Harness::with_values(500, "500");
    harness.store.fail_reads(true);

    let err = harness.reconciler.check().await.unwrap_err();

    assert!(matches!(err, ReconcileError::UpstreamRead { side: UpstreamSide::Store, .. }));
    assert_eq!(err.summary(), "Failed to retrieve value from database");
}

#[tokio::test]
async fn test_sync_copies_chain_value() {
    let harness = Harness::with_values(500, "300");

    let outcome = harness.reconciler.sync().await.unwrap();

    assert_eq!(outcome.status, SyncStatus::Synchronized);
    assert_eq!(outcome.chain_value, "500");
    assert_eq!(outcome.record.value, "500");
    assert_eq!(harness.store.current().await.unwrap().value, "500");
    assert_eq!(harness.store.write_calls(), 1);
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let harness = Harness::with_values(500, "300");

    let first = harness.reconciler.sync().await.unwrap();
    let second = harness.reconciler.sync().await.unwrap();

    assert_eq!(first.status, SyncStatus::Synchronized);
    assert_eq!(second.status, SyncStatus::AlreadySynchronized);
    assert_eq!(second.record, first.record);
    assert_eq!(harness.store.write_calls(), 1);
}

#[tokio::test]
async fn test_sync_already_synchronized_returns_current_record() {
    let harness = Harness::with_values(42, "42");
    let before = harness.store.current().await.unwrap();

    let outcome = harness.reconciler.sync().await.unwrap();

    assert_eq!(outcome.status, SyncStatus::AlreadySynchronized);
    assert_eq!(outcome.record, before);
    assert_eq!(harness.store.write_calls(), 0);
}

#[tokio::test]
async fn test_sync_advances_timestamp() {
    let harness = Harness::with_values(500, "300");
    let before = harness.store.current().await.unwrap();

    let outcome = harness.reconciler.sync().await.unwrap();

    assert!(outcome.record.updated_at > before.updated_at);
    assert_eq!(outcome.record.id, before.id);
}

#[tokio::test]
async fn test_sync_normalizes_padded_store_value() {
    let harness = Harness::with_values(500, "0500");

    let outcome = harness.reconciler.sync().await.unwrap();

    assert_eq!(outcome.status, SyncStatus::Synchronized);
    assert_eq!(outcome.record.value, "500");
}

#[tokio::test]
async fn test_sync_discards_store_side_edits() {
    let harness = Harness::with_values(500, "500");
    harness.store.set_stored_value("999").await;

    let outcome = harness.reconciler.sync().await.unwrap();

    assert_eq!(outcome.record.value, "500");
    assert_eq!(harness.chain.write_calls(), 0);
    assert_eq!(harness.reconciler.get_value().await.unwrap(), "500");
}

#[tokio::test]
async fn test_sync_persist_failure_keeps_previous_record() {
    let harness = Harness::with_values(500, "300");
    harness.store.fail_writes(true);

    let err = harness.reconciler.sync().await.unwrap_err();

    assert!(matches!(err, ReconcileError::Persist(_)));
    assert_eq!(err.summary(), "Failed to update value in database");
    assert_eq!(harness.store.current().await.unwrap().value, "300");
}

#[tokio::test]
async fn test_sync_read_failures() {
    let harness = Harness::with_values(500, "300");
    harness.chain.fail_reads(true);
    let err = harness.reconciler.sync().await.unwrap_err();
    assert!(matches!(err, ReconcileError::UpstreamRead { side: UpstreamSide::Chain, .. }));

    harness.chain.fail_reads(false);
    harness.store.fail_reads(true);
    let err = harness.reconciler.sync().await.unwrap_err();
    assert!(matches!(err, ReconcileError::UpstreamRead { side: UpstreamSide::Store, .. }));
    assert_eq!(harness.store.write_calls(), 0);
}

#[tokio::test]
async fn test_set_then_sync_round_trip() {
    let harness = Harness::with_values(0, "0");

    harness.reconciler.set_value("123").await.unwrap();
    let before = harness.reconciler.check().await.unwrap();
    assert!(!before.matches);

    let outcome = harness.reconciler.sync().await.unwrap();
    assert_eq!(outcome.record.value, "123");

    let after = harness.reconciler.check().await.unwrap();
    assert!(after.matches);
}

#[tokio::test]
async fn test_concurrent_syncs_converge() {
    let harness = Harness::with_values(777, "1");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let reconciler = harness.reconciler.clone();
            tokio::spawn(async move { reconciler.sync().await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome.record.value, "777");
    }

    assert_eq!(harness.store.current().await.unwrap().value, "777");
}
