//! Reconciliation between the on-chain value and its stored projection.
//!
//! The chain is authoritative. [`Reconciler::check`] only compares,
//! [`Reconciler::sync`] copies the chain value into the store when the two
//! differ, and nothing ever flows from the store back to the chain.
//!
//! Values are compared as decimal strings, character for character. A stored
//! `"0500"` does not match an on-chain `500`; syncing rewrites it to `"500"`.
//!
//! ```text
//!   check / sync                 get_value           set_value
//!        │                           │                   │
//!   ┌────▼─────┐  ┌──────────┐  ┌────▼─────┐      ┌──────▼──────┐
//!   │ chain    │  │ store    │  │ chain    │      │ parse       │
//!   │ get()    │  │ latest   │  │ get()    │      │ decimal     │
//!   └────┬─────┘  └────┬─────┘  └──────────┘      └──────┬──────┘
//!        └──── == ─────┘                                 │
//!              │ (sync, mismatch)                 ┌──────▼──────┐
//!        ┌─────▼──────┐                           │ chain set() │
//!        │ store write│                           └─────────────┘
//!        └────────────┘
//! ```

use crate::{
    chain::{ChainClient, ChainError},
    store::{StoreError, StoredRecord, ValueStore},
};
use num_bigint::BigInt;
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;

/// Which upstream a read failed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamSide {
    Chain,
    Store,
}

impl fmt::Display for UpstreamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamSide::Chain => write!(f, "blockchain"),
            UpstreamSide::Store => write!(f, "database"),
        }
    }
}

/// Failures of the reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The submitted value is not a base-10 integer.
    #[error("invalid numeric value {input:?}")]
    Validation { input: String },

    /// Reading the chain value or the stored record failed.
    #[error("{side} read failed: {source}")]
    UpstreamRead {
        side: UpstreamSide,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Building, signing or broadcasting the `set` transaction failed.
    #[error("transaction submission failed: {0}")]
    UpstreamWrite(#[source] ChainError),

    /// Overwriting the stored record failed; the previous record is intact.
    #[error("store update failed: {0}")]
    Persist(#[source] StoreError),
}

impl ReconcileError {
    fn chain_read(err: ChainError) -> Self {
        Self::UpstreamRead { side: UpstreamSide::Chain, source: Box::new(err) }
    }

    fn store_read(err: StoreError) -> Self {
        Self::UpstreamRead { side: UpstreamSide::Store, source: Box::new(err) }
    }

    /// Human-readable summary used as the `message` of an error response.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Invalid numeric value",
            Self::UpstreamRead { side: UpstreamSide::Chain, .. } => {
                "Failed to retrieve value from blockchain"
            }
            Self::UpstreamRead { side: UpstreamSide::Store, .. } => {
                "Failed to retrieve value from database"
            }
            Self::UpstreamWrite(_) => "Failed to set value on blockchain",
            Self::Persist(_) => "Failed to update value in database",
        }
    }

    /// Underlying cause used as the `error` field of an error response.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Validation { .. } => "Failed to parse value as number".to_string(),
            Self::UpstreamRead { source, .. } => source.to_string(),
            Self::UpstreamWrite(err) => err.to_string(),
            Self::Persist(err) => err.to_string(),
        }
    }

    /// Whether the caller is at fault (HTTP 400) rather than an upstream (HTTP 500).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result of comparing the chain value with the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub chain_value: String,
    pub stored_value: String,
    pub matches: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The store already held the chain value and was left untouched.
    AlreadySynchronized,
    /// The store was overwritten with the chain value.
    Synchronized,
}

/// Result of a sync: the chain value and the record as it stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub chain_value: String,
    pub record: StoredRecord,
    pub status: SyncStatus,
}

/// A broadcast `set` transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetValueReceipt {
    /// Full `0x`-prefixed transaction hash.
    pub tx_hash: String,
    /// The value exactly as submitted.
    pub value: String,
}

/// Parses a base-10 integer with an optional leading sign.
///
/// Only ASCII digits are accepted after the sign; whitespace, digit separators
/// and an empty digit string are rejected. Range is not checked here, so
/// negative or oversized values are left for the chain adapter to refuse.
///
/// # Errors
///
/// Returns [`ReconcileError::Validation`] when `input` is not a decimal integer.
pub fn parse_decimal(input: &str) -> Result<BigInt, ReconcileError> {
    let invalid = || ReconcileError::Validation { input: input.to_string() };

    let digits = input.strip_prefix(&['+', '-'][..]).unwrap_or(input);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    BigInt::from_str(input).map_err(|_| invalid())
}

/// Validates `input` and broadcasts `set(input)` through `chain` alone.
///
/// This is the whole of the write path; it needs no store, so callers holding
/// only a chain client can use it directly.
///
/// # Errors
///
/// - [`ReconcileError::Validation`] if `input` is not a decimal integer; the
///   chain is not contacted
/// - [`ReconcileError::UpstreamWrite`] if encoding, signing or broadcast fails
pub async fn submit_value(
    chain: &dyn ChainClient,
    input: &str,
) -> Result<SetValueReceipt, ReconcileError> {
    let value = parse_decimal(input)?;

    let tx_hash = chain.write_value(&value).await.map_err(|e| {
        tracing::error!(error = %e, value = input, "failed to submit set transaction");
        ReconcileError::UpstreamWrite(e)
    })?;

    let tx_hash = format!("{tx_hash:#x}");
    tracing::info!(tx_hash = %tx_hash, value = input, "set transaction submitted");

    Ok(SetValueReceipt { tx_hash, value: input.to_string() })
}

/// Orchestrates the chain and store adapters.
///
/// Built once at startup and shared behind an `Arc`; it holds no state of its
/// own, so every call re-reads both upstreams.
pub struct Reconciler {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn ValueStore>,
}

impl Reconciler {
    pub fn new(chain: Arc<dyn ChainClient>, store: Arc<dyn ValueStore>) -> Self {
        Self { chain, store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn ValueStore> {
        &self.store
    }

    async fn read_chain(&self) -> Result<String, ReconcileError> {
        match self.chain.read_value().await {
            Ok(value) => Ok(value.to_string()),
            Err(e) => {
                tracing::error!(error = %e, "failed to read value from chain");
                Err(ReconcileError::chain_read(e))
            }
        }
    }

    async fn read_store(&self) -> Result<StoredRecord, ReconcileError> {
        match self.store.read_record().await {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::error!(error = %e, "failed to read value from store");
                Err(ReconcileError::store_read(e))
            }
        }
    }

    /// Current on-chain value as a decimal string.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::UpstreamRead`] if the chain call fails.
    pub async fn get_value(&self) -> Result<String, ReconcileError> {
        self.read_chain().await
    }

    /// Validates `input` and broadcasts a `set` transaction carrying it.
    ///
    /// The store is not touched; a later [`sync`](Self::sync) picks the value up
    /// once the transaction is mined. See [`submit_value`].
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::Validation`] if `input` is not a decimal integer; the
    ///   chain is not contacted
    /// - [`ReconcileError::UpstreamWrite`] if encoding, signing or broadcast fails
    pub async fn set_value(&self, input: &str) -> Result<SetValueReceipt, ReconcileError> {
        submit_value(self.chain.as_ref(), input).await
    }

    /// Compares the chain value with the stored record without modifying either.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::UpstreamRead`] naming the side that failed. The chain is
    /// read first; a chain failure means the store is not read.
    pub async fn check(&self) -> Result<CheckReport, ReconcileError> {
        let chain_value = self.read_chain().await?;
        let record = self.read_store().await?;

        let matches = record.value == chain_value;
        if matches {
            tracing::info!(chain_value = %chain_value, stored_value = %record.value, "values match");
        } else {
            tracing::warn!(chain_value = %chain_value, stored_value = %record.value, "values differ");
        }

        Ok(CheckReport { chain_value, stored_value: record.value, matches })
    }

    /// Copies the chain value into the store if the two differ.
    ///
    /// Idempotent: with no intervening chain write, repeated calls return the
    /// same record flagged [`SyncStatus::AlreadySynchronized`].
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::UpstreamRead`] if either read fails
    /// - [`ReconcileError::Persist`] if the store write fails
    pub async fn sync(&self) -> Result<SyncOutcome, ReconcileError> {
        let chain_value = self.read_chain().await?;
        let current = self.read_store().await?;

        if current.value == chain_value {
            tracing::info!(
                chain_value = %chain_value,
                stored_value = %current.value,
                "values already synchronized"
            );
            return Ok(SyncOutcome {
                chain_value,
                record: current,
                status: SyncStatus::AlreadySynchronized,
            });
        }

        let record = self.store.write_record(&chain_value).await.map_err(|e| {
            tracing::error!(error = %e, chain_value = %chain_value, "failed to update store");
            ReconcileError::Persist(e)
        })?;

        tracing::info!(
            chain_value = %chain_value,
            previous_value = %current.value,
            stored_value = %record.value,
            "store synchronized from chain"
        );

        Ok(SyncOutcome { chain_value, record, status: SyncStatus::Synchronized })
    }
}
