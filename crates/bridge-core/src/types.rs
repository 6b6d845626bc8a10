//! JSON request and response models of the HTTP API.
//!
//! Every successful body carries `success: true` and a `message`; every failure
//! is an [`ErrorResponse`]. Field names are part of the wire contract.

use crate::reconcile::{CheckReport, ReconcileError, SetValueReceipt, SyncOutcome, SyncStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "besu-api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub message: String,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            message: "Service is running".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetValueResponse {
    pub value: String,
    pub success: bool,
    pub message: String,
}

impl GetValueResponse {
    #[must_use]
    pub fn new(value: String) -> Self {
        Self {
            value,
            success: true,
            message: "Value retrieved successfully from blockchain".to_string(),
        }
    }
}

/// Body of `POST /value`. `value` is required and must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueRequest {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueResponse {
    pub tx_hash: String,
    pub success: bool,
    pub message: String,
    pub value: String,
}

impl From<SetValueReceipt> for SetValueResponse {
    fn from(receipt: SetValueReceipt) -> Self {
        Self {
            tx_hash: receipt.tx_hash,
            success: true,
            message: "Transaction sent successfully".to_string(),
            value: receipt.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub blockchain_value: String,
    pub database_value: String,
    pub synced: bool,
    pub success: bool,
    pub message: String,
    /// `updated_at` of the record after the sync.
    pub synced_at: DateTime<Utc>,
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        let message = match outcome.status {
            SyncStatus::AlreadySynchronized => "Values are already synchronized",
            SyncStatus::Synchronized => "Value synchronized successfully from blockchain to database",
        };

        Self {
            blockchain_value: outcome.chain_value,
            database_value: outcome.record.value,
            synced: true,
            success: true,
            message: message.to_string(),
            synced_at: outcome.record.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub blockchain_value: String,
    pub database_value: String,
    #[serde(rename = "match")]
    pub matches: bool,
    pub success: bool,
    pub message: String,
}

impl From<CheckReport> for CheckResponse {
    fn from(report: CheckReport) -> Self {
        let message = if report.matches {
            "Database and blockchain values match"
        } else {
            "Database and blockchain values do not match"
        };

        Self {
            blockchain_value: report.chain_value,
            database_value: report.stored_value,
            matches: report.matches,
            success: true,
            message: message.to_string(),
        }
    }
}

/// Failure envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), error: error.into() }
    }
}

impl From<&ReconcileError> for ErrorResponse {
    fn from(err: &ReconcileError) -> Self {
        Self::new(err.summary(), err.detail())
    }
}
