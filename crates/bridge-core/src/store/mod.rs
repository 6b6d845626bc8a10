//! Store adapter: the off-chain record of the contract value.
//!
//! # Singleton Row
//!
//! The `contract_values` table holds exactly one live row. It is created and
//! seeded with `'0'` when the adapter connects, [`ValueStore::read_record`]
//! recreates it if it has gone missing, and [`ValueStore::write_record`] always
//! updates the most recent row instead of appending.
//!
//! ```sql
//! CREATE TABLE contract_values (
//!     id          SERIAL PRIMARY KEY,
//!     value       TEXT NOT NULL,
//!     updated_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP
//! );
//! ```
//!
//! # Backends
//!
//! - [`PostgresValueStore`]: production backend
//! - [`SqliteValueStore`]: local development and in-memory testing
//!
//! [`connect`] picks one from the configured [`DatabaseTarget`].

pub mod postgres;
pub mod sqlite;

pub use postgres::PostgresValueStore;
pub use sqlite::SqliteValueStore;

use crate::config::{DatabaseConfig, DatabaseTarget};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Value the store materializes when no record exists.
pub const INITIAL_VALUE: &str = "0";

/// The persisted projection of the on-chain value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    /// Decimal string as last written.
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Errors raised by store backends.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not be reached or the schema could not be prepared.
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// A statement failed.
    #[error("Database query failed: {0}")]
    Query(String),

    /// A row came back with an unexpected shape.
    #[error("Database row decode failed: {0}")]
    Decode(String),

    /// The connection string names a backend this build cannot talk to.
    #[error("Unsupported database backend: {0}")]
    UnsupportedBackend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
                StoreError::Decode(err.to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Persistence operations the reconciliation logic depends on.
#[async_trait]
pub trait ValueStore: Send + Sync {
    /// Returns the most recently updated record, creating one holding
    /// [`INITIAL_VALUE`] if the table is empty.
    async fn read_record(&self) -> Result<StoredRecord, StoreError>;

    /// Overwrites the singleton record with `value` and advances its timestamp.
    ///
    /// The update happens in a single transaction; a failure leaves the previous
    /// record untouched.
    async fn write_record(&self, value: &str) -> Result<StoredRecord, StoreError>;

    /// Releases pooled connections.
    async fn close(&self);
}

/// Connects to the configured backend and prepares the schema.
///
/// `postgres://`/`postgresql://` URLs and discrete connection fields select
/// [`PostgresValueStore`]; `sqlite:` URLs select [`SqliteValueStore`].
///
/// # Errors
///
/// - [`StoreError::UnsupportedBackend`] for an unknown URL scheme or missing target
/// - [`StoreError::Connection`] if the backend is unreachable or the schema fails
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn ValueStore>, StoreError> {
    let target = config.target().ok_or_else(|| {
        StoreError::UnsupportedBackend("no database url or host/name configured".to_string())
    })?;

    match &target {
        DatabaseTarget::Url(url) if is_postgres_url(url) => {
            let store = PostgresValueStore::connect(&target, config.max_connections).await?;
            Ok(Arc::new(store))
        }
        DatabaseTarget::Url(url) if url.starts_with("sqlite:") => {
            let store = SqliteValueStore::connect(url, config.max_connections).await?;
            Ok(Arc::new(store))
        }
        DatabaseTarget::Url(url) => Err(StoreError::UnsupportedBackend(scheme_of(url))),
        DatabaseTarget::Postgres { .. } => {
            let store = PostgresValueStore::connect(&target, config.max_connections).await?;
            Ok(Arc::new(store))
        }
    }
}

fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

/// Scheme portion of a URL, so credentials never reach error messages.
fn scheme_of(url: &str) -> String {
    url.split_once(':').map_or_else(|| "<unknown>".to_string(), |(scheme, _)| scheme.to_string())
}
