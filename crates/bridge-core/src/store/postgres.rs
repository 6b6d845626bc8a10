use super::{StoreError, StoredRecord, ValueStore, INITIAL_VALUE};
use crate::config::DatabaseTarget;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgRow, PgSslMode},
    PgPool, Row,
};
use std::str::FromStr;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS contract_values (
        id SERIAL PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );

    INSERT INTO contract_values (value)
    SELECT '0'
    WHERE NOT EXISTS (SELECT 1 FROM contract_values);
";

const SELECT_LATEST: &str = r"
    SELECT id, value, updated_at
    FROM contract_values
    ORDER BY updated_at DESC NULLS LAST, id DESC
    LIMIT 1
";

const UPDATE_LATEST: &str = r"
    UPDATE contract_values
    SET value = $1, updated_at = CURRENT_TIMESTAMP
    WHERE id = (
        SELECT id FROM contract_values
        ORDER BY updated_at DESC NULLS LAST, id DESC
        LIMIT 1
    )
    RETURNING id, value, updated_at
";

const INSERT_RECORD: &str = r"
    INSERT INTO contract_values (value, updated_at)
    VALUES ($1, CURRENT_TIMESTAMP)
    RETURNING id, value, updated_at
";

/// `PostgreSQL` backed [`ValueStore`].
pub struct PostgresValueStore {
    pool: PgPool,
}

impl PostgresValueStore {
    /// Opens a pool against `target` and creates/seeds the table.
    ///
    /// Discrete targets connect with TLS disabled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is malformed, the server is
    /// unreachable, or the schema statements fail.
    pub async fn connect(target: &DatabaseTarget, max_connections: u32) -> Result<Self, StoreError> {
        let options = match target {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url)
                .map_err(|e| StoreError::Connection(format!("invalid postgres url: {e}")))?,
            DatabaseTarget::Postgres { host, port, user, password, name } => {
                PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .username(user)
                    .password(password)
                    .database(name)
                    .ssl_mode(PgSslMode::Disable)
            }
        };

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Connection(format!("schema setup failed: {e}")))?;

        Ok(Self { pool })
    }

    fn row_to_record(row: &PgRow) -> Result<StoredRecord, StoreError> {
        let id: i32 = row.try_get("id")?;
        let value: String = row.try_get("value")?;
        let updated_at: Option<NaiveDateTime> = row.try_get("updated_at")?;
        let updated_at = updated_at
            .ok_or_else(|| StoreError::Decode(format!("record {id} has no updated_at")))?;

        Ok(StoredRecord {
            id: i64::from(id),
            value,
            updated_at: DateTime::from_naive_utc_and_offset(updated_at, Utc),
        })
    }
}

#[async_trait]
impl ValueStore for PostgresValueStore {
    async fn read_record(&self) -> Result<StoredRecord, StoreError> {
        let row = sqlx::query(SELECT_LATEST).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => {
                tracing::info!("no stored record found, materializing initial value");
                self.write_record(INITIAL_VALUE).await
            }
        }
    }

    async fn write_record(&self, value: &str) -> Result<StoredRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(UPDATE_LATEST).bind(value).fetch_optional(&mut *tx).await?;
        let row = match updated {
            Some(row) => row,
            None => sqlx::query(INSERT_RECORD).bind(value).fetch_one(&mut *tx).await?,
        };
        let record = Self::row_to_record(&row)?;

        tx.commit().await?;
        Ok(record)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
