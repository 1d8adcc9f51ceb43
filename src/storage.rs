//! Persistence gateway: a generic document store over Postgres JSONB.
//!
//! Collections are logical names within a single `documents` table, so any
//! schema-shaped value can pass through the same gateway. Identifiers are
//! generated by the store at insert time and handed back separately from the
//! document body; they never leak into the body itself.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tokio::time::timeout;
use uuid::Uuid;

use crate::constants::STORE_TIMEOUT;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No store is configured, the connection is down, or an operation
    /// exceeded its deadline.
    #[error("document store is not available")]
    Unavailable,
    #[error("invalid store connection string: {0}")]
    Config(#[source] sqlx::Error),
    #[error("record is not serializable: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("document store write failed: {0}")]
    Write(#[source] sqlx::Error),
    #[error("document store read failed: {0}")]
    Read(#[source] sqlx::Error),
}

/// A stored document: the body with its identifier kept out-of-band.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub body: Map<String, Value>,
}

/// Handle to the document store. Cheap to clone; the underlying pool is safe
/// for concurrent use.
#[derive(Clone)]
pub struct DocumentStore {
    pool: PgPool,
}

impl DocumentStore {
    /// Connect to Postgres and make sure the documents table exists.
    ///
    /// `database` overrides the database name in the connection string when
    /// set. The table setup is idempotent.
    pub async fn connect(url: &str, database: Option<&str>) -> Result<Self, StoreError> {
        let mut options = PgConnectOptions::from_str(url).map_err(StoreError::Config)?;
        if let Some(name) = database {
            options = options.database(name);
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(STORE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(StoreError::Config)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                collection  TEXT NOT NULL,
                body        JSONB NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(StoreError::Write)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS documents_collection_created_at_idx
            ON documents (collection, created_at DESC)
            "#,
        )
        .execute(&pool)
        .await
        .map_err(StoreError::Write)?;

        Ok(Self { pool })
    }

    /// Insert a record into the named collection and return the identifier
    /// the store generated for it.
    pub async fn create_document<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<String, StoreError> {
        let body = serde_json::to_value(record)?;

        let insert = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO documents (collection, body)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(collection)
        .bind(&body)
        .fetch_one(&self.pool);

        let (id,) = timeout(STORE_TIMEOUT, insert)
            .await
            .map_err(|_| StoreError::Unavailable)?
            .map_err(StoreError::Write)?;

        Ok(id.to_string())
    }

    /// Fetch up to `limit` documents from the named collection whose bodies
    /// contain `filter` (empty filter matches everything), newest first.
    pub async fn get_documents(
        &self,
        collection: &str,
        filter: &Map<String, Value>,
        limit: i64,
    ) -> Result<Vec<Document>, StoreError> {
        let query = sqlx::query_as::<_, (Uuid, Value)>(
            r#"
            SELECT id, body FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY created_at DESC, id
            LIMIT $3
            "#,
        )
        .bind(collection)
        .bind(Value::Object(filter.clone()))
        .bind(limit)
        .fetch_all(&self.pool);

        let rows = timeout(STORE_TIMEOUT, query)
            .await
            .map_err(|_| StoreError::Unavailable)?
            .map_err(StoreError::Read)?;

        Ok(rows
            .into_iter()
            .map(|(id, body)| Document {
                id,
                body: match body {
                    Value::Object(map) => map,
                    // bodies are always written as objects
                    other => Map::from_iter([("value".to_string(), other)]),
                },
            })
            .collect())
    }

    /// Distinct collection names present in the store, for diagnostics.
    pub async fn list_collections(&self, limit: i64) -> Result<Vec<String>, StoreError> {
        let query = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT DISTINCT collection FROM documents
            ORDER BY collection
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool);

        let rows = timeout(STORE_TIMEOUT, query)
            .await
            .map_err(|_| StoreError::Unavailable)?
            .map_err(StoreError::Read)?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
