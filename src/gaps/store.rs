#[cfg(test)]
pub mod memory_store;

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use thiserror::Error;

use super::window::{BlockNumber, Window};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to resolve head block number")]
    Head(#[source] sqlx::Error),
    #[error("failed to count stored blocks in window {window}")]
    Count {
        window: Window,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to enumerate missing blocks in window {window}")]
    Enumerate {
        window: Window,
        #[source]
        source: sqlx::Error,
    },
}

/// Read-only access to the block numbers stored in the `blocks` table.
#[automock]
#[async_trait]
pub trait BlockNumbersStore {
    /// Highest stored block number, `None` when no blocks are stored.
    async fn head(&self) -> Result<Option<BlockNumber>, QueryError>;
    /// Distinct block numbers stored within the window.
    async fn count_present(&self, window: &Window) -> Result<i64, QueryError>;
    /// Numbers within the window that are not stored, ascending.
    async fn missing_numbers(&self, window: &Window) -> Result<Vec<BlockNumber>, QueryError>;
}

pub struct BlockNumbersStorePostgres {
    db_pool: PgPool,
}

impl BlockNumbersStorePostgres {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BlockNumbersStore for BlockNumbersStorePostgres {
    async fn head(&self) -> Result<Option<BlockNumber>, QueryError> {
        sqlx::query_scalar::<_, Option<i64>>(
            "
                SELECT MAX(number)::BIGINT FROM blocks
            ",
        )
        .fetch_one(&self.db_pool)
        .await
        .map_err(QueryError::Head)
    }

    async fn count_present(&self, window: &Window) -> Result<i64, QueryError> {
        sqlx::query_scalar::<_, i64>(
            "
                SELECT COUNT(DISTINCT number) FROM blocks
                WHERE number >= $1 AND number < $2
            ",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|source| QueryError::Count {
            window: *window,
            source,
        })
    }

    async fn missing_numbers(&self, window: &Window) -> Result<Vec<BlockNumber>, QueryError> {
        sqlx::query_scalar::<_, i64>(
            "
                SELECT series.number
                FROM generate_series($1::BIGINT, $2::BIGINT - 1) AS series(number)
                EXCEPT
                SELECT number::BIGINT FROM blocks
                WHERE number >= $1 AND number < $2
                ORDER BY number
            ",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|source| QueryError::Enumerate {
            window: *window,
            source,
        })
    }
}
