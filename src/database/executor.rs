use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::error::AppError;

/// Typed query access to the warehouse with a fixed per-job timeout.
/// Pure I/O boundary: no business logic, no retries. A job that outlives
/// the timeout surfaces as a query failure like any other engine error.
#[derive(Clone)]
pub struct QueryExecutor {
    pool: PgPool,
    job_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(pool: PgPool, job_timeout: Duration) -> Self {
        Self { pool, job_timeout }
    }

    pub async fn fetch_all<T>(&self, query: &str) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.bounded(sqlx::query_as::<_, T>(query).fetch_all(&self.pool))
            .await
    }

    pub async fn fetch_all_with<T>(&self, query: &str, params: &[&str]) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut q = sqlx::query_as::<_, T>(query);
        for param in params {
            q = q.bind(*param);
        }
        self.bounded(q.fetch_all(&self.pool)).await
    }

    /// Fetch a nullable timestamp aggregate (e.g. `MAX(cache_updated_at)`).
    /// A query against a table that does not exist yet reads as an absent
    /// value rather than an error; every other failure propagates.
    pub async fn fetch_timestamp(&self, query: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        let fut = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(query).fetch_one(&self.pool);
        match timeout(self.job_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if is_undefined_table(&e) => {
                debug!("Timestamp query hit a missing table, treating as absent");
                Ok(None)
            }
            Ok(Err(e)) => Err(AppError::from(e)),
            Err(_) => Err(self.timeout_error()),
        }
    }

    /// Run a sequence of statements inside one transaction. Used for
    /// drop-and-recreate table rebuilds: if any statement fails the
    /// transaction rolls back and the previous table stays intact.
    pub async fn execute_replace(&self, statements: &[&str]) -> Result<(), AppError> {
        let fut = async {
            let mut tx = self.pool.begin().await?;
            for statement in statements {
                sqlx::query(statement).execute(&mut *tx).await?;
            }
            tx.commit().await?;
            Ok::<(), sqlx::Error>(())
        };
        self.bounded(fut).await
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(self.job_timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(self.timeout_error()),
        }
    }

    fn timeout_error(&self) -> AppError {
        AppError::QueryError(format!(
            "query exceeded {}s job timeout",
            self.job_timeout.as_secs()
        ))
    }
}

fn is_undefined_table(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("42P01"),
        _ => false,
    }
}
