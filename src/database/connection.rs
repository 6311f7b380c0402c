use sqlx::{PgPool, postgres::PgPoolOptions};
use crate::error::AppError;
use tracing::{info, error};
use std::time::Duration;

pub async fn establish_connection(warehouse_url: &str) -> Result<PgPool, AppError> {
    info!("Establishing warehouse connection");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(warehouse_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to warehouse: {}", e);
            AppError::QueryError(format!("Connection failed: {}", e))
        })?;

    info!("Warehouse connection established successfully");
    Ok(pool)
}

pub async fn test_connection(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::QueryError(format!("Connection test failed: {}", e)))?;

    info!("Warehouse connection test successful");
    Ok(())
}
