use std::sync::Arc;
use tracing::debug;

use crate::database::warehouse::Warehouse;
use crate::error::AppError;
use crate::models::TimeSeriesPoint;

/// Read path for the account drill-down: 12 trailing weekly periods of raw
/// metrics, most recent first. No deltas or scoring here; the detail view
/// derives its own chart series.
pub struct HistoryService {
    warehouse: Arc<dyn Warehouse>,
}

impl HistoryService {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self { warehouse }
    }

    pub async fn get_history(&self, account_id: &str) -> Result<Vec<TimeSeriesPoint>, AppError> {
        let points = self.warehouse.account_history(account_id).await?;
        debug!("Loaded {} history points for account {}", points.len(), account_id);
        Ok(points)
    }
}
