use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::database::warehouse::Warehouse;
use crate::error::AppError;
use crate::utils::time::{now_utc, time_diff_hours};

/// Reads against a cache table are never served from data older than this.
pub const MAX_CACHE_AGE_HOURS: i64 = 18;

/// Freshness policy over the two materialized cache tables. Rebuilds are
/// idempotent full-table replacements; the single-flight lock keeps
/// concurrent stale readers from stacking redundant rebuild jobs.
pub struct MetricsCache {
    warehouse: Arc<dyn Warehouse>,
    max_age: Duration,
    rebuild_lock: Mutex<()>,
}

impl MetricsCache {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self::with_max_age(warehouse, Duration::hours(MAX_CACHE_AGE_HOURS))
    }

    pub fn with_max_age(warehouse: Arc<dyn Warehouse>, max_age: Duration) -> Self {
        Self {
            warehouse,
            max_age,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Guarantee both cache tables are within the staleness window,
    /// rebuilding them if needed. A never-built cache reads as infinitely
    /// stale and triggers the first build rather than surfacing an error.
    pub async fn ensure_fresh(&self) -> Result<(), AppError> {
        if self.is_fresh().await? {
            return Ok(());
        }

        let _guard = self.rebuild_lock.lock().await;

        // Another caller may have finished a rebuild while we waited.
        if self.is_fresh().await? {
            return Ok(());
        }

        info!("Cache refresh triggered, rebuilding weekly and monthly caches");
        tokio::try_join!(
            self.warehouse.replace_weekly_cache(),
            self.warehouse.replace_monthly_cache(),
        )?;
        info!("Cache refresh complete");
        Ok(())
    }

    async fn is_fresh(&self) -> Result<bool, AppError> {
        match self.warehouse.cache_watermark().await? {
            Some(watermark) => {
                let now = now_utc();
                if is_stale(watermark, now, self.max_age) {
                    Ok(false)
                } else {
                    debug!(
                        "Cache fresh ({} hours old)",
                        time_diff_hours(watermark, now)
                    );
                    Ok(true)
                }
            }
            None => {
                debug!("No cache watermark found, cache needs building");
                Ok(false)
            }
        }
    }
}

/// A watermark exactly `max_age` old is still fresh; the boundary is
/// strictly greater-than.
pub fn is_stale(watermark: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    now.signed_duration_since(watermark) > max_age
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_exactly_at_limit_is_fresh() {
        let now = Utc::now();
        let max_age = Duration::hours(MAX_CACHE_AGE_HOURS);
        assert!(!is_stale(now - Duration::hours(18), now, max_age));
    }

    #[test]
    fn watermark_past_limit_is_stale() {
        let now = Utc::now();
        let max_age = Duration::hours(MAX_CACHE_AGE_HOURS);
        assert!(is_stale(now - Duration::hours(18) - Duration::seconds(1), now, max_age));
        assert!(is_stale(now - Duration::hours(19), now, max_age));
    }

    #[test]
    fn recent_watermark_is_fresh() {
        let now = Utc::now();
        let max_age = Duration::hours(MAX_CACHE_AGE_HOURS);
        assert!(!is_stale(now - Duration::hours(1), now, max_age));
        assert!(!is_stale(now, now, max_age));
    }
}
