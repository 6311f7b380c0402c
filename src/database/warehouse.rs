use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::database::executor::QueryExecutor;
use crate::error::AppError;
use crate::models::{AccountMetricRow, Period, TimeSeriesPoint};

/// Warehouse operations the services depend on. Implemented against the
/// real warehouse by [`PgWarehouse`]; tests swap in an in-memory double.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Watermark of the last cache rebuild, read from the weekly cache table
    /// (representative for both granularities). `None` means the cache has
    /// never been built.
    async fn cache_watermark(&self) -> Result<Option<DateTime<Utc>>, AppError>;

    /// Replace the weekly cache table wholesale with current aggregates.
    async fn replace_weekly_cache(&self) -> Result<(), AppError>;

    /// Replace the monthly cache table wholesale with current aggregates.
    async fn replace_monthly_cache(&self) -> Result<(), AppError>;

    /// All cached rows for a granularity, name-sorted at the source.
    async fn load_cached_metrics(&self, period: Period)
        -> Result<Vec<AccountMetricRow>, AppError>;

    /// Up to 12 trailing weekly periods for one account, most recent first.
    async fn account_history(&self, account_id: &str) -> Result<Vec<TimeSeriesPoint>, AppError>;
}

const WATERMARK_QUERY: &str =
    "SELECT MAX(cache_updated_at) FROM weekly_metrics_cache";

const WEEKLY_CACHE_QUERY: &str = r#"
    CREATE TABLE weekly_metrics_cache AS
    SELECT
        a.id AS account_id,
        a.name AS account_name,
        COALESCE(o.owner_name, 'Unassigned') AS csm_owner,
        a.launched_at,
        COALESCE(spend_cur.total_spend, 0) AS total_spend,
        COALESCE(text_cur.total_texts_delivered, 0) AS total_texts_delivered,
        COALESCE(coupon_cur.coupons_redeemed, 0) AS coupons_redeemed,
        COALESCE(sub_cur.active_subs_cnt, 0) AS active_subs_cnt,
        spend_prev.total_spend AS previous_week_spend,
        coupon_prev.coupons_redeemed AS previous_week_redemptions,
        NOW() AS cache_updated_at
    FROM accounts a
    LEFT JOIN owners o ON o.account_id = a.id
    LEFT JOIN (
        SELECT account_id, SUM(total) AS total_spend
        FROM revenue_by_account_and_date
        WHERE date >= CURRENT_DATE - INTERVAL '7 days'
        GROUP BY account_id
    ) spend_cur ON spend_cur.account_id = a.id
    LEFT JOIN (
        SELECT account_id, SUM(total) AS total_spend
        FROM revenue_by_account_and_date
        WHERE date >= CURRENT_DATE - INTERVAL '14 days'
          AND date < CURRENT_DATE - INTERVAL '7 days'
        GROUP BY account_id
    ) spend_prev ON spend_prev.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT t.id) AS total_texts_delivered
        FROM texts t
        JOIN units u ON u.id = t.unit_id
        WHERE t.direction = 'OUTGOING' AND t.status = 'DELIVERED'
          AND t.created_at >= CURRENT_DATE - INTERVAL '7 days'
        GROUP BY u.account_id
    ) text_cur ON text_cur.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT c.id) AS coupons_redeemed
        FROM coupons c
        JOIN units u ON u.id = c.unit_id
        WHERE c.is_redeemed
          AND c.redeemed_at >= CURRENT_DATE - INTERVAL '7 days'
        GROUP BY u.account_id
    ) coupon_cur ON coupon_cur.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT c.id) AS coupons_redeemed
        FROM coupons c
        JOIN units u ON u.id = c.unit_id
        WHERE c.is_redeemed
          AND c.redeemed_at >= CURRENT_DATE - INTERVAL '14 days'
          AND c.redeemed_at < CURRENT_DATE - INTERVAL '7 days'
        GROUP BY u.account_id
    ) coupon_prev ON coupon_prev.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT s.id) AS active_subs_cnt
        FROM subscriptions s
        JOIN units u ON u.id = s.channel_id
        WHERE s.deactivated_at IS NULL OR s.deactivated_at >= CURRENT_DATE
        GROUP BY u.account_id
    ) sub_cur ON sub_cur.account_id = a.id
    WHERE a.launched_at IS NOT NULL
      AND a.status IN ('LAUNCHED', 'PAUSED')
    ORDER BY a.name
"#;

const MONTHLY_CACHE_QUERY: &str = r#"
    CREATE TABLE monthly_metrics_cache AS
    SELECT
        a.id AS account_id,
        a.name AS account_name,
        COALESCE(o.owner_name, 'Unassigned') AS csm_owner,
        a.launched_at,
        COALESCE(spend_cur.total_spend, 0) AS total_spend,
        COALESCE(text_cur.total_texts_delivered, 0) AS total_texts_delivered,
        COALESCE(coupon_cur.coupons_redeemed, 0) AS coupons_redeemed,
        COALESCE(sub_cur.active_subs_cnt, 0) AS active_subs_cnt,
        spend_prev.total_spend AS previous_month_spend,
        coupon_prev.coupons_redeemed AS previous_month_redemptions,
        NOW() AS cache_updated_at
    FROM accounts a
    LEFT JOIN owners o ON o.account_id = a.id
    LEFT JOIN (
        SELECT account_id, SUM(total) AS total_spend
        FROM revenue_by_account_and_date
        WHERE date >= CURRENT_DATE - INTERVAL '30 days'
        GROUP BY account_id
    ) spend_cur ON spend_cur.account_id = a.id
    LEFT JOIN (
        SELECT account_id, SUM(total) AS total_spend
        FROM revenue_by_account_and_date
        WHERE date >= CURRENT_DATE - INTERVAL '60 days'
          AND date < CURRENT_DATE - INTERVAL '30 days'
        GROUP BY account_id
    ) spend_prev ON spend_prev.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT t.id) AS total_texts_delivered
        FROM texts t
        JOIN units u ON u.id = t.unit_id
        WHERE t.direction = 'OUTGOING' AND t.status = 'DELIVERED'
          AND t.created_at >= CURRENT_DATE - INTERVAL '30 days'
        GROUP BY u.account_id
    ) text_cur ON text_cur.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT c.id) AS coupons_redeemed
        FROM coupons c
        JOIN units u ON u.id = c.unit_id
        WHERE c.is_redeemed
          AND c.redeemed_at >= CURRENT_DATE - INTERVAL '30 days'
        GROUP BY u.account_id
    ) coupon_cur ON coupon_cur.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT c.id) AS coupons_redeemed
        FROM coupons c
        JOIN units u ON u.id = c.unit_id
        WHERE c.is_redeemed
          AND c.redeemed_at >= CURRENT_DATE - INTERVAL '60 days'
          AND c.redeemed_at < CURRENT_DATE - INTERVAL '30 days'
        GROUP BY u.account_id
    ) coupon_prev ON coupon_prev.account_id = a.id
    LEFT JOIN (
        SELECT u.account_id, COUNT(DISTINCT s.id) AS active_subs_cnt
        FROM subscriptions s
        JOIN units u ON u.id = s.channel_id
        WHERE s.deactivated_at IS NULL OR s.deactivated_at >= CURRENT_DATE
        GROUP BY u.account_id
    ) sub_cur ON sub_cur.account_id = a.id
    WHERE a.launched_at IS NOT NULL
      AND a.status IN ('LAUNCHED', 'PAUSED')
    ORDER BY a.name
"#;

const HISTORY_QUERY: &str = r#"
    WITH spend AS (
        SELECT date_trunc('week', date)::date AS week_start,
               SUM(total) AS total_spend
        FROM revenue_by_account_and_date
        WHERE account_id = $1
          AND date >= CURRENT_DATE - INTERVAL '84 days'
        GROUP BY 1
    ),
    texts_sent AS (
        SELECT date_trunc('week', t.created_at)::date AS week_start,
               COUNT(DISTINCT t.id) AS total_texts_delivered
        FROM texts t
        JOIN units u ON u.id = t.unit_id
        WHERE u.account_id = $1
          AND t.direction = 'OUTGOING' AND t.status = 'DELIVERED'
          AND t.created_at >= CURRENT_DATE - INTERVAL '84 days'
        GROUP BY 1
    ),
    redemptions AS (
        SELECT date_trunc('week', c.redeemed_at)::date AS week_start,
               COUNT(DISTINCT c.id) AS coupons_redeemed
        FROM coupons c
        JOIN units u ON u.id = c.unit_id
        WHERE u.account_id = $1
          AND c.is_redeemed
          AND c.redeemed_at >= CURRENT_DATE - INTERVAL '84 days'
        GROUP BY 1
    )
    SELECT
        TO_CHAR(s.week_start, 'IYYY"W"IW') AS week_yr,
        TO_CHAR(s.week_start, 'YYYY-MM-DD') AS week_label,
        COALESCE(s.total_spend, 0) AS total_spend,
        COALESCE(t.total_texts_delivered, 0) AS total_texts_delivered,
        COALESCE(r.coupons_redeemed, 0) AS coupons_redeemed,
        0::bigint AS active_subs_cnt
    FROM spend s
    LEFT JOIN texts_sent t USING (week_start)
    LEFT JOIN redemptions r USING (week_start)
    ORDER BY s.week_start DESC
    LIMIT 12
"#;

/// Warehouse access backed by the Postgres pool via [`QueryExecutor`].
#[derive(Clone)]
pub struct PgWarehouse {
    executor: QueryExecutor,
}

impl PgWarehouse {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }

    fn read_query(period: Period) -> String {
        // Alias the period-specific prior columns so one row type serves
        // both cache tables.
        let (prev_spend, prev_redemptions) = match period {
            Period::Weekly => ("previous_week_spend", "previous_week_redemptions"),
            Period::Monthly => ("previous_month_spend", "previous_month_redemptions"),
        };
        format!(
            "SELECT account_id, account_name, csm_owner, launched_at, \
             total_spend, total_texts_delivered, coupons_redeemed, active_subs_cnt, \
             {} AS previous_spend, {} AS previous_redemptions, cache_updated_at \
             FROM {} ORDER BY account_name",
            prev_spend,
            prev_redemptions,
            period.cache_table()
        )
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn cache_watermark(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        self.executor.fetch_timestamp(WATERMARK_QUERY).await
    }

    async fn replace_weekly_cache(&self) -> Result<(), AppError> {
        info!("Rebuilding weekly metrics cache");
        self.executor
            .execute_replace(&["DROP TABLE IF EXISTS weekly_metrics_cache", WEEKLY_CACHE_QUERY])
            .await
    }

    async fn replace_monthly_cache(&self) -> Result<(), AppError> {
        info!("Rebuilding monthly metrics cache");
        self.executor
            .execute_replace(&[
                "DROP TABLE IF EXISTS monthly_metrics_cache",
                MONTHLY_CACHE_QUERY,
            ])
            .await
    }

    async fn load_cached_metrics(
        &self,
        period: Period,
    ) -> Result<Vec<AccountMetricRow>, AppError> {
        self.executor.fetch_all(&Self::read_query(period)).await
    }

    async fn account_history(&self, account_id: &str) -> Result<Vec<TimeSeriesPoint>, AppError> {
        self.executor
            .fetch_all_with(HISTORY_QUERY, &[account_id])
            .await
    }
}
