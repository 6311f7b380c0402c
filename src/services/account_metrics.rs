use bigdecimal::BigDecimal;
use num_traits::Zero;
use std::sync::Arc;
use tracing::debug;

use crate::database::warehouse::Warehouse;
use crate::error::AppError;
use crate::models::{AccountMetric, AccountMetricRow, Period, RiskLevel, RiskSummary};
use crate::services::metrics_cache::MetricsCache;
use crate::services::risk_engine;

/// Read path for the dashboard account table: ensure the cache is fresh,
/// load the period's rows, attach deltas and the risk classification.
pub struct AccountMetricsService {
    warehouse: Arc<dyn Warehouse>,
    cache: Arc<MetricsCache>,
}

impl AccountMetricsService {
    pub fn new(warehouse: Arc<dyn Warehouse>, cache: Arc<MetricsCache>) -> Self {
        Self { warehouse, cache }
    }

    /// Full scored account list for one granularity, sorted ascending by
    /// display name. No pagination or filtering; those belong to the UI.
    pub async fn get_accounts(&self, period: Period) -> Result<Vec<AccountMetric>, AppError> {
        self.cache.ensure_fresh().await?;

        let mut rows = self.warehouse.load_cached_metrics(period).await?;
        debug!("Loaded {} cached rows for {} period", rows.len(), period);

        // The cache is name-sorted at build time; sorting again keeps the
        // ordering guarantee independent of how the rows come back.
        rows.sort_by(|a, b| a.account_name.cmp(&b.account_name));

        Ok(rows.iter().map(transform_row).collect())
    }

    /// Aggregate over the monthly account list for the dashboard cards.
    pub async fn get_risk_summary(&self) -> Result<RiskSummary, AppError> {
        let accounts = self.get_accounts(Period::Monthly).await?;

        let mut summary = RiskSummary {
            total_accounts: accounts.len() as u64,
            high_risk_count: 0,
            medium_risk_count: 0,
            low_risk_count: 0,
            total_revenue: BigDecimal::zero(),
            revenue_at_risk: BigDecimal::zero(),
        };

        for account in &accounts {
            summary.total_revenue += account.total_spend.clone();
            match account.risk_level {
                RiskLevel::High => {
                    summary.high_risk_count += 1;
                    summary.revenue_at_risk += account.total_spend.clone();
                }
                RiskLevel::Medium => summary.medium_risk_count += 1,
                RiskLevel::Low => summary.low_risk_count += 1,
            }
        }

        Ok(summary)
    }
}

/// Derive the consumer-facing metric set from one cache row. Accounts too
/// new to have a prior period read as zero there, so deltas stay numeric.
pub fn transform_row(row: &AccountMetricRow) -> AccountMetric {
    let previous_spend = row.previous_spend.clone().unwrap_or_else(BigDecimal::zero);
    let previous_redemptions = row.previous_redemptions.unwrap_or(0);

    let spend_delta = &row.total_spend - previous_spend;
    let coupons_delta = row.coupons_redeemed - previous_redemptions;

    let risk_score = risk_engine::score(row, &spend_delta, coupons_delta);
    let risk_level = risk_engine::level_of(risk_score);

    AccountMetric {
        account_id: row.account_id.clone(),
        account_name: row.account_name.clone(),
        csm_owner: row.csm_owner.clone(),
        launched_at: row.launched_at,
        total_spend: row.total_spend.clone(),
        total_texts_delivered: row.total_texts_delivered,
        coupons_redeemed: row.coupons_redeemed,
        active_subs_cnt: row.active_subs_cnt,
        spend_delta,
        texts_delta: 0,
        coupons_delta,
        subs_delta: 0,
        risk_score,
        risk_level,
    }
}
