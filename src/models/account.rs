use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Aggregation window used for current vs. prior period comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    Monthly,
}

impl Period {
    /// Cache table backing this granularity.
    pub fn cache_table(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly_metrics_cache",
            Period::Monthly => "monthly_metrics_cache",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Weekly => write!(f, "weekly"),
            Period::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One row of a metrics cache table, as written by the rebuild query.
/// The prior-period columns are aliased to `previous_spend` /
/// `previous_redemptions` at read time so the same row type serves both
/// granularities. They are null for accounts too new to have a prior period.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountMetricRow {
    pub account_id: String,
    pub account_name: String,
    pub csm_owner: String,
    pub launched_at: Option<DateTime<Utc>>,
    pub total_spend: BigDecimal,
    pub total_texts_delivered: i64,
    pub coupons_redeemed: i64,
    pub active_subs_cnt: i64,
    pub previous_spend: Option<BigDecimal>,
    pub previous_redemptions: Option<i64>,
    pub cache_updated_at: DateTime<Utc>,
}

/// Consumer-facing view of an account: current-period metrics plus
/// period-over-period deltas and the risk classification. Derived from
/// [`AccountMetricRow`] on every read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMetric {
    pub account_id: String,
    pub account_name: String,
    pub csm_owner: String,
    pub launched_at: Option<DateTime<Utc>>,
    pub total_spend: BigDecimal,
    pub total_texts_delivered: i64,
    pub coupons_redeemed: i64,
    pub active_subs_cnt: i64,
    pub spend_delta: BigDecimal,
    /// Prior-period text aggregates are not materialized in the cache yet,
    /// so this is always 0.
    pub texts_delta: i64,
    pub coupons_delta: i64,
    /// Prior-period subscriber aggregates are not materialized in the cache
    /// yet, so this is always 0.
    pub subs_delta: i64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}
