use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One trailing weekly period for the account detail view. Raw metrics only;
/// the consumer computes any derived chart series itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeSeriesPoint {
    pub week_yr: String,
    pub week_label: String,
    pub total_spend: BigDecimal,
    pub total_texts_delivered: i64,
    pub coupons_redeemed: i64,
    pub active_subs_cnt: i64,
}

/// Dashboard-level aggregate over the monthly account list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub total_accounts: u64,
    pub high_risk_count: u64,
    pub medium_risk_count: u64,
    pub low_risk_count: u64,
    pub total_revenue: BigDecimal,
    pub revenue_at_risk: BigDecimal,
}
