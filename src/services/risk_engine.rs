use bigdecimal::BigDecimal;

use crate::models::{AccountMetricRow, RiskLevel};

/// Current-period redemption volume at or below this trips a flag.
pub const CRITICAL_REDEMPTIONS: i64 = 3;

/// Subscriber count below this, combined with redemptions below
/// [`LOW_ENGAGEMENT_REDEMPTIONS`], trips the low-engagement flag.
pub const LOW_ENGAGEMENT_SUBSCRIBERS: i64 = 300;
pub const LOW_ENGAGEMENT_REDEMPTIONS: i64 = 35;

/// Period-over-period spend drop (dollars) beyond which a flag trips.
pub const SPEND_DROP_THRESHOLD: i64 = -100;

/// Period-over-period redemption-count drop beyond which a flag trips.
pub const REDEMPTION_DROP_THRESHOLD: i64 = -5;

/// Count the independent risk flags an account trips. Always in `0..=4`.
///
/// The thresholds are fixed constants on purpose: the CRM sync recomputes
/// the same score from the same inputs and the two must agree exactly.
pub fn score(row: &AccountMetricRow, spend_delta: &BigDecimal, coupons_delta: i64) -> u8 {
    let mut score = 0;

    if row.coupons_redeemed <= CRITICAL_REDEMPTIONS {
        score += 1;
    }
    if row.active_subs_cnt < LOW_ENGAGEMENT_SUBSCRIBERS
        && row.coupons_redeemed < LOW_ENGAGEMENT_REDEMPTIONS
    {
        score += 1;
    }
    if *spend_delta < BigDecimal::from(SPEND_DROP_THRESHOLD) {
        score += 1;
    }
    if coupons_delta < REDEMPTION_DROP_THRESHOLD {
        score += 1;
    }

    score
}

pub fn level_of(score: u8) -> RiskLevel {
    if score >= 3 {
        RiskLevel::High
    } else if score >= 1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(coupons_redeemed: i64, active_subs_cnt: i64) -> AccountMetricRow {
        AccountMetricRow {
            account_id: "acc_001".to_string(),
            account_name: "Burger Palace Downtown".to_string(),
            csm_owner: "Sarah Chen".to_string(),
            launched_at: Some(Utc::now()),
            total_spend: BigDecimal::from(1000),
            total_texts_delivered: 500,
            coupons_redeemed,
            active_subs_cnt,
            previous_spend: Some(BigDecimal::from(900)),
            previous_redemptions: Some(40),
            cache_updated_at: Utc::now(),
        }
    }

    #[test]
    fn all_four_flags_trip() {
        let r = row(2, 250);
        let s = score(&r, &BigDecimal::from(-150), -10);
        assert_eq!(s, 4);
        assert_eq!(level_of(s), RiskLevel::High);
    }

    #[test]
    fn healthy_account_scores_zero() {
        let r = row(500, 4000);
        let s = score(&r, &BigDecimal::from(200), 50);
        assert_eq!(s, 0);
        assert_eq!(level_of(s), RiskLevel::Low);
    }

    #[test]
    fn redemption_floor_is_inclusive() {
        // coupons_redeemed == 3 trips the critical-volume flag on its own
        let r = row(3, 310);
        let s = score(&r, &BigDecimal::from(0), 0);
        assert_eq!(s, 1);
        assert_eq!(level_of(s), RiskLevel::Medium);
    }

    #[test]
    fn low_engagement_requires_both_conditions() {
        // low subs but healthy redemptions: no flag from the pair
        let r = row(35, 250);
        assert_eq!(score(&r, &BigDecimal::from(0), 0), 0);

        // low redemptions but healthy subs: still no flag from the pair
        let r = row(34, 300);
        assert_eq!(score(&r, &BigDecimal::from(0), 0), 0);

        // both low: flag trips
        let r = row(34, 299);
        assert_eq!(score(&r, &BigDecimal::from(0), 0), 1);
    }

    #[test]
    fn drop_thresholds_are_strict() {
        let r = row(100, 1000);
        assert_eq!(score(&r, &BigDecimal::from(-100), -5), 0);
        assert_eq!(score(&r, &BigDecimal::from(-101), -5), 1);
        assert_eq!(score(&r, &BigDecimal::from(-100), -6), 1);
    }

    #[test]
    fn level_mapping_covers_every_score() {
        assert_eq!(level_of(0), RiskLevel::Low);
        assert_eq!(level_of(1), RiskLevel::Medium);
        assert_eq!(level_of(2), RiskLevel::Medium);
        assert_eq!(level_of(3), RiskLevel::High);
        assert_eq!(level_of(4), RiskLevel::High);
    }

    #[test]
    fn score_is_deterministic() {
        let r = row(2, 250);
        let d = BigDecimal::from(-150);
        let first = score(&r, &d, -10);
        for _ in 0..100 {
            assert_eq!(score(&r, &d, -10), first);
        }
    }
}
