use crate::domain::money::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a coupon was rejected. Messages are client-facing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CouponError {
    #[error("Invalid or inactive coupon code.")]
    Invalid,
    #[error("Coupon code has expired.")]
    Expired,
    #[error("Coupon code usage limit exceeded.")]
    UsageExceeded,
}

/// Either a percentage of the base amount or a flat amount off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountRule {
    Percentage(Decimal),
    Flat(Money),
}

/// A discount rule with a validity window and an optional usage cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub coupon_code: String,
    pub rule: DiscountRule,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: Option<u32>,
    pub used_count: u32,
}

/// Result of successfully evaluating an offer against a base amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponApplication {
    pub offer_id: Uuid,
    pub coupon_code_applied: String,
    pub discount_amount: Money,
}

impl Offer {
    pub fn new(
        coupon_code: impl Into<String>,
        rule: DiscountRule,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
        usage_limit: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            coupon_code: coupon_code.into(),
            rule,
            is_active: true,
            valid_from,
            valid_until,
            usage_limit,
            used_count: 0,
        }
    }

    /// True when the usage cap (if any) still has headroom.
    pub fn has_usage_left(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.used_count < limit,
            None => true,
        }
    }

    /// Evaluates this offer against `base`, pure except for reading `now`.
    ///
    /// The discount is clamped so it never exceeds the base amount and is
    /// rounded to the nearest whole currency unit. Incrementing `used_count`
    /// is the caller's job, after the purchase persists.
    pub fn evaluate(
        &self,
        now: DateTime<Utc>,
        base: Money,
    ) -> Result<CouponApplication, CouponError> {
        if !self.is_active {
            return Err(CouponError::Invalid);
        }
        if now < self.valid_from || now > self.valid_until {
            return Err(CouponError::Expired);
        }
        if !self.has_usage_left() {
            return Err(CouponError::UsageExceeded);
        }

        let raw = match self.rule {
            DiscountRule::Percentage(pct) => Money::new(base.value() * pct / dec!(100)),
            DiscountRule::Flat(amount) => amount,
        };

        Ok(CouponApplication {
            offer_id: self.id,
            coupon_code_applied: self.coupon_code.clone(),
            discount_amount: raw.min(base).round_unit(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn offer(rule: DiscountRule, usage_limit: Option<u32>) -> Offer {
        let now = Utc::now();
        Offer::new(
            "SAVE10",
            rule,
            now - Duration::days(1),
            now + Duration::days(1),
            usage_limit,
        )
    }

    #[test]
    fn test_percentage_discount_rounds() {
        let offer = offer(DiscountRule::Percentage(dec!(10)), None);
        let applied = offer.evaluate(Utc::now(), Money::new(dec!(1000))).unwrap();
        assert_eq!(applied.discount_amount, Money::new(dec!(100)));
        assert_eq!(applied.coupon_code_applied, "SAVE10");
    }

    #[test]
    fn test_flat_discount_clamped_to_base() {
        let offer = offer(DiscountRule::Flat(Money::new(dec!(500))), None);
        let applied = offer.evaluate(Utc::now(), Money::new(dec!(300))).unwrap();
        assert_eq!(applied.discount_amount, Money::new(dec!(300)));
    }

    #[test]
    fn test_inactive_offer_rejected() {
        let mut offer = offer(DiscountRule::Percentage(dec!(10)), None);
        offer.is_active = false;
        assert_eq!(
            offer.evaluate(Utc::now(), Money::new(dec!(100))),
            Err(CouponError::Invalid)
        );
    }

    #[test]
    fn test_expired_offer_rejected() {
        let now = Utc::now();
        let offer = Offer::new(
            "OLD",
            DiscountRule::Percentage(dec!(10)),
            now - Duration::days(10),
            now - Duration::days(5),
            None,
        );
        assert_eq!(
            offer.evaluate(now, Money::new(dec!(100))),
            Err(CouponError::Expired)
        );
    }

    #[test]
    fn test_not_yet_valid_offer_rejected() {
        let now = Utc::now();
        let offer = Offer::new(
            "SOON",
            DiscountRule::Percentage(dec!(10)),
            now + Duration::days(1),
            now + Duration::days(5),
            None,
        );
        assert_eq!(
            offer.evaluate(now, Money::new(dec!(100))),
            Err(CouponError::Expired)
        );
    }

    #[test]
    fn test_usage_limit_boundary() {
        // usageLimit=1, usedCount=1: rejected even though dates are valid
        let mut offer = offer(DiscountRule::Percentage(dec!(10)), Some(1));
        offer.used_count = 1;
        assert_eq!(
            offer.evaluate(Utc::now(), Money::new(dec!(100))),
            Err(CouponError::UsageExceeded)
        );
    }

    #[test]
    fn test_usage_limit_with_headroom() {
        let mut offer = offer(DiscountRule::Percentage(dec!(10)), Some(2));
        offer.used_count = 1;
        assert!(offer.evaluate(Utc::now(), Money::new(dec!(100))).is_ok());
    }

    #[test]
    fn test_fractional_percentage_rounds_to_nearest_unit() {
        let offer = offer(DiscountRule::Percentage(dec!(7.5)), None);
        // 7.5% of 1010 = 75.75 -> 76
        let applied = offer.evaluate(Utc::now(), Money::new(dec!(1010))).unwrap();
        assert_eq!(applied.discount_amount, Money::new(dec!(76)));
    }
}
