//! Money arithmetic. Amounts are integer minor units; rates are basis points.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

pub const BPS_DENOMINATOR: i64 = 10_000;

/// `amount * bps / 10000`, rounded half up.
pub fn apply_bps(amount: i64, bps: i64) -> i64 {
    let scaled = i128::from(amount) * i128::from(bps);
    let half = i128::from(BPS_DENOMINATOR / 2);
    let rounded = if scaled >= 0 {
        (scaled + half) / i128::from(BPS_DENOMINATOR)
    } else {
        (scaled - half) / i128::from(BPS_DENOMINATOR)
    };
    i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
}

pub fn line_total(unit_price: i64, quantity: i32) -> AppResult<i64> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| AppError::BadRequest("line total overflows".into()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    pub shipping_fee: i64,
    pub free_shipping_threshold: i64,
    pub tax_rate_bps: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub shipping: i64,
    pub tax: i64,
    pub total: i64,
}

impl PricingRules {
    pub fn totals(&self, subtotal: i64) -> AppResult<OrderTotals> {
        let shipping = if subtotal >= self.free_shipping_threshold {
            0
        } else {
            self.shipping_fee
        };
        let tax = apply_bps(subtotal, self.tax_rate_bps);
        let total = subtotal
            .checked_add(shipping)
            .and_then(|t| t.checked_add(tax))
            .ok_or_else(|| AppError::BadRequest("order total overflows".into()))?;
        Ok(OrderTotals {
            subtotal,
            shipping,
            tax,
            total,
        })
    }
}

/// Gross sales split into the platform's commission and what the seller keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Earnings {
    pub gross: i64,
    pub commission: i64,
    pub net: i64,
}

impl Earnings {
    pub fn from_gross(gross: i64, commission_rate_bps: i64) -> Self {
        let commission = apply_bps(gross, commission_rate_bps);
        Self {
            gross,
            commission,
            net: gross - commission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: PricingRules = PricingRules {
        shipping_fee: 500,
        free_shipping_threshold: 5000,
        tax_rate_bps: 800,
    };

    #[test]
    fn bps_rounds_half_up() {
        assert_eq!(apply_bps(1000, 1000), 100);
        assert_eq!(apply_bps(5, 1000), 1); // 0.5 -> 1
        assert_eq!(apply_bps(4, 1000), 0); // 0.4 -> 0
        assert_eq!(apply_bps(0, 800), 0);
    }

    #[test]
    fn small_orders_pay_shipping() {
        let totals = RULES.totals(2000).unwrap();
        assert_eq!(
            totals,
            OrderTotals {
                subtotal: 2000,
                shipping: 500,
                tax: 160,
                total: 2660,
            }
        );
    }

    #[test]
    fn threshold_is_inclusive() {
        let totals = RULES.totals(5000).unwrap();
        assert_eq!(totals.shipping, 0);
        assert_eq!(totals.tax, 400);
        assert_eq!(totals.total, 5400);
    }

    #[test]
    fn line_total_detects_overflow() {
        assert_eq!(line_total(1250, 3).unwrap(), 3750);
        assert!(line_total(i64::MAX, 2).is_err());
    }

    #[test]
    fn totals_reject_overflow() {
        let subtotal = line_total(9_000_000_000_000_000_000, 1).unwrap();
        assert!(matches!(
            RULES.totals(subtotal),
            Err(AppError::BadRequest(_))
        ));
        assert!(RULES.totals(i64::MAX - 100).is_err());
    }

    #[test]
    fn commission_and_net_add_up() {
        let earnings = Earnings::from_gross(12_345, 1000);
        assert_eq!(earnings.commission, 1235);
        assert_eq!(earnings.net, 11_110);
        assert_eq!(earnings.commission + earnings.net, earnings.gross);
    }
}
