//! Order total calculations.
//!
//! `grand_total = subtotal - discount_total + shipping_total + tax_total`
//! holds for every [`OrderTotals`] this module produces.

use crate::money::{Currency, Money};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Store-wide pricing rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    /// Currency every order is charged in.
    pub currency: Currency,
    /// Flat shipping fee per order.
    pub shipping_flat: Money,
    /// Discounted subtotals at or above this ship free. `None` never ships free.
    pub free_shipping_above: Option<Money>,
    /// Tax percent applied to the discounted subtotal (0-100).
    pub tax_percent: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::INR,
            shipping_flat: Money::new(5_000, Currency::INR),
            free_shipping_above: Some(Money::new(99_900, Currency::INR)),
            tax_percent: 0.0,
        }
    }
}

impl PricingConfig {
    /// Shipping charged on a discounted subtotal.
    pub fn shipping_for(&self, discounted: &Money) -> Money {
        if discounted.is_zero() {
            return Money::zero(self.currency);
        }
        match self.free_shipping_above {
            Some(threshold) if discounted.amount_minor >= threshold.amount_minor => {
                Money::zero(self.currency)
            }
            _ => self.shipping_flat,
        }
    }
}

/// Complete pricing breakdown for an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrderTotals {
    /// Sum of line totals before the coupon.
    pub subtotal: Money,
    /// Coupon percent that produced `discount_total`.
    pub discount_percent: u8,
    /// Coupon discount.
    pub discount_total: Money,
    /// Shipping cost.
    pub shipping_total: Money,
    /// Tax amount.
    pub tax_total: Money,
    /// Final total (subtotal - discount + shipping + tax).
    pub grand_total: Money,
}

impl OrderTotals {
    /// Price a subtotal under a coupon percent and the store rules.
    ///
    /// ```
    /// use hearth_commerce::money::{Currency, Money};
    /// use hearth_commerce::pricing::{OrderTotals, PricingConfig};
    ///
    /// let totals = OrderTotals::compute(
    ///     Money::new(100_000, Currency::INR),
    ///     10,
    ///     &PricingConfig::default(),
    /// ).unwrap();
    /// assert_eq!(totals.grand_total.amount_minor, 95_000);
    /// ```
    pub fn compute(
        subtotal: Money,
        discount_percent: u8,
        config: &PricingConfig,
    ) -> Result<Self, CommerceError> {
        if subtotal.currency != config.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: config.currency.code().to_string(),
                got: subtotal.currency.code().to_string(),
            });
        }
        if subtotal.is_negative() {
            return Err(CommerceError::validation("Subtotal cannot be negative"));
        }

        let discount_total = subtotal
            .percentage(discount_percent.min(100) as f64)
            .min(subtotal);
        let discounted = subtotal.try_subtract(&discount_total)?;
        let shipping_total = config.shipping_for(&discounted);
        let tax_total = discounted.percentage(config.tax_percent);
        let grand_total = discounted
            .try_add(&shipping_total)?
            .try_add(&tax_total)?;

        Ok(Self {
            subtotal,
            discount_percent,
            discount_total,
            shipping_total,
            tax_total,
            grand_total,
        })
    }

    /// Check the totals identity.
    pub fn is_consistent(&self) -> bool {
        self.subtotal.amount_minor - self.discount_total.amount_minor
            + self.shipping_total.amount_minor
            + self.tax_total.amount_minor
            == self.grand_total.amount_minor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(rupees: i64) -> Money {
        Money::new(rupees * 100, Currency::INR)
    }

    fn flat_fifty_no_tax() -> PricingConfig {
        PricingConfig {
            currency: Currency::INR,
            shipping_flat: inr(50),
            free_shipping_above: None,
            tax_percent: 0.0,
        }
    }

    #[test]
    fn test_reference_totals() {
        let totals = OrderTotals::compute(inr(1000), 10, &flat_fifty_no_tax()).unwrap();
        assert_eq!(totals.discount_total, inr(100));
        assert_eq!(totals.shipping_total, inr(50));
        assert_eq!(totals.tax_total, inr(0));
        assert_eq!(totals.grand_total, inr(950));
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_free_shipping_threshold_uses_discounted_subtotal() {
        let config = PricingConfig::default();
        let at_threshold = OrderTotals::compute(inr(999), 0, &config).unwrap();
        assert!(at_threshold.shipping_total.is_zero());

        // 1100 - 10% = 990, below 999
        let below = OrderTotals::compute(inr(1100), 10, &config).unwrap();
        assert_eq!(below.shipping_total, inr(50));
    }

    #[test]
    fn test_tax_on_discounted_subtotal() {
        let config = PricingConfig {
            tax_percent: 18.0,
            ..flat_fifty_no_tax()
        };
        let totals = OrderTotals::compute(inr(1000), 10, &config).unwrap();
        assert_eq!(totals.tax_total, inr(162));
        assert_eq!(totals.grand_total, inr(900 + 50 + 162));
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_identity_holds_across_awkward_amounts() {
        let config = PricingConfig {
            tax_percent: 5.5,
            ..PricingConfig::default()
        };
        for (paise, pct) in [(1, 33), (333, 17), (99_899, 0), (123_457, 100), (7, 50)] {
            let totals =
                OrderTotals::compute(Money::new(paise, Currency::INR), pct, &config).unwrap();
            assert!(totals.is_consistent(), "{} @ {}%", paise, pct);
            assert!(!totals.grand_total.is_negative());
        }
    }

    #[test]
    fn test_empty_cart_ships_free() {
        let totals = OrderTotals::compute(inr(0), 0, &flat_fifty_no_tax()).unwrap();
        assert!(totals.grand_total.is_zero());
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::new(100, Currency::USD);
        assert!(OrderTotals::compute(usd, 0, &PricingConfig::default()).is_err());
    }
}
