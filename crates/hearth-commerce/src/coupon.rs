//! Coupon definitions and validation.
//!
//! Validation is a pure function over a loaded coupon and the facts the
//! caller already knows (clock, subtotal, whether this user has redeemed
//! the coupon). Redemption itself is a storage concern: the usage counter
//! only moves through a conditional update so two checkouts can never
//! both take the last use.

use crate::ids::CouponId;
use crate::money::{Currency, Money};
use crate::CommerceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A percentage-off coupon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    /// Unique coupon identifier.
    pub id: CouponId,
    /// Redemption code, stored upper-case.
    pub code: String,
    /// Percent taken off the subtotal (0-100).
    pub discount_percent: u8,
    /// Smallest subtotal the coupon applies to.
    pub min_order_value: Money,
    /// First valid moment (Unix timestamp).
    pub start_date: i64,
    /// Last valid moment (Unix timestamp).
    pub end_date: i64,
    /// Total redemptions allowed. `None` is unlimited.
    pub max_user_count: Option<i64>,
    /// Redemptions so far.
    pub current_user_count: i64,
    /// Each user may redeem at most once.
    pub one_time_per_user: bool,
    /// Admin on/off switch.
    pub is_active: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Coupon {
    /// Build a coupon from validated input.
    pub fn from_input(input: CouponInput, currency: Currency) -> Result<Self, CommerceError> {
        input.validate()?;
        let now = current_timestamp();
        Ok(Self {
            id: CouponId::generate(),
            code: normalize_code(&input.code),
            discount_percent: input.discount_percent as u8,
            min_order_value: Money::new(input.min_order_value_minor, currency),
            start_date: input.start_date.timestamp(),
            end_date: input.end_date.timestamp(),
            max_user_count: input.max_user_count,
            current_user_count: 0,
            one_time_per_user: input.one_time_per_user,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite editable fields. The usage counter is kept.
    pub fn apply(&mut self, input: CouponInput) -> Result<(), CommerceError> {
        input.validate()?;
        self.code = normalize_code(&input.code);
        self.discount_percent = input.discount_percent as u8;
        self.min_order_value = Money::new(input.min_order_value_minor, self.min_order_value.currency);
        self.start_date = input.start_date.timestamp();
        self.end_date = input.end_date.timestamp();
        self.max_user_count = input.max_user_count;
        self.one_time_per_user = input.one_time_per_user;
        self.is_active = input.is_active;
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Run every check in order and return the discount percent.
    pub fn check(&self, ctx: &CouponCheck) -> Result<u8, CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if ctx.now < self.start_date {
            return Err(CouponRejection::NotStarted);
        }
        if ctx.now > self.end_date {
            return Err(CouponRejection::Expired);
        }
        if self.is_exhausted() {
            return Err(CouponRejection::UsageLimitReached);
        }
        if self.one_time_per_user && ctx.user_has_redeemed == Some(true) {
            return Err(CouponRejection::AlreadyUsed);
        }
        if let Some(subtotal) = ctx.subtotal {
            if subtotal.amount_minor < self.min_order_value.amount_minor {
                return Err(CouponRejection::MinimumOrderNotMet {
                    minimum: self.min_order_value,
                });
            }
        }
        Ok(self.discount_percent)
    }

    /// Check if the global usage cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_user_count
            .map(|limit| self.current_user_count >= limit)
            .unwrap_or(false)
    }

    /// Amount this coupon takes off a subtotal.
    pub fn discount_for(&self, subtotal: &Money) -> Money {
        subtotal.percentage(self.discount_percent as f64)
    }
}

/// Validate an optional coupon lookup result.
///
/// `None` means the code matched nothing.
///
/// ```
/// use hearth_commerce::coupon::{validate_coupon, CouponCheck, CouponRejection};
/// let result = validate_coupon(None, &CouponCheck::at(0));
/// assert_eq!(result, Err(CouponRejection::NotFound));
/// ```
pub fn validate_coupon(coupon: Option<&Coupon>, ctx: &CouponCheck) -> Result<u8, CouponRejection> {
    match coupon {
        Some(coupon) => coupon.check(ctx),
        None => Err(CouponRejection::NotFound),
    }
}

/// Facts a coupon is checked against.
#[derive(Debug, Clone, Copy, Default)]
pub struct CouponCheck {
    /// The current Unix timestamp.
    pub now: i64,
    /// `Some(true)` when the known user already redeemed this coupon;
    /// `None` when no user is known.
    pub user_has_redeemed: Option<bool>,
    /// Cart subtotal, when the caller has one.
    pub subtotal: Option<Money>,
}

impl CouponCheck {
    /// A check at the given instant with no user or subtotal.
    pub fn at(now: i64) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// A check at the current instant.
    pub fn now() -> Self {
        Self::at(current_timestamp())
    }

    /// Record whether the known user has redeemed the coupon before.
    pub fn with_user_redeemed(mut self, redeemed: bool) -> Self {
        self.user_has_redeemed = Some(redeemed);
        self
    }

    /// Check the minimum order value against this subtotal.
    pub fn with_subtotal(mut self, subtotal: Money) -> Self {
        self.subtotal = Some(subtotal);
        self
    }
}

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum CouponRejection {
    NotFound,
    Inactive,
    NotStarted,
    Expired,
    UsageLimitReached,
    AlreadyUsed,
    MinimumOrderNotMet { minimum: Money },
}

impl CouponRejection {
    /// Human-readable message for the storefront.
    pub fn message(&self) -> String {
        match self {
            CouponRejection::NotFound => "Invalid coupon code".to_string(),
            CouponRejection::Inactive => "This coupon is no longer active".to_string(),
            CouponRejection::NotStarted => "This coupon is not valid yet".to_string(),
            CouponRejection::Expired => "This coupon has expired".to_string(),
            CouponRejection::UsageLimitReached => {
                "This coupon has reached its usage limit".to_string()
            }
            CouponRejection::AlreadyUsed => "You have already used this coupon".to_string(),
            CouponRejection::MinimumOrderNotMet { minimum } => {
                format!("Minimum order value of {} required", minimum.display())
            }
        }
    }
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Create/update payload for a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponInput {
    pub code: String,
    pub discount_percent: i64,
    /// Minimum subtotal in minor units.
    #[serde(default)]
    pub min_order_value_minor: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub max_user_count: Option<i64>,
    #[serde(default)]
    pub one_time_per_user: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CouponInput {
    /// Check the coupon invariants.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let code = normalize_code(&self.code);
        if code.is_empty() {
            return Err(CommerceError::validation("Coupon code cannot be empty"));
        }
        if code.chars().any(char::is_whitespace) {
            return Err(CommerceError::validation("Coupon code cannot contain spaces"));
        }
        if !(0..=100).contains(&self.discount_percent) {
            return Err(CommerceError::validation("Discount must be between 0 and 100"));
        }
        if self.min_order_value_minor < 0 {
            return Err(CommerceError::validation(
                "Minimum order value cannot be negative",
            ));
        }
        if self.end_date < self.start_date {
            return Err(CommerceError::validation(
                "Coupon end date must not be before its start date",
            ));
        }
        if matches!(self.max_user_count, Some(n) if n < 1) {
            return Err(CommerceError::validation("Usage limit must be at least 1"));
        }
        Ok(())
    }
}

/// Canonical form of a coupon code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn default_true() -> bool {
    true
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DAY: i64 = 86_400;

    fn input() -> CouponInput {
        CouponInput {
            code: " save10 ".to_string(),
            discount_percent: 10,
            min_order_value_minor: 50_000,
            start_date: Utc.timestamp_opt(1_000 * DAY, 0).unwrap(),
            end_date: Utc.timestamp_opt(1_010 * DAY, 0).unwrap(),
            max_user_count: Some(2),
            one_time_per_user: true,
            is_active: true,
        }
    }

    fn coupon() -> Coupon {
        Coupon::from_input(input(), Currency::INR).unwrap()
    }

    fn inside() -> i64 {
        1_005 * DAY
    }

    #[test]
    fn test_code_is_normalized() {
        assert_eq!(coupon().code, "SAVE10");
        assert_eq!(normalize_code("  welcome "), "WELCOME");
    }

    #[test]
    fn test_valid_coupon_returns_discount() {
        let ctx = CouponCheck::at(inside())
            .with_user_redeemed(false)
            .with_subtotal(Money::new(100_000, Currency::INR));
        assert_eq!(coupon().check(&ctx), Ok(10));
    }

    #[test]
    fn test_missing_coupon() {
        assert_eq!(
            validate_coupon(None, &CouponCheck::at(inside())),
            Err(CouponRejection::NotFound)
        );
    }

    #[test]
    fn test_inactive_coupon() {
        let mut c = coupon();
        c.is_active = false;
        assert_eq!(c.check(&CouponCheck::at(inside())), Err(CouponRejection::Inactive));
    }

    #[test]
    fn test_date_window() {
        let c = coupon();
        assert_eq!(c.check(&CouponCheck::at(999 * DAY)), Err(CouponRejection::NotStarted));
        assert_eq!(c.check(&CouponCheck::at(1_011 * DAY)), Err(CouponRejection::Expired));
        // Both ends are inclusive.
        assert!(c.check(&CouponCheck::at(c.start_date)).is_ok());
        assert!(c.check(&CouponCheck::at(c.end_date)).is_ok());
    }

    #[test]
    fn test_usage_cap() {
        let mut c = coupon();
        c.current_user_count = 2;
        assert_eq!(
            c.check(&CouponCheck::at(inside())),
            Err(CouponRejection::UsageLimitReached)
        );

        c.max_user_count = None;
        c.current_user_count = 10_000;
        assert!(c.check(&CouponCheck::at(inside())).is_ok());
    }

    #[test]
    fn test_per_user_reuse() {
        let c = coupon();
        let ctx = CouponCheck::at(inside()).with_user_redeemed(true);
        assert_eq!(c.check(&ctx), Err(CouponRejection::AlreadyUsed));

        let mut reusable = coupon();
        reusable.one_time_per_user = false;
        assert!(reusable.check(&ctx).is_ok());
    }

    #[test]
    fn test_minimum_order() {
        let c = coupon();
        let ctx = CouponCheck::at(inside()).with_subtotal(Money::new(49_999, Currency::INR));
        let err = c.check(&ctx).unwrap_err();
        assert!(matches!(err, CouponRejection::MinimumOrderNotMet { .. }));
        assert!(err.message().contains("500.00"));

        // Without a subtotal the minimum is not checked.
        assert!(c.check(&CouponCheck::at(inside())).is_ok());
    }

    #[test]
    fn test_checks_run_in_order() {
        let mut c = coupon();
        c.is_active = false;
        c.current_user_count = 2;
        // Inactive wins over expired and exhausted.
        assert_eq!(
            c.check(&CouponCheck::at(2_000 * DAY)),
            Err(CouponRejection::Inactive)
        );
    }

    #[test]
    fn test_input_validation() {
        let mut bad = input();
        bad.end_date = Utc.timestamp_opt(999 * DAY, 0).unwrap();
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.discount_percent = 120;
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.min_order_value_minor = -1;
        assert!(bad.validate().is_err());

        let mut bad = input();
        bad.code = "   ".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_discount_for_subtotal() {
        let c = coupon();
        let off = c.discount_for(&Money::new(100_000, Currency::INR));
        assert_eq!(off.amount_minor, 10_000);
    }
}
