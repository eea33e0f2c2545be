//! Coupon persistence and atomic redemption.

use super::{currency_column, current_timestamp, money_column, Store};
use crate::coupon::{normalize_code, validate_coupon, Coupon, CouponCheck, CouponInput, CouponRejection};
use crate::ids::{CouponId, OrderId, UserId};
use crate::money::{Currency, Money};
use crate::CommerceError;
use hearth_db::{params, DbError, Row};
use serde::Serialize;

/// Outcome of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redemption {
    pub coupon_id: CouponId,
    pub code: String,
    /// Usage counter after this redemption.
    pub current_user_count: i64,
}

impl Store {
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, CommerceError> {
        let result = self
            .db
            .query("SELECT * FROM coupons ORDER BY created_at DESC", params![])
            .await?;
        result.iter().map(coupon_from_row).collect()
    }

    pub async fn get_coupon(&self, id: &CouponId) -> Result<Coupon, CommerceError> {
        let row = self
            .db
            .query_row("SELECT * FROM coupons WHERE id = ?", params![id.as_str()])
            .await?
            .ok_or_else(|| CommerceError::not_found("Coupon", id.as_str()))?;
        coupon_from_row(&row)
    }

    /// Look up a coupon by code, trimmed and ignoring case.
    pub async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, CommerceError> {
        let row = self
            .db
            .query_row("SELECT * FROM coupons WHERE code = ?", params![normalize_code(code)])
            .await?;
        row.as_ref().map(coupon_from_row).transpose()
    }

    pub async fn create_coupon(
        &self,
        input: CouponInput,
        currency: Currency,
    ) -> Result<Coupon, CommerceError> {
        let coupon = Coupon::from_input(input, currency)?;
        self.db
            .execute(
                "INSERT INTO coupons (id, code, discount_percent, min_order_value, currency, start_date, \
                 end_date, max_user_count, current_user_count, one_time_per_user, is_active, created_at, \
                 updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    coupon.id.as_str(),
                    &coupon.code,
                    coupon.discount_percent as i64,
                    coupon.min_order_value.amount_minor,
                    coupon.min_order_value.currency.code(),
                    coupon.start_date,
                    coupon.end_date,
                    coupon.max_user_count,
                    coupon.current_user_count,
                    coupon.one_time_per_user,
                    coupon.is_active,
                    coupon.created_at,
                    coupon.updated_at
                ],
            )
            .await
            .map_err(|e| duplicate_code(e, &coupon.code))?;
        tracing::info!(coupon_id = %coupon.id, coupon = %coupon.code, "coupon created");
        Ok(coupon)
    }

    pub async fn update_coupon(
        &self,
        id: &CouponId,
        input: CouponInput,
    ) -> Result<Coupon, CommerceError> {
        let mut coupon = self.get_coupon(id).await?;
        coupon.apply(input)?;
        self.db
            .execute(
                "UPDATE coupons SET code = ?, discount_percent = ?, min_order_value = ?, start_date = ?, \
                 end_date = ?, max_user_count = ?, one_time_per_user = ?, is_active = ?, updated_at = ? \
                 WHERE id = ?",
                params![
                    &coupon.code,
                    coupon.discount_percent as i64,
                    coupon.min_order_value.amount_minor,
                    coupon.start_date,
                    coupon.end_date,
                    coupon.max_user_count,
                    coupon.one_time_per_user,
                    coupon.is_active,
                    coupon.updated_at,
                    coupon.id.as_str()
                ],
            )
            .await
            .map_err(|e| duplicate_code(e, &coupon.code))?;
        Ok(coupon)
    }

    pub async fn delete_coupon(&self, id: &CouponId) -> Result<(), CommerceError> {
        let deleted = self
            .db
            .execute("DELETE FROM coupons WHERE id = ?", params![id.as_str()])
            .await?;
        if deleted == 0 {
            return Err(CommerceError::not_found("Coupon", id.as_str()));
        }
        Ok(())
    }

    /// Whether `user` already redeemed the coupon.
    pub async fn has_redeemed(&self, coupon: &CouponId, user: &UserId) -> Result<bool, CommerceError> {
        let row = self
            .db
            .query_row(
                "SELECT 1 AS used FROM coupon_redemptions WHERE coupon_id = ? AND user_id = ?",
                params![coupon.as_str(), user.as_str()],
            )
            .await?;
        Ok(row.is_some())
    }

    /// Run the full coupon check for a code.
    ///
    /// Returns the coupon and its discount percent. The per-user check only
    /// runs when `user` is known and the subtotal check only when a subtotal
    /// is given.
    pub async fn check_coupon(
        &self,
        code: &str,
        user: Option<&UserId>,
        subtotal: Option<Money>,
    ) -> Result<(Coupon, u8), CommerceError> {
        let coupon = self.coupon_by_code(code).await?;
        let mut ctx = CouponCheck::now();
        if let Some(subtotal) = subtotal {
            ctx = ctx.with_subtotal(subtotal);
        }
        if let (Some(coupon), Some(user)) = (&coupon, user) {
            if coupon.one_time_per_user {
                ctx = ctx.with_user_redeemed(self.has_redeemed(&coupon.id, user).await?);
            }
        }
        let percent = validate_coupon(coupon.as_ref(), &ctx)?;
        match coupon {
            Some(coupon) => Ok((coupon, percent)),
            None => Err(CouponRejection::NotFound.into()),
        }
    }

    /// Take one use of a coupon.
    ///
    /// The usage counter moves through a single conditional update, so the
    /// cap holds under concurrent checkouts. For one-time coupons the user's
    /// redemption row is inserted in the same transaction; a duplicate rolls
    /// the increment back.
    pub async fn redeem_coupon(
        &self,
        coupon: &Coupon,
        user: Option<&UserId>,
        order: Option<&OrderId>,
    ) -> Result<Redemption, CommerceError> {
        let now = current_timestamp();
        let mut tx = self.db.begin().await?;

        let updated = tx
            .execute(
                "UPDATE coupons SET current_user_count = current_user_count + 1, updated_at = ? \
                 WHERE id = ? AND (max_user_count IS NULL OR current_user_count < max_user_count)",
                params![now, coupon.id.as_str()],
            )
            .await?;
        if updated == 0 {
            tx.rollback().await?;
            tracing::warn!(coupon = %coupon.code, "coupon redemption refused: usage limit reached");
            return Err(CouponRejection::UsageLimitReached.into());
        }

        if let (true, Some(user)) = (coupon.one_time_per_user, user) {
            let inserted = tx
                .execute(
                    "INSERT INTO coupon_redemptions (coupon_id, user_id, order_id, redeemed_at) \
                     VALUES (?, ?, ?, ?)",
                    params![
                        coupon.id.as_str(),
                        user.as_str(),
                        order.map(|o| o.as_str().to_string()),
                        now
                    ],
                )
                .await;
            match inserted {
                Ok(_) => {}
                Err(e) if e.is_unique_violation() => {
                    tx.rollback().await?;
                    tracing::warn!(coupon = %coupon.code, user_id = %user, "coupon already used by user");
                    return Err(CouponRejection::AlreadyUsed.into());
                }
                Err(e) => return Err(e.into()),
            }
        }

        let count = tx
            .query_row(
                "SELECT current_user_count FROM coupons WHERE id = ?",
                params![coupon.id.as_str()],
            )
            .await?
            .map(|row| row.integer("current_user_count"))
            .transpose()?
            .unwrap_or_default();
        tx.commit().await?;

        tracing::info!(coupon = %coupon.code, uses = count, "coupon redeemed");
        Ok(Redemption {
            coupon_id: coupon.id.clone(),
            code: coupon.code.clone(),
            current_user_count: count,
        })
    }
}

fn duplicate_code(e: DbError, code: &str) -> CommerceError {
    if e.is_unique_violation() {
        CommerceError::Conflict(format!("Coupon code {} already exists", code))
    } else {
        e.into()
    }
}

fn coupon_from_row(row: &Row) -> Result<Coupon, CommerceError> {
    let currency = currency_column(row, "currency")?;
    Ok(Coupon {
        id: CouponId::new(row.text("id")?),
        code: row.text("code")?,
        discount_percent: row.integer("discount_percent")?.clamp(0, 100) as u8,
        min_order_value: money_column(row, "min_order_value", currency)?,
        start_date: row.integer("start_date")?,
        end_date: row.integer("end_date")?,
        max_user_count: row.opt_integer("max_user_count")?,
        current_user_count: row.integer("current_user_count")?,
        one_time_per_user: row.boolean("one_time_per_user")?,
        is_active: row.boolean("is_active")?,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn input(code: &str, max: Option<i64>, one_time: bool) -> CouponInput {
        CouponInput {
            code: code.into(),
            discount_percent: 10,
            min_order_value_minor: 50_000,
            start_date: Utc::now() - Duration::days(1),
            end_date: Utc::now() + Duration::days(1),
            max_user_count: max,
            one_time_per_user: one_time,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_code_lookup_is_case_insensitive() {
        let store = Store::in_memory().await.unwrap();
        store.create_coupon(input("Save10", None, false), Currency::INR).await.unwrap();

        let found = store.coupon_by_code("  save10 ").await.unwrap().unwrap();
        assert_eq!(found.code, "SAVE10");

        assert!(matches!(
            store.create_coupon(input("SAVE10", None, false), Currency::INR).await,
            Err(CommerceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_check_coupon_reasons() {
        let store = Store::in_memory().await.unwrap();
        store.create_coupon(input("SAVE10", None, true), Currency::INR).await.unwrap();
        let user = UserId::new("user_1");

        let (_, percent) = store
            .check_coupon("save10", Some(&user), Some(Money::new(60_000, Currency::INR)))
            .await
            .unwrap();
        assert_eq!(percent, 10);

        assert!(matches!(
            store.check_coupon("NOPE", None, None).await,
            Err(CommerceError::CouponRejected(CouponRejection::NotFound))
        ));
        assert!(matches!(
            store
                .check_coupon("SAVE10", None, Some(Money::new(100, Currency::INR)))
                .await,
            Err(CommerceError::CouponRejected(
                CouponRejection::MinimumOrderNotMet { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_one_time_coupon_rejects_second_use() {
        let store = Store::in_memory().await.unwrap();
        let coupon = store
            .create_coupon(input("ONCE", None, true), Currency::INR)
            .await
            .unwrap();
        let user = UserId::new("user_1");

        let first = store.redeem_coupon(&coupon, Some(&user), None).await.unwrap();
        assert_eq!(first.current_user_count, 1);

        assert!(matches!(
            store.redeem_coupon(&coupon, Some(&user), None).await,
            Err(CommerceError::CouponRejected(CouponRejection::AlreadyUsed))
        ));
        // The failed attempt did not move the counter.
        assert_eq!(store.get_coupon(&coupon.id).await.unwrap().current_user_count, 1);

        assert!(matches!(
            store.check_coupon("ONCE", Some(&user), None).await,
            Err(CommerceError::CouponRejected(CouponRejection::AlreadyUsed))
        ));
        assert!(store
            .check_coupon("ONCE", Some(&UserId::new("user_2")), None)
            .await
            .is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_usage_cap_holds_under_concurrency() {
        // A file database gets the full connection pool, so redemptions race.
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("coupons.db").display());
        let store = Store::new(hearth_db::Db::connect(&url).await.unwrap());
        store.migrate().await.unwrap();
        let coupon = store
            .create_coupon(input("LIMITED", Some(3), false), Currency::INR)
            .await
            .unwrap();

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let store = store.clone();
                let coupon = coupon.clone();
                tokio::spawn(async move {
                    let user = UserId::new(format!("user_{}", i));
                    store.redeem_coupon(&coupon, Some(&user), None).await
                })
            })
            .collect();

        let mut ok = 0;
        let mut limited = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(CommerceError::CouponRejected(CouponRejection::UsageLimitReached)) => limited += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 3);
        assert_eq!(limited, 37);

        let stored = store.get_coupon(&coupon.id).await.unwrap();
        assert_eq!(stored.current_user_count, 3);
        assert!(matches!(
            store.check_coupon("LIMITED", None, None).await,
            Err(CommerceError::CouponRejected(CouponRejection::UsageLimitReached))
        ));
    }
}
