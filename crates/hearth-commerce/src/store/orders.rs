//! Order persistence and payment state.

use super::{currency_column, current_timestamp, money_column, Store};
use crate::checkout::{Order, OrderStatus, PaymentDetails};
use crate::ids::{OrderId, UserId};
use crate::CommerceError;
use hearth_db::{params, Row, Value};

const ORDER_COLUMNS: &str = "id, order_number, user_id, items, shipping_address, coupon_code, \
     currency, subtotal, discount_total, shipping_total, tax_total, grand_total, gateway_order_id, \
     gateway_payment_id, gateway_signature, is_paid, paid_at, status, created_at, updated_at, \
     cancelled_at";

/// Optional constraints for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    pub paid: Option<bool>,
    pub user_id: Option<UserId>,
}

/// A verified gateway payment.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: Option<String>,
}

impl Store {
    pub async fn insert_order(&self, order: &Order) -> Result<(), CommerceError> {
        self.db
            .execute(
                &format!(
                    "INSERT INTO orders ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    ORDER_COLUMNS
                ),
                &[
                    Value::from(order.id.as_str()),
                    Value::from(&order.order_number),
                    Value::from(order.user_id.as_ref().map(|u| u.as_str().to_string())),
                    Value::json(&order.items)?,
                    Value::json(&order.shipping_address)?,
                    Value::from(order.coupon_code.clone()),
                    Value::from(order.currency().code()),
                    Value::from(order.subtotal.amount_minor),
                    Value::from(order.discount_total.amount_minor),
                    Value::from(order.shipping_total.amount_minor),
                    Value::from(order.tax_total.amount_minor),
                    Value::from(order.grand_total.amount_minor),
                    Value::from(order.payment.gateway_order_id.clone()),
                    Value::from(order.payment.gateway_payment_id.clone()),
                    Value::from(order.payment.gateway_signature.clone()),
                    Value::from(order.payment.is_paid),
                    Value::from(order.payment.paid_at),
                    Value::from(order.status.as_str()),
                    Value::from(order.created_at),
                    Value::from(order.updated_at),
                    Value::from(order.cancelled_at),
                ],
            )
            .await?;
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = order.grand_total.amount_minor,
            "order created"
        );
        Ok(())
    }

    pub async fn get_order(&self, id: &OrderId) -> Result<Order, CommerceError> {
        let row = self
            .db
            .query_row(
                &format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS),
                params![id.as_str()],
            )
            .await?
            .ok_or_else(|| CommerceError::not_found("Order", id.as_str()))?;
        order_from_row(&row)
    }

    /// Load an order owned by `user`. Other users' orders read as missing.
    pub async fn order_for_user(&self, id: &OrderId, user: &UserId) -> Result<Order, CommerceError> {
        let order = self.get_order(id).await?;
        if order.user_id.as_ref() != Some(user) {
            return Err(CommerceError::not_found("Order", id.as_str()));
        }
        Ok(order)
    }

    pub async fn order_by_gateway_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Order>, CommerceError> {
        let row = self
            .db
            .query_row(
                &format!("SELECT {} FROM orders WHERE gateway_order_id = ?", ORDER_COLUMNS),
                params![gateway_order_id],
            )
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    /// Newest first.
    pub async fn list_orders(&self, filter: &OrderListFilter) -> Result<Vec<Order>, CommerceError> {
        let mut clauses = vec!["1=1".to_string()];
        let mut params = Vec::new();
        if let Some(status) = filter.status {
            clauses.push("status = ?".into());
            params.push(Value::from(status.as_str()));
        }
        if let Some(paid) = filter.paid {
            clauses.push("is_paid = ?".into());
            params.push(Value::from(paid));
        }
        if let Some(user) = &filter.user_id {
            clauses.push("user_id = ?".into());
            params.push(Value::from(user.as_str()));
        }
        let sql = format!(
            "SELECT {} FROM orders WHERE {} ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS,
            clauses.join(" AND ")
        );
        let result = self.db.query(&sql, &params).await?;
        result.iter().map(order_from_row).collect()
    }

    /// Attach the gateway order created for an order.
    pub async fn set_gateway_order_id(
        &self,
        id: &OrderId,
        gateway_order_id: &str,
    ) -> Result<(), CommerceError> {
        let updated = self
            .db
            .execute(
                "UPDATE orders SET gateway_order_id = ?, updated_at = ? WHERE id = ?",
                params![gateway_order_id, current_timestamp(), id.as_str()],
            )
            .await?;
        if updated == 0 {
            return Err(CommerceError::not_found("Order", id.as_str()));
        }
        Ok(())
    }

    /// Record a verified payment.
    ///
    /// Only an unpaid order changes, so replays are harmless. Returns the
    /// stored order and whether this call was the one that marked it paid.
    pub async fn mark_order_paid(
        &self,
        payment: &PaymentRecord,
    ) -> Result<(Order, bool), CommerceError> {
        let now = current_timestamp();
        let updated = self
            .db
            .execute(
                "UPDATE orders SET is_paid = 1, paid_at = ?, gateway_payment_id = ?, \
                 gateway_signature = ?, \
                 status = CASE WHEN status = 'pending' THEN 'confirmed' ELSE status END, \
                 updated_at = ? WHERE gateway_order_id = ? AND is_paid = 0",
                params![
                    now,
                    &payment.gateway_payment_id,
                    payment.signature.clone(),
                    now,
                    &payment.gateway_order_id
                ],
            )
            .await?;

        let order = self
            .order_by_gateway_id(&payment.gateway_order_id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Order", payment.gateway_order_id.as_str()))?;
        let newly_paid = updated > 0;
        if newly_paid {
            tracing::info!(order_id = %order.id, payment_id = %payment.gateway_payment_id, "order paid");
        } else {
            tracing::debug!(order_id = %order.id, "payment already recorded");
        }
        Ok((order, newly_paid))
    }

    /// Move an order through the status state machine.
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        next: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let mut order = self.get_order(id).await?;
        let previous = order.status;
        order.transition(next)?;
        let updated = self
            .db
            .execute(
                "UPDATE orders SET status = ?, cancelled_at = ?, updated_at = ? WHERE id = ? AND status = ?",
                params![
                    order.status.as_str(),
                    order.cancelled_at,
                    order.updated_at,
                    order.id.as_str(),
                    previous.as_str()
                ],
            )
            .await?;
        if updated == 0 {
            return Err(CommerceError::Conflict(
                "Order status changed concurrently; reload and retry".into(),
            ));
        }
        tracing::info!(order_id = %order.id, from = %previous, to = %order.status, "order status changed");
        Ok(order)
    }
}

fn order_from_row(row: &Row) -> Result<Order, CommerceError> {
    let currency = currency_column(row, "currency")?;
    let status: OrderStatus = row.text("status")?.parse()?;
    Ok(Order {
        id: OrderId::new(row.text("id")?),
        order_number: row.text("order_number")?,
        user_id: row.opt_text("user_id")?.map(UserId::new),
        items: row.json("items")?,
        shipping_address: row.json("shipping_address")?,
        coupon_code: row.opt_text("coupon_code")?,
        subtotal: money_column(row, "subtotal", currency)?,
        discount_total: money_column(row, "discount_total", currency)?,
        shipping_total: money_column(row, "shipping_total", currency)?,
        tax_total: money_column(row, "tax_total", currency)?,
        grand_total: money_column(row, "grand_total", currency)?,
        payment: PaymentDetails {
            gateway_order_id: row.opt_text("gateway_order_id")?,
            gateway_payment_id: row.opt_text("gateway_payment_id")?,
            gateway_signature: row.opt_text("gateway_signature")?,
            is_paid: row.boolean("is_paid")?,
            paid_at: row.opt_integer("paid_at")?,
        },
        status,
        created_at: row.integer("created_at")?,
        updated_at: row.integer("updated_at")?,
        cancelled_at: row.opt_integer("cancelled_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::fixtures::order;

    fn payment(gateway_order_id: &str) -> PaymentRecord {
        PaymentRecord {
            gateway_order_id: gateway_order_id.into(),
            gateway_payment_id: "pay_1".into(),
            signature: Some("sig".into()),
        }
    }

    #[tokio::test]
    async fn test_order_round_trip() {
        let store = Store::in_memory().await.unwrap();
        let order = order();
        store.insert_order(&order).await.unwrap();
        assert_eq!(store.get_order(&order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_mark_paid_is_idempotent() {
        let store = Store::in_memory().await.unwrap();
        let order = order();
        store.insert_order(&order).await.unwrap();
        store.set_gateway_order_id(&order.id, "order_gw_1").await.unwrap();

        let (paid, first) = store.mark_order_paid(&payment("order_gw_1")).await.unwrap();
        assert!(first);
        assert!(paid.is_paid());
        assert_eq!(paid.status, OrderStatus::Confirmed);
        assert_eq!(paid.payment.gateway_signature.as_deref(), Some("sig"));

        let mut replay = payment("order_gw_1");
        replay.gateway_payment_id = "pay_2".into();
        let (again, second) = store.mark_order_paid(&replay).await.unwrap();
        assert!(!second);
        assert_eq!(again.payment.gateway_payment_id.as_deref(), Some("pay_1"));
        assert_eq!(again.payment.paid_at, paid.payment.paid_at);

        assert!(matches!(
            store.mark_order_paid(&payment("order_unknown")).await,
            Err(CommerceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_ownership() {
        let store = Store::in_memory().await.unwrap();
        let user = UserId::new("user_1");
        let mut mine = order();
        mine.user_id = Some(user.clone());
        let theirs = order();
        store.insert_order(&mine).await.unwrap();
        store.insert_order(&theirs).await.unwrap();
        store.set_gateway_order_id(&mine.id, "gw_mine").await.unwrap();
        store.mark_order_paid(&payment("gw_mine")).await.unwrap();

        let paid = store
            .list_orders(&OrderListFilter {
                paid: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].id, mine.id);

        let pending = store
            .list_orders(&OrderListFilter {
                status: Some(OrderStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, theirs.id);

        assert!(store.order_for_user(&mine.id, &user).await.is_ok());
        assert!(matches!(
            store.order_for_user(&theirs.id, &user).await,
            Err(CommerceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_status_updates_follow_state_machine() {
        let store = Store::in_memory().await.unwrap();
        let order = order();
        store.insert_order(&order).await.unwrap();

        assert!(matches!(
            store.update_order_status(&order.id, OrderStatus::Shipped).await,
            Err(CommerceError::InvalidStatusTransition { .. })
        ));
        let cancelled = store
            .update_order_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert!(cancelled.cancelled_at.is_some());
        assert_eq!(
            store.get_order(&order.id).await.unwrap().status,
            OrderStatus::Cancelled
        );
    }
}
