use chrono::Utc;
use log::{debug, trace};
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, PaidTransition},
    traits::StoreError,
};

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false)
}

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// The status is set from the payment method: `pending_payment` for online orders, `pending_cash` for cash orders.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StoreError> {
    let status = order.status();
    let order_id = order.order_id.clone();
    let result = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                business_id,
                payment_method,
                status,
                total_amount,
                platform_fee,
                seller_amount,
                currency,
                line_items,
                customer,
                intent_fingerprint,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.business_id)
    .bind(order.payment_method)
    .bind(status)
    .bind(order.total_amount)
    .bind(order.platform_fee)
    .bind(order.seller_amount)
    .bind(order.currency)
    .bind(Json(order.line_items))
    .bind(Json(order.customer))
    .bind(order.intent_fingerprint)
    .bind(order.created_at)
    .bind(order.created_at)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => Ok(order),
        Err(e) if is_unique_violation(&e) => Err(StoreError::OrderAlreadyExists(order_id)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_gateway_order_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_order_id = $1")
        .bind(gateway_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Orders for the business, ordered by `created_at` in ascending order
pub async fn fetch_orders_for_business(
    business_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE business_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(business_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_pending_order_by_fingerprint(
    business_id: i64,
    fingerprint: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE business_id = $1
              AND intent_fingerprint = $2
              AND status = 'pending_payment'
              AND gateway_order_id IS NOT NULL
            ORDER BY id DESC
            LIMIT 1
        "#,
    )
    .bind(business_id)
    .bind(fingerprint)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Links the gateway order id to a `pending_payment` order.
pub async fn attach_gateway_order(
    order_id: &OrderId,
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, StoreError> {
    let result: Result<Option<Order>, sqlx::Error> = sqlx::query_as(
        r#"
            UPDATE orders SET gateway_order_id = $1, updated_at = $2
            WHERE order_id = $3 AND status = 'pending_payment'
            RETURNING *;
        "#,
    )
    .bind(gateway_order_id)
    .bind(Utc::now())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await;
    match result {
        Ok(Some(order)) => {
            trace!("🗃️ Order {order_id} linked to gateway order {gateway_order_id}");
            Ok(order)
        },
        Ok(None) => Err(StoreError::OrderNotFound(order_id.clone())),
        Err(e) if is_unique_violation(&e) => Err(StoreError::GatewayOrderAlreadyAttached(gateway_order_id.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// The conditional `pending_payment -> paid` update. Returns `None` if no row was changed, i.e. there is no pending
/// order for the gateway order id. Only one of any number of concurrent callers can ever get `Some` back.
pub async fn try_mark_paid(
    business_id: Option<i64>,
    gateway_order_id: &str,
    payment_id: &str,
    signature: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = $1, gateway_payment_id = $2, gateway_signature = $3, updated_at = $4
            WHERE gateway_order_id = $5
              AND status = $6
              AND ($7 IS NULL OR business_id = $7)
            RETURNING *;
        "#,
    )
    .bind(OrderStatusType::Paid)
    .bind(payment_id)
    .bind(signature)
    .bind(Utc::now())
    .bind(gateway_order_id)
    .bind(OrderStatusType::PendingPayment)
    .bind(business_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Marks the order as paid, or reports that it was already settled.
pub async fn mark_order_paid(
    business_id: Option<i64>,
    gateway_order_id: &str,
    payment_id: &str,
    signature: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<PaidTransition>, StoreError> {
    if let Some(order) = try_mark_paid(business_id, gateway_order_id, payment_id, signature, conn).await? {
        debug!("🗃️ Order {} for gateway order {gateway_order_id} marked as paid", order.order_id);
        return Ok(Some(PaidTransition { order, newly_paid: true }));
    }
    let existing = fetch_order_by_gateway_order_id(gateway_order_id, conn)
        .await?
        .filter(|o| business_id.map(|id| id == o.business_id).unwrap_or(true));
    match existing {
        Some(order) => {
            trace!("🗃️ Gateway order {gateway_order_id} was not pending (status {}). Nothing written.", order.status);
            Ok(Some(PaidTransition { order, newly_paid: false }))
        },
        None => Ok(None),
    }
}
