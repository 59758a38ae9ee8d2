use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderCode, OrderStatusType, UserId},
    order_objects::OrderQueryFilter,
};

/// Inserts a new `Pending` order under the given code. This is not atomic. Embed it in a transaction and pass
/// `&mut *tx` as the connection argument if it must go together with other writes.
///
/// A duplicate `code` surfaces as a unique-constraint violation, which the caller is expected to retry.
pub async fn insert_order(order: &NewOrder, code: &OrderCode, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (order_code, client_id, app, quantity, unit_price, total_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(code)
    .bind(order.client.id)
    .bind(&order.app)
    .bind(order.quantity)
    .bind(order.unit_price)
    .bind(order.total_price)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order [{}] inserted with id {}", order.order_code, order.id);
    Ok(order)
}

pub async fn fetch_order_by_code(code: &OrderCode, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_code = $1").bind(code).fetch_optional(conn).await
}

/// `Pending → Assigned`. Returns `None` if the order does not exist or is not pending, in which case nothing changed.
pub async fn assign_if_pending(
    code: &OrderCode,
    operator: UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET status = 'Assigned', operator_id = $1, updated_at = CURRENT_TIMESTAMP
            WHERE order_code = $2 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(operator)
    .bind(code)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ assign_if_pending({code}, {operator}) matched: {}", order.is_some());
    Ok(order)
}

/// `Assigned → Accepted`, guarded on the claiming operator.
pub async fn accept_if_assigned(
    code: &OrderCode,
    operator: UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE orders SET status = 'Accepted', updated_at = CURRENT_TIMESTAMP
            WHERE order_code = $1 AND status = 'Assigned' AND operator_id = $2
            RETURNING *;
        "#,
    )
    .bind(code)
    .bind(operator)
    .fetch_optional(conn)
    .await
}

/// Compare-and-swap cancellation. Only succeeds if the order still has the status and operator the caller observed.
pub async fn cancel_if_unchanged(
    code: &OrderCode,
    expected_status: OrderStatusType,
    expected_operator: Option<UserId>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE orders SET status = 'Cancelled', operator_id = NULL, updated_at = CURRENT_TIMESTAMP
            WHERE order_code = $1 AND status = $2 AND operator_id IS $3
            RETURNING *;
        "#,
    )
    .bind(code)
    .bind(expected_status)
    .bind(expected_operator)
    .fetch_optional(conn)
    .await
}

pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
        let mut where_clause = builder.separated(" AND ");
        if let Some(client) = query.client {
            where_clause.push("client_id = ");
            where_clause.push_bind_unseparated(client);
        }
        if let Some(operator) = query.operator {
            where_clause.push("operator_id = ");
            where_clause.push_bind_unseparated(operator);
        }
        if let Some(status) = query.status {
            where_clause.push("status = ");
            where_clause.push_bind_unseparated(status);
        }
        if let Some(app) = query.app {
            where_clause.push("app LIKE ");
            where_clause.push_bind_unseparated(format!("%{app}%"));
        }
        if let Some(since) = query.since {
            where_clause.push("datetime(created_at) >= datetime(");
            where_clause.push_bind_unseparated(since);
            where_clause.push_unseparated(")");
        }
        if let Some(until) = query.until {
            where_clause.push("datetime(created_at) <= datetime(");
            where_clause.push_bind_unseparated(until);
            where_clause.push_unseparated(")");
        }
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_orders: {} rows", orders.len());
    Ok(orders)
}
