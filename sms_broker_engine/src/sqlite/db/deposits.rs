use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{Deposit, DepositStatusType, Money, OperationCode, UserId},
    order_objects::DepositQueryFilter,
};

/// Inserts a `Pending` deposit. A duplicate `code` surfaces as a unique-constraint violation.
pub async fn insert_deposit(
    client: UserId,
    amount: Money,
    code: &OperationCode,
    conn: &mut SqliteConnection,
) -> Result<Deposit, sqlx::Error> {
    let deposit: Deposit = sqlx::query_as(
        r#"
            INSERT INTO deposits (operation_code, client_id, amount) VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(code)
    .bind(client)
    .bind(amount)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Deposit [{}] inserted with id {}", deposit.operation_code, deposit.id);
    Ok(deposit)
}

pub async fn fetch_deposit_by_code(
    code: &OperationCode,
    conn: &mut SqliteConnection,
) -> Result<Option<Deposit>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM deposits WHERE operation_code = $1").bind(code).fetch_optional(conn).await
}

/// Sets the receipt on a deposit that is still pending. Uploading a second receipt replaces the first.
pub async fn attach_receipt_if_pending(
    code: &OperationCode,
    receipt: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Deposit>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE deposits SET receipt_path = $1, updated_at = CURRENT_TIMESTAMP
            WHERE operation_code = $2 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(receipt)
    .bind(code)
    .fetch_optional(conn)
    .await
}

/// `Pending → Accepted` or `Pending → Rejected`. Returns `None` if the deposit is missing or already resolved.
pub async fn resolve_if_pending(
    code: &OperationCode,
    status: DepositStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Deposit>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE deposits SET status = $1, resolved_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE operation_code = $2 AND status = 'Pending'
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(code)
    .fetch_optional(conn)
    .await
}

pub async fn search_deposits(
    query: DepositQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Deposit>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM deposits ");
    if !query.is_empty() {
        builder.push("WHERE ");
        let mut where_clause = builder.separated(" AND ");
        if let Some(client) = query.client {
            where_clause.push("client_id = ");
            where_clause.push_bind_unseparated(client);
        }
        if let Some(status) = query.status {
            where_clause.push("status = ");
            where_clause.push_bind_unseparated(status);
        }
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let deposits = builder.build_query_as::<Deposit>().fetch_all(conn).await?;
    Ok(deposits)
}
