use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{Client, Money, UserId, UserProfile};

/// Returns the client for `user`, inserting a new record on first contact. The display name is refreshed if it has
/// changed.
pub async fn fetch_or_create(user: &UserProfile, conn: &mut SqliteConnection) -> Result<Client, sqlx::Error> {
    let client = sqlx::query_as(
        r#"
            INSERT INTO clients (user_id, name) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET name = excluded.name
            RETURNING *;
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Fetched or created client {}", user.id);
    Ok(client)
}

/// Same as [`fetch_or_create`], but also bumps the client's lifetime order count.
pub async fn upsert_for_new_order(user: &UserProfile, conn: &mut SqliteConnection) -> Result<Client, sqlx::Error> {
    let client = sqlx::query_as(
        r#"
            INSERT INTO clients (user_id, name, orders_count) VALUES ($1, $2, 1)
            ON CONFLICT (user_id) DO UPDATE SET
                name = excluded.name,
                orders_count = orders_count + 1,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .fetch_one(conn)
    .await?;
    Ok(client)
}

pub async fn fetch_client(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM clients WHERE user_id = $1").bind(user_id).fetch_optional(conn).await
}

/// Adds `amount` to the client's balance, returning the updated record, or `None` if the client does not exist.
/// This is not atomic on its own; call it inside the transaction that resolves the deposit.
pub async fn credit_balance(
    user_id: UserId,
    amount: Money,
    conn: &mut SqliteConnection,
) -> Result<Option<Client>, sqlx::Error> {
    sqlx::query_as(
        r#"
            UPDATE clients SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $2
            RETURNING *;
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}
