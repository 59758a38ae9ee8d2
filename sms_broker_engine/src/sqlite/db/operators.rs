use sqlx::SqliteConnection;

use crate::db_types::{Operator, UserId, UserProfile};

/// Inserts the operator if they have not been seen before. Existing records keep their balance and counters; only the
/// display name is refreshed.
pub async fn fetch_or_create(user: &UserProfile, conn: &mut SqliteConnection) -> Result<Operator, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO operators (user_id, name) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET name = excluded.name
            RETURNING *;
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .fetch_one(conn)
    .await
}

pub async fn fetch_operator(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<Operator>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM operators WHERE user_id = $1").bind(user_id).fetch_optional(conn).await
}

pub async fn increment_accepted(user_id: UserId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE operators SET accepted = accepted + 1, updated_at = CURRENT_TIMESTAMP WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn increment_cancelled(user_id: UserId, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE operators SET cancelled = cancelled + 1, updated_at = CURRENT_TIMESTAMP WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}
