//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! Every state transition is written as a conditional `UPDATE … WHERE status = …`, so a transition that lost a race
//! simply matches no rows. The first statement in every write transaction is a write, which makes SQLite take the
//! write lock up front; competing writers then queue on the busy timeout rather than deadlocking on a lock upgrade.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod clients;
pub mod deposits;
pub mod operators;
pub mod orders;

const SQLITE_DB_URL: &str = "sqlite://data/sms_broker.db";
/// The longest any statement waits for a competing writer before giving up with a "database is locked" error.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);
/// How many times an insert is retried with a fresh code after hitting a uniqueness constraint.
pub const MAX_CODE_ATTEMPTS: usize = 5;

pub fn db_url() -> String {
    let result = env::var("SMSB_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ SMSB_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true).busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

pub(crate) fn is_unique_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(err) if err.is_unique_violation())
}
