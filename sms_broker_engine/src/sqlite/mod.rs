//! SQLite backend for the SMS broker.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
