use log::*;
use sms_broker_engine::{
    db_types::{UserId, UserProfile},
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// A migrated database in a fresh temp file.
pub async fn prepare_test_env() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = format!(
        "sqlite://{}",
        std::env::temp_dir().join(format!("smsb_it_{}.db", rand::random::<u64>())).display()
    );
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error connecting to database");
    db.run_migrations().await.expect("Error running migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

pub async fn tear_down(db: SqliteDatabase) {
    use sms_broker_engine::BrokerDatabase;
    let url = db.url().to_string();
    db.close().await;
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Could not remove test database {url}: {e}");
    }
}

pub fn user(id: i64, name: &str) -> UserProfile {
    UserProfile::new(UserId(id), name)
}
