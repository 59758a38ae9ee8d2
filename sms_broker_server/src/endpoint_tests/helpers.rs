use actix_web::{
    body::to_bytes,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use log::debug;
use sms_broker_engine::{
    db_types::{Money, UserId, UserProfile},
    events::EventProducers,
    test_utils::prepare_env::{drop_database, prepare_test_env, random_db_path},
    traits::BrokerDatabase,
    SqliteDatabase,
};
use smsb_common::Secret;

use crate::{config::ServerOptions, middleware::BearerAuthFactory};

pub const TOKEN: &str = "correct-horse-battery-staple";
pub const ADMIN: UserId = UserId(1);

pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TOKEN}"))
}

pub fn acting_as(user: UserId) -> (&'static str, String) {
    ("X-Actor-Id", user.to_string())
}

pub fn options() -> web::Data<ServerOptions> {
    web::Data::new(ServerOptions { admin_ids: vec![ADMIN], price_per_sms: Money::from_units(10) })
}

pub fn user(id: i64, name: &str) -> UserProfile {
    UserProfile::new(UserId(id), name)
}

/// Sends `req` to an `/api` scope configured by `configure` and guarded by [`TOKEN`].
///
/// Errors raised by middleware are turned into responses the way the server would, so every outcome is a status code
/// and a body.
pub async fn send<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    send_with_token(req, TOKEN, configure).await
}

pub async fn send_with_token<F>(req: TestRequest, token: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init();
    let scope = web::scope("/api").wrap(BearerAuthFactory::new(Secret::new(token.to_string()))).configure(configure);
    let app = App::new().app_data(options()).service(scope);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.unwrap_or_default();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

/// A migrated SQLite database in the temp directory, plus producers that publish nowhere.
pub async fn test_db() -> (SqliteDatabase, EventProducers) {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    (db, EventProducers::default())
}

pub async fn close_db(db: SqliteDatabase) {
    let url = db.url().to_string();
    db.close().await;
    drop_database(&url).await;
}
