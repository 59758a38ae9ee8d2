use actix_web::{http::StatusCode, test::TestRequest, web};
use serde_json::json;
use sms_broker_engine::{
    db_types::{Money, UserId},
    dialog::{DialogFlow, Reply},
    events::EventProducers,
    pricing::PriceSchedule,
    session::SessionStore,
    SqliteDatabase,
};

use super::helpers::{bearer, close_db, send, test_db, ADMIN};
use crate::{data_objects::DialogResponse, routes::DialogRoute};

fn with_dialog(flow: web::Data<DialogFlow<SqliteDatabase>>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(flow).service(DialogRoute::<SqliteDatabase>::new());
    }
}

async fn say(flow: &web::Data<DialogFlow<SqliteDatabase>>, body: serde_json::Value) -> (StatusCode, String) {
    let req = TestRequest::post().uri("/api/dialog").insert_header(bearer()).set_json(body);
    send(req, with_dialog(flow.clone())).await
}

async fn reply(flow: &web::Data<DialogFlow<SqliteDatabase>>, body: serde_json::Value) -> Reply {
    let (status, body) = say(flow, body).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let response: DialogResponse = serde_json::from_str(&body).unwrap();
    response.reply
}

#[actix_web::test]
async fn dialog_webhook_drives_the_session() {
    let (db, _) = test_db().await;
    let sessions = SessionStore::default();
    let prices = PriceSchedule::new(Money::from_units(10));
    let flow = web::Data::new(DialogFlow::new(db.clone(), EventProducers::default(), sessions.clone(), prices, [ADMIN]));

    let welcome = reply(&flow, json!({"user_id": 100, "name": "Alice", "intent": {"type": "text", "value": "/start"}})).await;
    assert_eq!(welcome, Reply::Welcome { name: "Alice".into(), balance: Money::ZERO });

    let ask = reply(&flow, json!({"user_id": 100, "name": "Alice", "intent": {"type": "button", "value": "deposit"}})).await;
    assert_eq!(ask, Reply::AskDepositAmount);
    let confirm = reply(&flow, json!({"user_id": 100, "intent": {"type": "text", "value": "100.50"}})).await;
    assert_eq!(confirm, Reply::ConfirmDeposit { amount: Money::from_cents(10_050) });
    assert!(!sessions.current_step(UserId(100)).is_idle());

    let cancelled = reply(&flow, json!({"user_id": 100, "intent": {"type": "text", "value": "/cancel"}})).await;
    assert_eq!(cancelled, Reply::Cancelled);
    assert!(sessions.is_empty());
    close_db(db).await;
}

#[actix_web::test]
async fn malformed_dialog_events_are_rejected() {
    let (db, _) = test_db().await;
    let prices = PriceSchedule::new(Money::from_units(10));
    let flow = web::Data::new(DialogFlow::new(
        db.clone(),
        EventProducers::default(),
        SessionStore::default(),
        prices,
        [ADMIN],
    ));
    let (status, _) = say(&flow, json!({"user_id": 100, "intent": {"type": "button", "value": "referidos"}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = say(&flow, json!({"name": "Alice", "intent": {"type": "start"}})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Non-staff pressing a staff button is told so, not failed
    let denied = reply(&flow, json!({"user_id": 100, "intent": {"type": "button", "value": "deposit_accept|REC-1"}})).await;
    assert_eq!(denied, Reply::NotAuthorized);
    close_db(db).await;
}
