use actix_web::{http::StatusCode, test::TestRequest, web};
use sms_broker_engine::{
    db_types::{Money, Order, OrderStatusType, UserId},
    OrderFlowApi,
    SqliteDatabase,
};

use super::helpers::{acting_as, bearer, close_db, send, test_db, user, ADMIN};
use crate::routes::{CancelOrderRoute, OrderByCodeRoute};

fn with_orders(api: OrderFlowApi<SqliteDatabase>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(api))
            .service(OrderByCodeRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new());
    }
}

fn path_for(order: &Order, suffix: &str) -> String {
    format!("/api/orders/{}{suffix}", order.order_code.as_str().trim_start_matches('#'))
}

#[actix_web::test]
async fn fetch_order_by_code() {
    let (db, producers) = test_db().await;
    let api = OrderFlowApi::new(db.clone(), producers);
    let order = api.submit_order(&user(100, "Alice"), "WhatsApp", 3, Money::from_units(10)).await.unwrap();

    let req = TestRequest::get().uri(&path_for(&order, "")).insert_header(bearer());
    let (status, body) = send(req, with_orders(api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched.order_code, order.order_code);
    assert_eq!(fetched.total_price, Money::from_units(30));

    let req = TestRequest::get().uri("/api/orders/9999-ZZZ").insert_header(bearer());
    let (status, body) = send(req, with_orders(api)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order #9999-ZZZ"}"#);
    close_db(db).await;
}

#[actix_web::test]
async fn admins_cancel_assigned_orders() {
    let (db, producers) = test_db().await;
    let api = OrderFlowApi::new(db.clone(), producers);
    let order = api.submit_order(&user(100, "Alice"), "Telegram", 2, Money::from_units(10)).await.unwrap();
    api.claim_order(&order.order_code, &user(500, "Olga")).await.unwrap();

    // No actor, or an actor who is not an admin
    let req = TestRequest::post().uri(&path_for(&order, "/cancel")).insert_header(bearer());
    let (status, _) = send(req, with_orders(api.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let req =
        TestRequest::post().uri(&path_for(&order, "/cancel")).insert_header(bearer()).insert_header(acting_as(UserId(100)));
    let (status, _) = send(req, with_orders(api.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::post().uri(&path_for(&order, "/cancel")).insert_header(bearer()).insert_header(acting_as(ADMIN));
    let (status, body) = send(req, with_orders(api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let cancelled: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);
    assert_eq!(cancelled.operator_id, None);

    // Cancelling twice is harmless
    let req = TestRequest::post().uri(&path_for(&order, "/cancel")).insert_header(bearer()).insert_header(acting_as(ADMIN));
    let (status, body) = send(req, with_orders(api)).await;
    assert_eq!(status, StatusCode::OK);
    let cancelled: Order = serde_json::from_str(&body).unwrap();
    assert_eq!(cancelled.status, OrderStatusType::Cancelled);
    close_db(db).await;
}

#[actix_web::test]
async fn accepted_orders_cannot_be_cancelled() {
    let (db, producers) = test_db().await;
    let api = OrderFlowApi::new(db.clone(), producers);
    let order = api.submit_order(&user(100, "Alice"), "Signal", 1, Money::from_units(10)).await.unwrap();
    let claimed = api.claim_order(&order.order_code, &user(500, "Olga")).await.unwrap();
    let answer = claimed.challenge.answers(&order.order_code).into_iter().find(|a| a.is_correct()).unwrap();
    api.verify_challenge(&answer, UserId(500)).await.unwrap();

    let req = TestRequest::post().uri(&path_for(&order, "/cancel")).insert_header(bearer()).insert_header(acting_as(ADMIN));
    let (status, _) = send(req, with_orders(api.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let order = api.fetch_order(&order.order_code).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Accepted);
    close_db(db).await;
}
