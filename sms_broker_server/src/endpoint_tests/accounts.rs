use actix_web::{http::StatusCode, test::TestRequest, web};
use chrono::{TimeZone, Utc};
use sms_broker_engine::{
    db_types::{Client, Money, Operator, Order, OrderCode, OrderStatusType, UserId},
    traits::AccountApiError,
    AccountApi,
};

use super::{
    helpers::{acting_as, bearer, send, ADMIN},
    mocks::MockAccountManager,
};
use crate::routes::{ClientHistoryRoute, ClientRoute, OperatorRoute, OrdersSearchRoute, RegisterOperatorRoute};

fn client() -> Client {
    Client {
        id: 1,
        user_id: UserId(100),
        name: "Alice".into(),
        balance: Money::from_cents(12_550),
        orders_count: 2,
        created_at: Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 10, 2, 12, 0, 0).unwrap(),
    }
}

fn operator() -> Operator {
    Operator {
        id: 1,
        user_id: UserId(500),
        name: "Olga".into(),
        retirable_balance: Money::ZERO,
        accepted: 3,
        completed: 0,
        cancelled: 1,
        created_at: Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap(),
    }
}

fn order() -> Order {
    Order {
        id: 1,
        order_code: OrderCode::from("#0001-AAA"),
        client_id: UserId(100),
        app: "WhatsApp".into(),
        quantity: 30,
        unit_price: Money::from_units(9),
        total_price: Money::from_units(270),
        status: OrderStatusType::Pending,
        operator_id: None,
        created_at: Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap(),
    }
}

fn with_accounts(accounts: MockAccountManager) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AccountApi::new(accounts)))
            .service(OrdersSearchRoute::<MockAccountManager>::new())
            .service(ClientRoute::<MockAccountManager>::new())
            .service(ClientHistoryRoute::<MockAccountManager>::new())
            .service(OperatorRoute::<MockAccountManager>::new())
            .service(RegisterOperatorRoute::<MockAccountManager>::new());
    }
}

#[actix_web::test]
async fn fetch_client() {
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_client().withf(|id| *id == UserId(100)).times(1).returning(|_| Ok(Some(client())));
    let req = TestRequest::get().uri("/api/clients/100").insert_header(bearer());
    let (status, body) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Client = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched, client());
}

#[actix_web::test]
async fn unknown_clients_are_not_found() {
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_client().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/api/clients/404").insert_header(bearer());
    let (status, _) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_client().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/api/clients/404/history").insert_header(bearer());
    let (status, _) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn client_history() {
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_client().returning(|_| Ok(Some(client())));
    accounts
        .expect_search_orders()
        .withf(|q| q.client == Some(UserId(100)) && q.limit == Some(10))
        .times(1)
        .returning(|_| Ok(vec![order()]));
    accounts.expect_search_deposits().times(1).returning(|_| Ok(vec![]));
    let req = TestRequest::get().uri("/api/clients/100/history").insert_header(bearer());
    let (status, body) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::OK);
    let history: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(history["client"]["name"], "Alice");
    assert_eq!(history["orders"][0]["order_code"], "#0001-AAA");
    assert_eq!(history["deposits"].as_array().map(|d| d.len()), Some(0));
}

#[actix_web::test]
async fn search_orders() {
    let mut accounts = MockAccountManager::new();
    accounts
        .expect_search_orders()
        .withf(|q| {
            q.client == Some(UserId(100)) && q.status == Some(OrderStatusType::Pending) && q.operator.is_none()
        })
        .times(1)
        .returning(|_| Ok(vec![order()]));
    let req = TestRequest::get().uri("/api/orders?client=100&status=Pending").insert_header(bearer());
    let (status, body) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Vec<Order> = serde_json::from_str(&body).unwrap();
    assert_eq!(orders, vec![order()]);
}

#[actix_web::test]
async fn search_orders_with_bad_filters() {
    let accounts = MockAccountManager::new();
    let req = TestRequest::get().uri("/api/orders?colour=blue").insert_header(bearer());
    let (status, _) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut accounts = MockAccountManager::new();
    accounts.expect_search_orders().returning(|_| Err(AccountApiError::QueryError("since is after until".into())));
    let req = TestRequest::get().uri("/api/orders?client=1").insert_header(bearer());
    let (status, body) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"since is after until"}"#);
}

#[actix_web::test]
async fn fetch_operator() {
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_operator().returning(|_| Ok(Some(operator())));
    let req = TestRequest::get().uri("/api/operators/500").insert_header(bearer());
    let (status, body) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Operator = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched.accepted, 3);
}

#[actix_web::test]
async fn only_admins_register_operators() {
    let accounts = MockAccountManager::new();
    let req = TestRequest::post()
        .uri("/api/operators")
        .insert_header(bearer())
        .insert_header(acting_as(UserId(42)))
        .set_json(serde_json::json!({"user_id": 500, "name": "Olga"}));
    let (status, _) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut accounts = MockAccountManager::new();
    accounts
        .expect_register_operator()
        .withf(|u| u.id == UserId(500) && u.name == "Olga")
        .times(1)
        .returning(|_| Ok(operator()));
    let req = TestRequest::post()
        .uri("/api/operators")
        .insert_header(bearer())
        .insert_header(acting_as(ADMIN))
        .set_json(serde_json::json!({"user_id": 500, "name": "Olga"}));
    let (status, body) = send(req, with_accounts(accounts)).await;
    assert_eq!(status, StatusCode::OK);
    let registered: Operator = serde_json::from_str(&body).unwrap();
    assert_eq!(registered.user_id, UserId(500));
}
