use actix_web::{http::StatusCode, test::TestRequest, web};
use sms_broker_engine::{
    db_types::{Deposit, DepositStatusType, Money, UserId},
    AccountApi,
    DepositFlowApi,
    SqliteDatabase,
};

use super::helpers::{acting_as, bearer, close_db, send, test_db, user, ADMIN};
use crate::{
    data_objects::AcceptedDeposit,
    routes::{AcceptDepositRoute, DepositByCodeRoute, DepositsSearchRoute, RejectDepositRoute},
};

fn with_deposits(db: &SqliteDatabase, api: DepositFlowApi<SqliteDatabase>) -> impl FnOnce(&mut web::ServiceConfig) {
    let accounts = AccountApi::new(db.clone());
    move |cfg| {
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(accounts))
            .service(DepositsSearchRoute::<SqliteDatabase>::new())
            .service(DepositByCodeRoute::<SqliteDatabase>::new())
            .service(AcceptDepositRoute::<SqliteDatabase>::new())
            .service(RejectDepositRoute::<SqliteDatabase>::new());
    }
}

#[actix_web::test]
async fn accept_credits_the_client_once() {
    let (db, producers) = test_db().await;
    let api = DepositFlowApi::new(db.clone(), producers);
    let deposit = api.open_deposit(&user(100, "Alice"), Money::from_cents(12_550)).await.unwrap();
    api.attach_receipt(&deposit.operation_code, "receipt.jpg").await.unwrap();
    let uri = format!("/api/deposits/{}/accept", deposit.operation_code);

    let req = TestRequest::post().uri(&uri).insert_header(bearer()).insert_header(acting_as(UserId(100)));
    let (status, _) = send(req, with_deposits(&db, api.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = TestRequest::post().uri(&uri).insert_header(bearer()).insert_header(acting_as(ADMIN));
    let (status, body) = send(req, with_deposits(&db, api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let accepted: AcceptedDeposit = serde_json::from_str(&body).unwrap();
    assert_eq!(accepted.deposit.status, DepositStatusType::Accepted);
    assert_eq!(accepted.client.balance, Money::from_cents(12_550));

    let req = TestRequest::post().uri(&uri).insert_header(bearer()).insert_header(acting_as(ADMIN));
    let (status, _) = send(req, with_deposits(&db, api.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let reject = format!("/api/deposits/{}/reject", deposit.operation_code);
    let req = TestRequest::post().uri(&reject).insert_header(bearer()).insert_header(acting_as(ADMIN));
    let (status, _) = send(req, with_deposits(&db, api)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let client = AccountApi::new(db.clone()).client(UserId(100)).await.unwrap().unwrap();
    assert_eq!(client.balance, Money::from_cents(12_550));
    close_db(db).await;
}

#[actix_web::test]
async fn reject_and_search() {
    let (db, producers) = test_db().await;
    let api = DepositFlowApi::new(db.clone(), producers);
    let first = api.open_deposit(&user(100, "Alice"), Money::from_units(50)).await.unwrap();
    let second = api.open_deposit(&user(100, "Alice"), Money::from_units(20)).await.unwrap();

    let uri = format!("/api/deposits/{}/reject", first.operation_code);
    let req = TestRequest::post().uri(&uri).insert_header(bearer()).insert_header(acting_as(ADMIN));
    let (status, body) = send(req, with_deposits(&db, api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let rejected: Deposit = serde_json::from_str(&body).unwrap();
    assert_eq!(rejected.status, DepositStatusType::Rejected);

    let req = TestRequest::get().uri("/api/deposits?client=100&status=Pending").insert_header(bearer());
    let (status, body) = send(req, with_deposits(&db, api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let pending: Vec<Deposit> = serde_json::from_str(&body).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].operation_code, second.operation_code);

    let req = TestRequest::get().uri(&format!("/api/deposits/{}", second.operation_code)).insert_header(bearer());
    let (status, body) = send(req, with_deposits(&db, api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Deposit = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched.amount, Money::from_units(20));

    let req = TestRequest::get().uri("/api/deposits/REC-000000000000-NOPE").insert_header(bearer());
    let (status, _) = send(req, with_deposits(&db, api)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let client = AccountApi::new(db.clone()).client(UserId(100)).await.unwrap().unwrap();
    assert_eq!(client.balance, Money::ZERO);
    close_db(db).await;
}
