use actix_web::{http::StatusCode, test::TestRequest, web};
use sms_broker_engine::{db_types::UserId, AccountApi};

use super::{
    helpers::{bearer, send, send_with_token, TOKEN},
    mocks::MockAccountManager,
};
use crate::routes::OperatorRoute;

fn configure(cfg: &mut web::ServiceConfig) {
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_operator().returning(|_| Ok(None));
    cfg.app_data(web::Data::new(AccountApi::new(accounts))).service(OperatorRoute::<MockAccountManager>::new());
}

#[actix_web::test]
async fn requests_without_a_token_are_refused() {
    let (status, body) = send(TestRequest::get().uri("/api/operators/5"), configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No Authorization header was provided"}"#);
}

#[actix_web::test]
async fn wrong_tokens_are_refused() {
    let req = TestRequest::get().uri("/api/operators/5").insert_header(("Authorization", "Bearer nope"));
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. Invalid API token"}"#);

    let req = TestRequest::get().uri("/api/operators/5").insert_header(("Authorization", format!("Basic {TOKEN}")));
    let (status, _) = send(req, configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn an_empty_token_locks_the_api() {
    let req = TestRequest::get().uri("/api/operators/5").insert_header(("Authorization", "Bearer "));
    let (status, _) = send_with_token(req, "", configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn valid_tokens_reach_the_handler() {
    let req = TestRequest::get().uri("/api/operators/5").insert_header(bearer());
    let (status, body) = send(req, configure).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, format!(r#"{{"error":"The data was not found. Operator {}"}}"#, UserId(5)));
}
