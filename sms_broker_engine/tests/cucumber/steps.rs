use cucumber::{then, when};
use sms_broker_engine::{
    db_types::{Actor, DepositStatusType, Money, OrderStatusType, UserId, UserProfile},
    AccountManagement,
};

use crate::cucumber::BrokerWorld;

fn profile(id: i64, role: &str) -> UserProfile {
    UserProfile::new(UserId(id), format!("{role} {id}"))
}

fn money(s: &str) -> Money {
    s.parse::<Money>().unwrap_or_else(|e| panic!("{s} is not a valid amount. {e}"))
}

//-----------------------------------------------   Orders   ----------------------------------------------------------

#[when(expr = "client {int} orders {int} {string} codes as order {word}")]
async fn submit_order(world: &mut BrokerWorld, client: i64, quantity: i64, app: String, label: String) {
    let sys = world.system();
    let result = sys.orders.submit_order(&profile(client, "Client"), &app, quantity, sys.base_price).await;
    if let Some(order) = world.record(result) {
        world.orders.insert(label, order.order_code);
    }
}

#[when(expr = "operator {int} claims order {word}")]
async fn claim_order(world: &mut BrokerWorld, operator: i64, label: String) {
    let code = world.order_code(&label);
    let result = world.system().orders.claim_order(&code, &profile(operator, "Operator")).await;
    if let Some(claimed) = world.record(result) {
        world.last_claim = Some(claimed);
    }
}

#[when(expr = "operator {int} answers the challenge {word}")]
async fn answer_challenge(world: &mut BrokerWorld, operator: i64, how: String) {
    let claimed = world.last_claim.clone().expect("Nobody has claimed an order yet");
    let want_correct = match how.as_str() {
        "correctly" => true,
        "wrongly" => false,
        _ => panic!("Answer the challenge 'correctly' or 'wrongly', not '{how}'"),
    };
    let answer = claimed
        .challenge
        .answers(&claimed.order.order_code)
        .into_iter()
        .find(|a| a.is_correct() == want_correct)
        .expect("No suitable answer on offer");
    let result = world.system().orders.verify_challenge(&answer, UserId(operator)).await;
    world.record(result);
}

#[when(expr = "operator {int} asks for a new challenge for order {word}")]
async fn new_challenge(world: &mut BrokerWorld, operator: i64, label: String) {
    let code = world.order_code(&label);
    let result = world.system().orders.reissue_challenge(&code, UserId(operator)).await;
    if let Some(claimed) = world.record(result) {
        world.last_claim = Some(claimed);
    }
}

#[when(expr = "{word} {int} cancels order {word}")]
async fn cancel_order(world: &mut BrokerWorld, role: String, user: i64, label: String) {
    let actor = match role.as_str() {
        "client" => Actor::Client(UserId(user)),
        "admin" => Actor::Admin(UserId(user)),
        _ => panic!("Unknown role {role}"),
    };
    let code = world.order_code(&label);
    let result = world.system().orders.cancel_order(&code, actor).await;
    world.record(result);
}

#[then(expr = "order {word} has status {string}")]
async fn order_status(world: &mut BrokerWorld, label: String, status: String) {
    let code = world.order_code(&label);
    let order = world.system().orders.fetch_order(&code).await.expect("Error fetching order").expect("No such order");
    let expected = status.parse::<OrderStatusType>().expect("Not an order status");
    assert_eq!(order.status, expected, "Status is incorrect");
}

#[then(expr = "order {word} costs {word}")]
async fn order_total(world: &mut BrokerWorld, label: String, total: String) {
    let code = world.order_code(&label);
    let order = world.system().orders.fetch_order(&code).await.unwrap().expect("No such order");
    assert_eq!(order.total_price, money(&total), "Total price is incorrect");
}

#[then(expr = "order {word} has a unit price of {word}")]
async fn order_unit_price(world: &mut BrokerWorld, label: String, price: String) {
    let code = world.order_code(&label);
    let order = world.system().orders.fetch_order(&code).await.unwrap().expect("No such order");
    assert_eq!(order.unit_price, money(&price), "Unit price is incorrect");
}

#[then(expr = "order {word} is assigned to operator {int}")]
async fn order_operator(world: &mut BrokerWorld, label: String, operator: i64) {
    let code = world.order_code(&label);
    let order = world.system().orders.fetch_order(&code).await.unwrap().expect("No such order");
    assert_eq!(order.operator_id, Some(UserId(operator)), "Wrong operator");
}

#[then(expr = "order {word} has no operator")]
async fn order_without_operator(world: &mut BrokerWorld, label: String) {
    let code = world.order_code(&label);
    let order = world.system().orders.fetch_order(&code).await.unwrap().expect("No such order");
    assert!(order.operator_id.is_none(), "Order still has operator {:?}", order.operator_id);
}

#[then(expr = "operator {int} has accepted {int} order(s)")]
async fn operator_accepted(world: &mut BrokerWorld, operator: i64, count: i64) {
    let operator = world.system().db.fetch_operator(UserId(operator)).await.unwrap().expect("No such operator");
    assert_eq!(operator.accepted, count, "Accepted count is incorrect");
}

//-----------------------------------------------  Deposits  ----------------------------------------------------------

#[when(expr = "client {int} opens a deposit of {word} as deposit {word}")]
async fn open_deposit(world: &mut BrokerWorld, client: i64, amount: String, label: String) {
    let result = world.system().deposits.open_deposit(&profile(client, "Client"), money(&amount)).await;
    if let Some(deposit) = world.record(result) {
        world.deposits.insert(label, deposit.operation_code);
    }
}

#[when(expr = "client {int} uploads receipt {string} for deposit {word}")]
async fn upload_receipt(world: &mut BrokerWorld, _client: i64, receipt: String, label: String) {
    let code = world.operation_code(&label);
    let result = world.system().deposits.attach_receipt(&code, &receipt).await;
    world.record(result);
}

#[when(expr = "staff {word} deposit {word}")]
async fn resolve_deposit(world: &mut BrokerWorld, decision: String, label: String) {
    let code = world.operation_code(&label);
    let deposits = &world.system().deposits;
    match decision.as_str() {
        "accept" => {
            let result = deposits.resolve_accept(&code).await;
            world.record(result);
        },
        "reject" => {
            let result = deposits.resolve_reject(&code).await;
            world.record(result);
        },
        _ => panic!("Staff can 'accept' or 'reject' a deposit, not '{decision}'"),
    }
}

#[then(expr = "deposit {word} has status {string}")]
async fn deposit_status(world: &mut BrokerWorld, label: String, status: String) {
    let code = world.operation_code(&label);
    let deposit = world.system().deposits.fetch_deposit(&code).await.unwrap().expect("No such deposit");
    let expected = match status.as_str() {
        "Pending" => DepositStatusType::Pending,
        "Accepted" => DepositStatusType::Accepted,
        "Rejected" => DepositStatusType::Rejected,
        _ => panic!("Unknown deposit status {status}"),
    };
    assert_eq!(deposit.status, expected, "Status is incorrect");
}

#[then(expr = "client {int} has a balance of {word}")]
async fn client_balance(world: &mut BrokerWorld, client: i64, balance: String) {
    let client = world.system().accounts.client(UserId(client)).await.unwrap().expect("No such client");
    assert_eq!(client.balance, money(&balance), "Balance is incorrect");
}

#[then(expr = "client {int} has placed {int} order(s)")]
async fn client_orders(world: &mut BrokerWorld, client: i64, count: i64) {
    let client = world.system().accounts.client(UserId(client)).await.unwrap().expect("No such client");
    assert_eq!(client.orders_count, count, "Order count is incorrect");
}

//-----------------------------------------------  Outcomes  ----------------------------------------------------------

#[then("the last request was refused")]
async fn refused(world: &mut BrokerWorld) {
    assert!(world.last_error.is_some(), "The last request succeeded");
}

#[then("the last request succeeded")]
async fn succeeded(world: &mut BrokerWorld) {
    assert!(world.last_error.is_none(), "The last request failed: {:?}", world.last_error);
}
