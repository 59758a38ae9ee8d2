//! Outbound notifications.
//!
//! The broker never talks to the chat transport directly. Every order and deposit event is turned into a list of
//! `(Recipient, Notice)` pairs and handed to a [`Notifier`], which owns delivery. [`notifier_hooks`] wires a notifier
//! into the event system.
use std::{fmt::Display, future::Future, pin::Pin, sync::Arc};

use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    challenge::ChallengeAnswer,
    db_types::{Money, OperationCode, OrderCode, UserId},
    events::{DepositEvent, EventHooks, OrderEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    User(UserId),
    /// Where operators watch for new orders
    OrdersChannel,
    /// Where staff review deposit receipts
    DepositsChannel,
}

impl Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipient::User(id) => write!(f, "user {id}"),
            Recipient::OrdersChannel => write!(f, "orders channel"),
            Recipient::DepositsChannel => write!(f, "deposits channel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    OrderCreated { order_code: OrderCode, app: String, quantity: i64, total: Money },
    ChallengeIssued { order_code: OrderCode, question: String, answers: Vec<ChallengeAnswer> },
    OrderAccepted { order_code: OrderCode },
    VerificationFailed { order_code: OrderCode },
    OrderCancelled { order_code: OrderCode },
    DepositOpened { operation_code: OperationCode, amount: Money },
    ReceiptReceived { operation_code: OperationCode, client: UserId, amount: Money, receipt: String },
    DepositAccepted { operation_code: OperationCode, amount: Money, balance: Money },
    DepositRejected { operation_code: OperationCode, amount: Money },
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::OrderCreated { order_code, app, quantity, total } => {
                write!(f, "New order {order_code}: {quantity} x {app} for {total}")
            },
            Notice::ChallengeIssued { order_code, question, answers } => {
                let options = answers.iter().map(|a| a.chosen.to_string()).collect::<Vec<_>>().join(" / ");
                write!(f, "Order {order_code} is yours. Solve {question} [{options}]")
            },
            Notice::OrderAccepted { order_code } => write!(f, "Order {order_code} has been accepted"),
            Notice::VerificationFailed { order_code } => {
                write!(f, "Verification failed for order {order_code}. It stays with the same operator")
            },
            Notice::OrderCancelled { order_code } => write!(f, "Order {order_code} has been cancelled"),
            Notice::DepositOpened { operation_code, amount } => {
                write!(f, "Deposit {operation_code} for {amount} opened. Please send your receipt")
            },
            Notice::ReceiptReceived { operation_code, client, amount, receipt } => {
                write!(f, "Deposit {operation_code} from user {client} for {amount} is ready for review ({receipt})")
            },
            Notice::DepositAccepted { operation_code, amount, balance } => {
                write!(f, "Deposit {operation_code} for {amount} accepted. Your balance is now {balance}")
            },
            Notice::DepositRejected { operation_code, amount } => {
                write!(f, "Deposit {operation_code} for {amount} was rejected")
            },
        }
    }
}

pub fn order_notices(event: &OrderEvent) -> Vec<(Recipient, Notice)> {
    match event {
        OrderEvent::Created(order) => vec![(Recipient::OrdersChannel, Notice::OrderCreated {
            order_code: order.order_code.clone(),
            app: order.app.clone(),
            quantity: order.quantity,
            total: order.total_price,
        })],
        OrderEvent::Claimed { order, challenge } => match order.operator_id {
            Some(operator) => vec![(Recipient::User(operator), Notice::ChallengeIssued {
                order_code: order.order_code.clone(),
                question: challenge.question(),
                answers: challenge.answers(&order.order_code),
            })],
            None => vec![],
        },
        OrderEvent::Accepted(order) => {
            let notice = Notice::OrderAccepted { order_code: order.order_code.clone() };
            let mut result = vec![(Recipient::User(order.client_id), notice.clone())];
            if let Some(operator) = order.operator_id {
                result.push((Recipient::User(operator), notice));
            }
            result
        },
        OrderEvent::VerificationFailed(order) => {
            let notice = Notice::VerificationFailed { order_code: order.order_code.clone() };
            let mut result = vec![(Recipient::User(order.client_id), notice.clone())];
            if let Some(operator) = order.operator_id {
                result.push((Recipient::User(operator), notice));
            }
            result
        },
        OrderEvent::Cancelled { order, previous_operator, .. } => {
            let notice = Notice::OrderCancelled { order_code: order.order_code.clone() };
            let mut result = vec![(Recipient::User(order.client_id), notice.clone())];
            if let Some(operator) = previous_operator {
                result.push((Recipient::User(*operator), notice));
            }
            result
        },
    }
}

pub fn deposit_notices(event: &DepositEvent) -> Vec<(Recipient, Notice)> {
    match event {
        DepositEvent::Opened(d) => vec![(Recipient::User(d.client_id), Notice::DepositOpened {
            operation_code: d.operation_code.clone(),
            amount: d.amount,
        })],
        DepositEvent::ReceiptAttached(d) => vec![(Recipient::DepositsChannel, Notice::ReceiptReceived {
            operation_code: d.operation_code.clone(),
            client: d.client_id,
            amount: d.amount,
            receipt: d.receipt_path.clone().unwrap_or_default(),
        })],
        DepositEvent::Accepted { deposit: d, new_balance } => {
            vec![(Recipient::User(d.client_id), Notice::DepositAccepted {
                operation_code: d.operation_code.clone(),
                amount: d.amount,
                balance: *new_balance,
            })]
        },
        DepositEvent::Rejected(d) => vec![(Recipient::User(d.client_id), Notice::DepositRejected {
            operation_code: d.operation_code.clone(),
            amount: d.amount,
        })],
    }
}

#[derive(Debug, Clone, Error)]
#[error("Could not deliver notice to {recipient}: {reason}")]
pub struct NotifyError {
    pub recipient: Recipient,
    pub reason: String,
}

pub type Delivery = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send>>;

/// The outbound half of the chat transport.
pub trait Notifier: Send + Sync + 'static {
    fn deliver(&self, recipient: Recipient, notice: Notice) -> Delivery;
}

/// Event hooks that forward every order and deposit event to `notifier`. Delivery failures are logged and dropped.
pub fn notifier_hooks<N: Notifier>(notifier: Arc<N>) -> EventHooks {
    let mut hooks = EventHooks::default();
    let for_orders = Arc::clone(&notifier);
    hooks.on_order_event(move |event| {
        let notifier = Arc::clone(&for_orders);
        Box::pin(async move { dispatch(notifier.as_ref(), order_notices(&event)).await })
    });
    hooks.on_deposit_event(move |event| {
        let notifier = Arc::clone(&notifier);
        Box::pin(async move { dispatch(notifier.as_ref(), deposit_notices(&event)).await })
    });
    hooks
}

async fn dispatch<N: Notifier>(notifier: &N, notices: Vec<(Recipient, Notice)>) {
    for (recipient, notice) in notices {
        trace!("📬️ Notifying {recipient}: {notice}");
        if let Err(e) = notifier.deliver(recipient, notice).await {
            warn!("📬️ {e}");
        }
    }
}
