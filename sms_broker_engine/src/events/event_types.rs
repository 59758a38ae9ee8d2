use serde::{Deserialize, Serialize};

use crate::{
    challenge::Challenge,
    db_types::{Actor, Deposit, Money, Order, UserId},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    /// A client confirmed a new order. It is waiting for an operator.
    Created(Order),
    /// An operator won the claim and was handed a challenge.
    Claimed { order: Order, challenge: Challenge },
    /// The claiming operator passed the challenge.
    Accepted(Order),
    /// The claiming operator picked a wrong answer. The order stays with them.
    VerificationFailed(Order),
    Cancelled { order: Order, previous_operator: Option<UserId>, actor: Actor },
}

impl OrderEvent {
    pub fn order(&self) -> &Order {
        match self {
            OrderEvent::Created(order) |
            OrderEvent::Accepted(order) |
            OrderEvent::VerificationFailed(order) |
            OrderEvent::Claimed { order, .. } |
            OrderEvent::Cancelled { order, .. } => order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositEvent {
    /// The client confirmed an amount and now owes us a receipt.
    Opened(Deposit),
    /// The receipt arrived and the deposit is ready for staff review.
    ReceiptAttached(Deposit),
    Accepted { deposit: Deposit, new_balance: Money },
    Rejected(Deposit),
}

impl DepositEvent {
    pub fn deposit(&self) -> &Deposit {
        match self {
            DepositEvent::Opened(deposit) |
            DepositEvent::ReceiptAttached(deposit) |
            DepositEvent::Rejected(deposit) |
            DepositEvent::Accepted { deposit, .. } => deposit,
        }
    }
}
