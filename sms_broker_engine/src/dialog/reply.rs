use serde::{Deserialize, Serialize};

use crate::{
    broker_api::accounts_api::ClientHistory,
    challenge::{Challenge, ChallengeAnswer},
    db_types::{Client, Deposit, Money, OperationCode, Order, OrderCode},
    pricing::{PriceSchedule, Quote},
};

/// What the acting user should be told. The transport decides how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Welcome { name: String, balance: Money },
    /// `/cancel` or a cancel button cleared the dialog
    Cancelled,
    AskDepositAmount,
    InvalidAmount { reason: String },
    ConfirmDeposit { amount: Money },
    DepositOpened { deposit: Deposit },
    /// Anything other than a file while we are waiting for the receipt
    ReceiptExpected { operation_code: OperationCode },
    ReceiptReceived { deposit: Deposit },
    AskOrderApp,
    InvalidApp,
    AskOrderQuantity { app: String },
    InvalidQuantity { input: String },
    ConfirmOrder { app: String, quote: Quote },
    OrderSubmitted { order: Order },
    OrderCancelled { order: Order },
    ChallengeIssued { order_code: OrderCode, question: String, answers: Vec<ChallengeAnswer> },
    ChallengePassed { order: Order },
    ChallengeFailed { order_code: OrderCode },
    DepositAccepted { deposit: Deposit, client: Client },
    DepositRejected { deposit: Deposit },
    History { history: ClientHistory },
    Profile { client: Client },
    Info { prices: PriceSchedule },
    /// The request was understood but could not be carried out, e.g. the order was already taken
    Refused { reason: String },
    NotAuthorized,
    /// Free text or a button that means nothing at this point in the dialog
    NotUnderstood { step: String },
}

impl Reply {
    pub fn challenge(order_code: &OrderCode, challenge: &Challenge) -> Self {
        Reply::ChallengeIssued {
            order_code: order_code.clone(),
            question: challenge.question(),
            answers: challenge.answers(order_code),
        }
    }

    pub fn refused<E: ToString>(e: E) -> Self {
        Reply::Refused { reason: e.to_string() }
    }
}
