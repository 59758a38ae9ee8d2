use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Money, OperationCode},
    pricing::Quote,
};

/// Where a user is in a multi-step dialog. Each variant carries exactly the scratch data that step needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DialogStep {
    #[default]
    Idle,
    AwaitingDepositAmount,
    AwaitingDepositConfirmation { amount: Money },
    AwaitingReceipt { operation_code: OperationCode },
    AwaitingOrderApp,
    AwaitingOrderQuantity { app: String },
    AwaitingOrderConfirmation { app: String, quote: Quote },
}

impl DialogStep {
    pub fn is_idle(&self) -> bool {
        matches!(self, DialogStep::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DialogStep::Idle => "idle",
            DialogStep::AwaitingDepositAmount => "awaiting-deposit-amount",
            DialogStep::AwaitingDepositConfirmation { .. } => "awaiting-deposit-confirmation",
            DialogStep::AwaitingReceipt { .. } => "awaiting-receipt",
            DialogStep::AwaitingOrderApp => "awaiting-order-app",
            DialogStep::AwaitingOrderQuantity { .. } => "awaiting-order-quantity",
            DialogStep::AwaitingOrderConfirmation { .. } => "awaiting-order-confirmation",
        }
    }
}
