//! # Database management and control.
//!
//! This module defines the contracts that a storage backend must satisfy to serve the SMS broker.
//!
//! * [`OrderManagement`] owns order records and every order state transition: insertion, claim, acceptance and
//!   cancellation. Each transition is a single atomic read-check-mutate unit.
//! * [`DepositManagement`] owns deposit records and is the only writer of client balances.
//! * [`AccountManagement`] provides client and operator records, plus read-only queries over orders and deposits.
//! * [`BrokerDatabase`] ties the three together for components (such as the dialog driver) that need all of them.
mod account_management;
mod deposit_management;
mod order_management;

mod data_objects;

pub use account_management::{AccountApiError, AccountManagement};
pub use data_objects::CancelResult;
pub use deposit_management::{DepositError, DepositManagement};
pub use order_management::{check_cancel_permission, OrderFlowError, OrderManagement};

/// A backend that can serve every part of the broker.
#[allow(async_fn_in_trait)]
pub trait BrokerDatabase: OrderManagement + DepositManagement + AccountManagement {
    /// The URL of the database
    fn url(&self) -> &str;
}
