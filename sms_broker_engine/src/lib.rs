//! SMS Broker Engine
//!
//! The SMS broker connects clients who need SMS verification codes with operators who supply them. Clients top up a
//! prepaid balance with manually reviewed deposits and place orders for a number of codes for some app. Operators
//! compete for orders; the first to claim one gets it, and has to pass a small arithmetic challenge before the
//! assignment is confirmed.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@traits`] and, with the `sqlite` feature, [`SqliteDatabase`]). The traits describe the atomic
//!    state transitions the broker relies on. Backends implement them; nothing else touches the database.
//! 2. The broker API ([`OrderFlowApi`], [`DepositFlowApi`], [`AccountApi`]). Validation, pricing, challenges and event
//!    publication live here.
//! 3. The chat dialog ([`mod@dialog`]), backed by the in-memory [`mod@session`] store.
//!
//! Every successful state transition emits an event (see [`mod@events`]). The [`mod@notifier`] module turns those
//! events into messages for clients, operators and the staff channels.
mod broker_api;

pub mod challenge;
pub mod db_types;
pub mod dialog;
pub mod events;
pub mod helpers;
pub mod notifier;
pub mod pricing;
pub mod session;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use broker_api::{
    accounts_api::{AccountApi, ClientHistory, HISTORY_LIMIT},
    deposit_flow_api::{DepositDecision, DepositFlowApi, DepositResolution, MAX_DEPOSIT_AMOUNT},
    order_flow_api::OrderFlowApi,
    order_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AccountApiError,
    AccountManagement,
    BrokerDatabase,
    CancelResult,
    DepositError,
    DepositManagement,
    OrderFlowError,
    OrderManagement,
};
