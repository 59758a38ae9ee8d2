//! The chat dialog layer.
//!
//! A transport (a chat bot, or the HTTP `/api/dialog` endpoint) turns whatever the user did into an [`Intent`] and
//! hands it to [`DialogFlow::handle`], which returns the [`Reply`] to show them. Deposit and order entry are
//! multi-step and tracked per user in the [`crate::session::SessionStore`].
mod flow;
mod intent;
mod reply;

pub use flow::DialogFlow;
pub use intent::{ButtonAction, Intent, UnknownButton};
pub use reply::Reply;
use thiserror::Error;

use crate::traits::{AccountApiError, DepositError, OrderFlowError};

/// Failures the user cannot do anything about. Refusals (order already taken, bad amounts and so on) are replies,
/// not errors.
#[derive(Debug, Clone, Error)]
pub enum DialogError {
    #[error("{0}")]
    Order(#[from] OrderFlowError),
    #[error("{0}")]
    Deposit(#[from] DepositError),
    #[error("{0}")]
    Account(#[from] AccountApiError),
}
