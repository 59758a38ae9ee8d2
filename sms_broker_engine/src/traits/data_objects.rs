use serde::{Deserialize, Serialize};

use crate::db_types::{Order, UserId};

/// The outcome of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResult {
    /// The order as it is now, which is always `Cancelled`
    pub order: Order,
    /// The operator that had the order assigned, if any
    pub previous_operator: Option<UserId>,
    /// `false` if the order was already cancelled and nothing changed
    pub changed: bool,
}
