use thiserror::Error;

use crate::{
    db_types::{Actor, NewOrder, Order, OrderCode, OrderStatusType, UserId, UserProfile},
    traits::CancelResult,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderCode),
    #[error("Order {code} has already been taken. It is {status}")]
    AlreadyTaken { code: OrderCode, status: OrderStatusType },
    #[error("Order {code} is not assigned to operator {operator}")]
    NotAssignedToOperator { code: OrderCode, operator: UserId },
    #[error("Order {code} cannot go from {from} to {to}")]
    InvalidTransition { code: OrderCode, from: OrderStatusType, to: OrderStatusType },
    #[error("Order {code} does not belong to user {user}")]
    NotOrderOwner { code: OrderCode, user: UserId },
    #[error("Only an admin can cancel order {code} while it is {status}")]
    CancellationForbidden { code: OrderCode, status: OrderStatusType },
    #[error("Order {0} kept changing while it was being cancelled. Please try again")]
    Contention(OrderCode),
    #[error("Could not generate a unique order code after {0} attempts")]
    CodeSpaceExhausted(usize),
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

impl OrderFlowError {
    /// The request was well-formed, but the order is not in a state that allows it.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyTaken { .. } |
                Self::NotAssignedToOperator { .. } |
                Self::InvalidTransition { .. } |
                Self::NotOrderOwner { .. } |
                Self::CancellationForbidden { .. } |
                Self::Contention(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::OrderNotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidOrder(_))
    }
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

/// Decides whether `actor` may cancel `order` as it currently stands. `Ok` for an order that is already cancelled, so
/// that repeated cancellations are harmless.
pub fn check_cancel_permission(order: &Order, actor: Actor) -> Result<(), OrderFlowError> {
    let code = order.order_code.clone();
    if let Actor::Client(user) = actor {
        if order.client_id != user {
            return Err(OrderFlowError::NotOrderOwner { code, user });
        }
    }
    match (order.status, actor) {
        (OrderStatusType::Cancelled, _) | (OrderStatusType::Pending, _) => Ok(()),
        (OrderStatusType::Assigned, Actor::Admin(_)) => Ok(()),
        (OrderStatusType::Assigned, Actor::Client(_)) => {
            Err(OrderFlowError::CancellationForbidden { code, status: order.status })
        },
        (OrderStatusType::Accepted, _) => {
            Err(OrderFlowError::InvalidTransition { code, from: order.status, to: OrderStatusType::Cancelled })
        },
    }
}

/// Order storage and the order state machine.
///
/// `Pending → Assigned → Accepted`, plus `Pending → Cancelled` and `Assigned → Cancelled`. Every transition method
/// must be atomic with respect to concurrent callers: implementations use conditional updates and never a separate
/// read followed by an unconditional write.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// In one transaction: fetch or create the client, increment its lifetime order count, and insert the order as
    /// `Pending` under a freshly generated order code. Code collisions are retried a bounded number of times.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    async fn fetch_order(&self, code: &OrderCode) -> Result<Option<Order>, OrderFlowError>;

    /// Assign a `Pending` order to `operator`, creating the operator record if needed.
    ///
    /// At most one operator ever succeeds for a given order. Losers get [`OrderFlowError::AlreadyTaken`] and nothing
    /// is modified.
    async fn claim_order(&self, code: &OrderCode, operator: &UserProfile) -> Result<Order, OrderFlowError>;

    /// Move an order from `Assigned` to `Accepted`. Only the operator holding the order may do this. Increments the
    /// operator's `accepted` counter.
    async fn accept_order(&self, code: &OrderCode, operator: UserId) -> Result<Order, OrderFlowError>;

    /// Cancel an order on behalf of `actor`.
    ///
    /// Clients may cancel their own `Pending` orders. Admins may cancel `Pending` and `Assigned` orders. Cancelling an
    /// already cancelled order is a no-op. `Accepted` orders cannot be cancelled.
    async fn cancel_order(&self, code: &OrderCode, actor: Actor) -> Result<CancelResult, OrderFlowError>;
}
