use thiserror::Error;

use crate::{
    db_types::{Client, Deposit, Operator, Order, UserId, UserProfile},
    order_objects::{DepositQueryFilter, OrderQueryFilter},
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Client and operator records, and read-only views over orders and deposits.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Returns the client record for `user`, creating it on first contact.
    async fn fetch_or_create_client(&self, user: &UserProfile) -> Result<Client, AccountApiError>;

    async fn fetch_client(&self, user: UserId) -> Result<Option<Client>, AccountApiError>;

    async fn fetch_operator(&self, user: UserId) -> Result<Option<Operator>, AccountApiError>;

    /// Registers `user` as an operator. Registering an existing operator returns the existing record.
    async fn register_operator(&self, user: &UserProfile) -> Result<Operator, AccountApiError>;

    /// Orders matching the filter, newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError>;

    /// Deposits matching the filter, newest first.
    async fn search_deposits(&self, query: DepositQueryFilter) -> Result<Vec<Deposit>, AccountApiError>;
}
