//! Unifies API for accessing clients, operators and their histories.

use std::fmt::Debug;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Client, Deposit, Operator, Order, UserId, UserProfile},
    order_objects::{DepositQueryFilter, OrderQueryFilter},
    traits::{AccountApiError, AccountManagement},
};

/// How many entries the history view shows by default.
pub const HISTORY_LIMIT: i64 = 10;

/// A client's recent activity, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHistory {
    pub client: Client,
    pub orders: Vec<Order>,
    pub deposits: Vec<Deposit>,
}

pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B: Clone> Clone for AccountApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Returns the client, creating the record the first time a user shows up.
    pub async fn greet_client(&self, user: &UserProfile) -> Result<Client, AccountApiError> {
        self.db.fetch_or_create_client(user).await
    }

    pub async fn client(&self, user: UserId) -> Result<Option<Client>, AccountApiError> {
        self.db.fetch_client(user).await
    }

    pub async fn operator(&self, user: UserId) -> Result<Option<Operator>, AccountApiError> {
        self.db.fetch_operator(user).await
    }

    pub async fn register_operator(&self, user: &UserProfile) -> Result<Operator, AccountApiError> {
        self.db.register_operator(user).await
    }

    pub async fn orders_for_client(&self, user: UserId, limit: Option<i64>) -> Result<Vec<Order>, AccountApiError> {
        let mut query = OrderQueryFilter::default().with_client(user);
        query.limit = limit;
        self.db.search_orders(query).await
    }

    pub async fn deposits_for_client(
        &self,
        user: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<Deposit>, AccountApiError> {
        let mut query = DepositQueryFilter::default().with_client(user);
        query.limit = limit;
        self.db.search_deposits(query).await
    }

    /// The client record plus their most recent orders and deposits. `None` if the user has never been seen.
    pub async fn history(&self, user: UserId) -> Result<Option<ClientHistory>, AccountApiError> {
        let Some(client) = self.db.fetch_client(user).await? else {
            return Ok(None);
        };
        let orders = self.orders_for_client(user, Some(HISTORY_LIMIT)).await?;
        let deposits = self.deposits_for_client(user, Some(HISTORY_LIMIT)).await?;
        trace!("💻️ History for {user}: {} orders, {} deposits", orders.len(), deposits.len());
        Ok(Some(ClientHistory { client, orders, deposits }))
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        trace!("💻️ Searching orders: {query:?}");
        self.db.search_orders(query).await
    }

    pub async fn search_deposits(&self, query: DepositQueryFilter) -> Result<Vec<Deposit>, AccountApiError> {
        trace!("💻️ Searching deposits: {query:?}");
        self.db.search_deposits(query).await
    }
}
