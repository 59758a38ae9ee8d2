use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    challenge::Challenge,
    db_types::{DepositStatusType, Order, OrderStatusType, UserId},
    traits::AccountApiError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub client: Option<UserId>,
    pub operator: Option<UserId>,
    pub status: Option<OrderStatusType>,
    pub app: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl OrderQueryFilter {
    pub fn with_client(mut self, client: UserId) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_operator(mut self, operator: UserId) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_app<S: Into<String>>(mut self, app: S) -> Self {
        self.app = Some(app.into());
        self
    }

    pub fn since<T>(mut self, since: T) -> Result<Self, AccountApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = since.try_into().map_err(|e| AccountApiError::QueryError(e.to_string()))?;
        self.since = Some(dt);
        Ok(self)
    }

    pub fn until<T>(mut self, until: T) -> Result<Self, AccountApiError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = until.try_into().map_err(|e| AccountApiError::QueryError(e.to_string()))?;
        self.until = Some(dt);
        Ok(self)
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.client.is_none() &&
            self.operator.is_none() &&
            self.status.is_none() &&
            self.app.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepositQueryFilter {
    pub client: Option<UserId>,
    pub status: Option<DepositStatusType>,
    pub limit: Option<i64>,
}

impl DepositQueryFilter {
    pub fn with_client(mut self, client: UserId) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_status(mut self, status: DepositStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.client.is_none() && self.status.is_none()
    }
}

/// A successful claim: the order, now assigned to the claimant, and the challenge they must pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedOrder {
    pub order: Order,
    pub challenge: Challenge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyOutcome {
    /// The operator picked the right answer and the order is now `Accepted`.
    Accepted(Order),
    /// Wrong answer. The order is still assigned to the same operator.
    Failed(Order),
}

impl VerifyOutcome {
    pub fn order(&self) -> &Order {
        match self {
            VerifyOutcome::Accepted(o) | VerifyOutcome::Failed(o) => o,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, VerifyOutcome::Accepted(_))
    }
}
