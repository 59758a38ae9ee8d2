use thiserror::Error;

use crate::db_types::{Client, Deposit, DepositStatusType, Money, NewDeposit, OperationCode, UserId};

#[derive(Debug, Clone, Error)]
pub enum DepositError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Deposit {0} does not exist")]
    DepositNotFound(OperationCode),
    #[error("Deposit {code} has already been resolved. It is {status}")]
    AlreadyResolved { code: OperationCode, status: DepositStatusType },
    #[error("{0} is not a valid deposit. Amounts must be positive and at most $1,000,000.00")]
    InvalidAmount(Money),
    #[error("No receipt was provided for deposit {0}")]
    EmptyReceipt(OperationCode),
    #[error("Client {0} does not exist")]
    ClientNotFound(UserId),
    #[error("Could not generate a unique operation code after {0} attempts")]
    CodeSpaceExhausted(usize),
}

impl DepositError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyResolved { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DepositNotFound(_) | Self::ClientNotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidAmount(_) | Self::EmptyReceipt(_))
    }
}

impl From<sqlx::Error> for DepositError {
    fn from(e: sqlx::Error) -> Self {
        DepositError::DatabaseError(e.to_string())
    }
}

/// Deposit storage and the deposit ledger.
///
/// `Pending → Accepted` or `Pending → Rejected`. Accepting a deposit is the only way a client balance ever changes, and
/// each accepted deposit must be credited exactly once.
#[allow(async_fn_in_trait)]
pub trait DepositManagement: Clone {
    /// Create the client if necessary and insert a `Pending` deposit under a fresh operation code.
    async fn insert_deposit(&self, deposit: NewDeposit) -> Result<Deposit, DepositError>;

    async fn fetch_deposit(&self, code: &OperationCode) -> Result<Option<Deposit>, DepositError>;

    /// Record the receipt reference on a `Pending` deposit. The status does not change.
    async fn attach_receipt(&self, code: &OperationCode, receipt: &str) -> Result<Deposit, DepositError>;

    /// In one transaction, mark a `Pending` deposit as `Accepted` and credit its amount to the owning client.
    async fn accept_deposit(&self, code: &OperationCode) -> Result<(Deposit, Client), DepositError>;

    async fn reject_deposit(&self, code: &OperationCode) -> Result<Deposit, DepositError>;
}
