use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Client, Deposit, Money, NewDeposit, OperationCode, UserProfile},
    events::{DepositEvent, EventProducers},
    traits::{DepositError, DepositManagement},
};

/// The largest single deposit a client may declare.
pub const MAX_DEPOSIT_AMOUNT: Money = Money::from_units(1_000_000);

/// What staff decided about a deposit after looking at its receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositDecision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositResolution {
    /// The deposit was accepted and the client's balance credited. `client` is the updated record.
    Accepted { deposit: Deposit, client: Client },
    Rejected(Deposit),
}

impl DepositResolution {
    pub fn deposit(&self) -> &Deposit {
        match self {
            DepositResolution::Accepted { deposit, .. } | DepositResolution::Rejected(deposit) => deposit,
        }
    }
}

/// `DepositFlowApi` turns a client's payment claim into a balance credit, via a staff review of the uploaded receipt.
pub struct DepositFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for DepositFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DepositFlowApi")
    }
}

impl<B: Clone> Clone for DepositFlowApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), producers: self.producers.clone() }
    }
}

impl<B> DepositFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> DepositFlowApi<B>
where B: DepositManagement
{
    /// Opens a `Pending` deposit for `client`. The amount must be positive and no more than [`MAX_DEPOSIT_AMOUNT`].
    pub async fn open_deposit(&self, client: &UserProfile, amount: Money) -> Result<Deposit, DepositError> {
        if !amount.is_positive() || amount > MAX_DEPOSIT_AMOUNT {
            return Err(DepositError::InvalidAmount(amount));
        }
        let deposit = self.db.insert_deposit(NewDeposit { client: client.clone(), amount }).await?;
        info!("🔄️💰️ Deposit {} for {amount} opened by client {}", deposit.operation_code, client.id);
        self.producers.publish_deposit_event(DepositEvent::Opened(deposit.clone())).await;
        Ok(deposit)
    }

    /// Records the receipt the client uploaded. The deposit stays `Pending` until staff resolve it.
    pub async fn attach_receipt(&self, code: &OperationCode, file_ref: &str) -> Result<Deposit, DepositError> {
        let file_ref = file_ref.trim();
        if file_ref.is_empty() {
            return Err(DepositError::EmptyReceipt(code.clone()));
        }
        let deposit = self.db.attach_receipt(code, file_ref).await?;
        info!("🔄️💰️ Receipt received for deposit {code}. Awaiting review");
        self.producers.publish_deposit_event(DepositEvent::ReceiptAttached(deposit.clone())).await;
        Ok(deposit)
    }

    /// Accepts the deposit and credits the client. Accepting the same deposit twice fails the second time and leaves
    /// the balance alone.
    pub async fn resolve_accept(&self, code: &OperationCode) -> Result<(Deposit, Client), DepositError> {
        let (deposit, client) = self.db.accept_deposit(code).await.map_err(|e| {
            if e.is_conflict() {
                debug!("🔄️💰️ Deposit {code} was not accepted. {e}");
            }
            e
        })?;
        info!(
            "🔄️💰️ Deposit {code} accepted. Client {} credited {}. New balance {}",
            client.user_id, deposit.amount, client.balance
        );
        let event = DepositEvent::Accepted { deposit: deposit.clone(), new_balance: client.balance };
        self.producers.publish_deposit_event(event).await;
        Ok((deposit, client))
    }

    pub async fn resolve_reject(&self, code: &OperationCode) -> Result<Deposit, DepositError> {
        let deposit = self.db.reject_deposit(code).await?;
        info!("🔄️💰️ Deposit {code} rejected");
        self.producers.publish_deposit_event(DepositEvent::Rejected(deposit.clone())).await;
        Ok(deposit)
    }

    pub async fn resolve_deposit(
        &self,
        code: &OperationCode,
        decision: DepositDecision,
    ) -> Result<DepositResolution, DepositError> {
        match decision {
            DepositDecision::Accept => {
                let (deposit, client) = self.resolve_accept(code).await?;
                Ok(DepositResolution::Accepted { deposit, client })
            },
            DepositDecision::Reject => self.resolve_reject(code).await.map(DepositResolution::Rejected),
        }
    }

    pub async fn fetch_deposit(&self, code: &OperationCode) -> Result<Option<Deposit>, DepositError> {
        self.db.fetch_deposit(code).await
    }
}
