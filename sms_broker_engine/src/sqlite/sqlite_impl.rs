//! `SqliteDatabase` is a concrete implementation of an SMS broker backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! [`traits`]: crate::traits
use std::{fmt::Debug, sync::Arc};

use chrono::Utc;
use log::*;
use sqlx::{migrate::MigrateError, SqliteConnection, SqlitePool};

use super::db::{clients, db_url, deposits, is_unique_violation, new_pool, operators, orders, MAX_CODE_ATTEMPTS};
use crate::{
    db_types::{
        Actor,
        Client,
        Deposit,
        DepositStatusType,
        NewDeposit,
        NewOrder,
        OperationCode,
        Operator,
        Order,
        OrderCode,
        OrderStatusType,
        UserId,
        UserProfile,
    },
    helpers::CodeGenerator,
    order_objects::{DepositQueryFilter, OrderQueryFilter},
    traits::{
        check_cancel_permission,
        AccountApiError,
        AccountManagement,
        BrokerDatabase,
        CancelResult,
        DepositError,
        DepositManagement,
        OrderFlowError,
        OrderManagement,
    },
};

/// How often a cancellation re-reads the order after losing a race with another transition.
const MAX_CANCEL_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    codes: Arc<CodeGenerator>,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `SMSB_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool, codes: Arc::new(CodeGenerator::new()) })
    }

    /// Returns a reference to the database connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl BrokerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

//-----------------------------------------------   Orders   ----------------------------------------------------------

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let client = clients::upsert_for_new_order(&order.client, &mut tx).await?;
        trace!("🗃️ Client {} now has {} orders", client.user_id, client.orders_count);
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.codes.next_order_code();
            match orders::insert_order(&order, &code, &mut tx).await {
                Ok(inserted) => {
                    tx.commit().await?;
                    return Ok(inserted);
                },
                Err(e) if is_unique_violation(&e) => {
                    warn!("🗃️ Order code {code} is already in use (attempt {attempt}). Trying a fresh one.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        error!("🗃️ Gave up generating an order code after {MAX_CODE_ATTEMPTS} attempts");
        Err(OrderFlowError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    async fn fetch_order(&self, code: &OrderCode) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_code(code, &mut conn).await?;
        Ok(order)
    }

    async fn claim_order(&self, code: &OrderCode, operator: &UserProfile) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        operators::fetch_or_create(operator, &mut tx).await?;
        match orders::assign_if_pending(code, operator.id, &mut tx).await? {
            Some(order) => {
                tx.commit().await?;
                debug!("🗃️ Order {code} assigned to operator {}", operator.id);
                Ok(order)
            },
            None => {
                let existing = orders::fetch_order_by_code(code, &mut tx).await?;
                tx.rollback().await?;
                match existing {
                    None => Err(OrderFlowError::OrderNotFound(code.clone())),
                    Some(order) => Err(OrderFlowError::AlreadyTaken { code: code.clone(), status: order.status }),
                }
            },
        }
    }

    async fn accept_order(&self, code: &OrderCode, operator: UserId) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        match orders::accept_if_assigned(code, operator, &mut tx).await? {
            Some(order) => {
                operators::increment_accepted(operator, &mut tx).await?;
                tx.commit().await?;
                debug!("🗃️ Order {code} accepted by operator {operator}");
                Ok(order)
            },
            None => {
                let existing = orders::fetch_order_by_code(code, &mut tx).await?;
                tx.rollback().await?;
                Err(classify_failed_acceptance(code, operator, existing))
            },
        }
    }

    async fn cancel_order(&self, code: &OrderCode, actor: Actor) -> Result<CancelResult, OrderFlowError> {
        for attempt in 1..=MAX_CANCEL_ATTEMPTS {
            let observed = {
                let mut conn = self.pool.acquire().await?;
                orders::fetch_order_by_code(code, &mut conn).await?
            }
            .ok_or_else(|| OrderFlowError::OrderNotFound(code.clone()))?;
            check_cancel_permission(&observed, actor)?;
            if observed.status == OrderStatusType::Cancelled {
                debug!("🗃️ Order {code} was already cancelled");
                return Ok(CancelResult { order: observed, previous_operator: None, changed: false });
            }
            let mut tx = self.pool.begin().await?;
            let cancelled = orders::cancel_if_unchanged(code, observed.status, observed.operator_id, &mut tx).await?;
            match cancelled {
                Some(order) => {
                    if let Some(operator) = observed.operator_id {
                        operators::increment_cancelled(operator, &mut tx).await?;
                    }
                    tx.commit().await?;
                    debug!("🗃️ Order {code} cancelled by {actor} (was {})", observed.status);
                    return Ok(CancelResult { order, previous_operator: observed.operator_id, changed: true });
                },
                None => {
                    tx.rollback().await?;
                    debug!("🗃️ Order {code} changed under us while cancelling (attempt {attempt}). Re-reading.");
                },
            }
        }
        warn!("🗃️ Could not cancel order {code} after {MAX_CANCEL_ATTEMPTS} attempts");
        Err(OrderFlowError::Contention(code.clone()))
    }
}

fn classify_failed_acceptance(code: &OrderCode, operator: UserId, existing: Option<Order>) -> OrderFlowError {
    let code = code.clone();
    match existing {
        None => OrderFlowError::OrderNotFound(code),
        Some(order) if order.status == OrderStatusType::Assigned => {
            OrderFlowError::NotAssignedToOperator { code, operator }
        },
        Some(order) => OrderFlowError::InvalidTransition { code, from: order.status, to: OrderStatusType::Accepted },
    }
}

//-----------------------------------------------  Deposits  ----------------------------------------------------------

impl DepositManagement for SqliteDatabase {
    async fn insert_deposit(&self, deposit: NewDeposit) -> Result<Deposit, DepositError> {
        let mut tx = self.pool.begin().await?;
        clients::fetch_or_create(&deposit.client, &mut tx).await?;
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.codes.next_operation_code(Utc::now());
            match deposits::insert_deposit(deposit.client.id, deposit.amount, &code, &mut tx).await {
                Ok(inserted) => {
                    tx.commit().await?;
                    return Ok(inserted);
                },
                Err(e) if is_unique_violation(&e) => {
                    warn!("🗃️ Operation code {code} is already in use (attempt {attempt}). Trying a fresh one.");
                },
                Err(e) => return Err(e.into()),
            }
        }
        error!("🗃️ Gave up generating an operation code after {MAX_CODE_ATTEMPTS} attempts");
        Err(DepositError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    async fn fetch_deposit(&self, code: &OperationCode) -> Result<Option<Deposit>, DepositError> {
        let mut conn = self.pool.acquire().await?;
        let deposit = deposits::fetch_deposit_by_code(code, &mut conn).await?;
        Ok(deposit)
    }

    async fn attach_receipt(&self, code: &OperationCode, receipt: &str) -> Result<Deposit, DepositError> {
        let mut conn = self.pool.acquire().await?;
        match deposits::attach_receipt_if_pending(code, receipt, &mut conn).await? {
            Some(deposit) => {
                debug!("🗃️ Receipt attached to deposit {code}");
                Ok(deposit)
            },
            None => Err(classify_unresolvable(code, &mut conn).await),
        }
    }

    async fn accept_deposit(&self, code: &OperationCode) -> Result<(Deposit, Client), DepositError> {
        let mut tx = self.pool.begin().await?;
        match deposits::resolve_if_pending(code, DepositStatusType::Accepted, &mut tx).await? {
            Some(deposit) => {
                let client = clients::credit_balance(deposit.client_id, deposit.amount, &mut tx)
                    .await?
                    .ok_or(DepositError::ClientNotFound(deposit.client_id))?;
                tx.commit().await?;
                debug!(
                    "🗃️ Deposit {code} accepted. Client {} credited {}, balance is now {}",
                    client.user_id, deposit.amount, client.balance
                );
                Ok((deposit, client))
            },
            None => {
                let err = classify_unresolvable(code, &mut tx).await;
                tx.rollback().await?;
                Err(err)
            },
        }
    }

    async fn reject_deposit(&self, code: &OperationCode) -> Result<Deposit, DepositError> {
        let mut tx = self.pool.begin().await?;
        match deposits::resolve_if_pending(code, DepositStatusType::Rejected, &mut tx).await? {
            Some(deposit) => {
                tx.commit().await?;
                debug!("🗃️ Deposit {code} rejected");
                Ok(deposit)
            },
            None => {
                let err = classify_unresolvable(code, &mut tx).await;
                tx.rollback().await?;
                Err(err)
            },
        }
    }
}

/// Works out why a conditional update on a pending deposit matched nothing.
async fn classify_unresolvable(code: &OperationCode, conn: &mut SqliteConnection) -> DepositError {
    match deposits::fetch_deposit_by_code(code, conn).await {
        Ok(None) => DepositError::DepositNotFound(code.clone()),
        Ok(Some(deposit)) => DepositError::AlreadyResolved { code: code.clone(), status: deposit.status },
        Err(e) => e.into(),
    }
}

//-----------------------------------------------  Accounts  ----------------------------------------------------------

impl AccountManagement for SqliteDatabase {
    async fn fetch_or_create_client(&self, user: &UserProfile) -> Result<Client, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let client = clients::fetch_or_create(user, &mut conn).await?;
        Ok(client)
    }

    async fn fetch_client(&self, user: UserId) -> Result<Option<Client>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let client = clients::fetch_client(user, &mut conn).await?;
        Ok(client)
    }

    async fn fetch_operator(&self, user: UserId) -> Result<Option<Operator>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let operator = operators::fetch_operator(user, &mut conn).await?;
        Ok(operator)
    }

    async fn register_operator(&self, user: &UserProfile) -> Result<Operator, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let operator = operators::fetch_or_create(user, &mut conn).await?;
        info!("🗃️ Operator {} ({}) registered", operator.user_id, operator.name);
        Ok(operator)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn search_deposits(&self, query: DepositQueryFilter) -> Result<Vec<Deposit>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let deposits = deposits::search_deposits(query, &mut conn).await?;
        Ok(deposits)
    }
}
