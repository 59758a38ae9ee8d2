use std::{collections::HashSet, fmt::Display};

use log::*;

use crate::{
    broker_api::{
        accounts_api::AccountApi,
        deposit_flow_api::{DepositDecision, DepositFlowApi, DepositResolution, MAX_DEPOSIT_AMOUNT},
        order_flow_api::OrderFlowApi,
    },
    db_types::{Actor, Money, UserId, UserProfile},
    dialog::{ButtonAction, DialogError, Intent, Reply},
    events::EventProducers,
    order_objects::VerifyOutcome,
    pricing::{PriceSchedule, MAX_ORDER_QUANTITY},
    session::{DialogStep, SessionStore},
    traits::{AccountApiError, BrokerDatabase, DepositError, OrderFlowError},
};

/// Errors that end up as a polite refusal to the user rather than a failure of the request.
trait Recoverable: Display + Into<DialogError> {
    fn is_recoverable(&self) -> bool;
}

impl Recoverable for OrderFlowError {
    fn is_recoverable(&self) -> bool {
        self.is_conflict() || self.is_not_found() || self.is_validation()
    }
}

impl Recoverable for DepositError {
    fn is_recoverable(&self) -> bool {
        self.is_conflict() || self.is_not_found() || self.is_validation()
    }
}

fn settle<T, E: Recoverable>(result: Result<T, E>, reply: impl FnOnce(T) -> Reply) -> Result<Reply, DialogError> {
    match result {
        Ok(value) => Ok(reply(value)),
        Err(e) if e.is_recoverable() => {
            debug!("💬️ Request refused: {e}");
            Ok(Reply::refused(e))
        },
        Err(e) => Err(e.into()),
    }
}

/// Drives the conversation with one user at a time, on top of the order and deposit flows.
///
/// Multi-step input (deposit amounts, order details, receipts) is tracked in the [`SessionStore`]. Operator and staff
/// buttons carry everything they need in their callback data and never touch the session.
pub struct DialogFlow<B> {
    sessions: SessionStore,
    orders: OrderFlowApi<B>,
    deposits: DepositFlowApi<B>,
    accounts: AccountApi<B>,
    prices: PriceSchedule,
    staff: HashSet<UserId>,
}

impl<B> DialogFlow<B>
where B: BrokerDatabase
{
    pub fn new<I>(db: B, producers: EventProducers, sessions: SessionStore, prices: PriceSchedule, staff: I) -> Self
    where I: IntoIterator<Item = UserId> {
        Self {
            sessions,
            orders: OrderFlowApi::new(db.clone(), producers.clone()),
            deposits: DepositFlowApi::new(db.clone(), producers),
            accounts: AccountApi::new(db),
            prices,
            staff: staff.into_iter().collect(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn is_staff(&self, user: UserId) -> bool {
        self.staff.contains(&user)
    }

    pub async fn handle(&self, user: &UserProfile, intent: Intent) -> Result<Reply, DialogError> {
        trace!("💬️ {} sent {intent:?}", user.id);
        match intent {
            Intent::Start => self.start(user).await,
            Intent::Cancel => {
                self.sessions.reset(user.id);
                Ok(Reply::Cancelled)
            },
            Intent::Button(action) => self.on_button(user, action).await,
            Intent::Text(text) => self.on_text(user, text.trim()).await,
            Intent::File(file_ref) => self.on_file(user, &file_ref).await,
        }
    }

    async fn start(&self, user: &UserProfile) -> Result<Reply, DialogError> {
        self.sessions.reset(user.id);
        let client = self.accounts.greet_client(user).await?;
        Ok(Reply::Welcome { name: client.name, balance: client.balance })
    }

    async fn on_button(&self, user: &UserProfile, action: ButtonAction) -> Result<Reply, DialogError> {
        let step = self.sessions.current_step(user.id);
        match (action, step) {
            (ButtonAction::Deposit, _) => {
                self.sessions.advance(user.id, DialogStep::AwaitingDepositAmount);
                Ok(Reply::AskDepositAmount)
            },
            (ButtonAction::ConfirmDeposit, DialogStep::AwaitingDepositConfirmation { amount }) => {
                let result = self.deposits.open_deposit(user, amount).await;
                if let Ok(deposit) = &result {
                    let step = DialogStep::AwaitingReceipt { operation_code: deposit.operation_code.clone() };
                    self.sessions.advance(user.id, step);
                }
                settle(result, |deposit| Reply::DepositOpened { deposit })
            },
            (ButtonAction::CancelDeposit | ButtonAction::CancelOrder, _) => {
                self.sessions.reset(user.id);
                Ok(Reply::Cancelled)
            },
            (ButtonAction::Sms, _) => {
                self.sessions.advance(user.id, DialogStep::AwaitingOrderApp);
                Ok(Reply::AskOrderApp)
            },
            (ButtonAction::ConfirmOrder, DialogStep::AwaitingOrderConfirmation { app, quote }) => {
                let result =
                    self.orders.submit_order(user, &app, quote.quantity, self.prices.base_unit_price).await;
                self.sessions.reset(user.id);
                settle(result, |order| Reply::OrderSubmitted { order })
            },
            (ButtonAction::History, _) => {
                self.accounts.greet_client(user).await?;
                let history = self.accounts.history(user.id).await?.ok_or_else(|| {
                    AccountApiError::DatabaseError(format!("Client {} vanished after it was created", user.id))
                })?;
                Ok(Reply::History { history })
            },
            (ButtonAction::Profile, _) => {
                let client = self.accounts.greet_client(user).await?;
                Ok(Reply::Profile { client })
            },
            (ButtonAction::Info, _) => Ok(Reply::Info { prices: self.prices }),
            (ButtonAction::ClaimOrder(code), _) => {
                let result = self.orders.claim_order(&code, user).await;
                settle(result, |claimed| Reply::challenge(&claimed.order.order_code, &claimed.challenge))
            },
            (ButtonAction::Answer(answer), _) => {
                let result = self.orders.verify_challenge(&answer, user.id).await;
                settle(result, |outcome| match outcome {
                    VerifyOutcome::Accepted(order) => Reply::ChallengePassed { order },
                    VerifyOutcome::Failed(order) => Reply::ChallengeFailed { order_code: order.order_code },
                })
            },
            (ButtonAction::NewChallenge(code), _) => {
                let result = self.orders.reissue_challenge(&code, user.id).await;
                settle(result, |claimed| Reply::challenge(&claimed.order.order_code, &claimed.challenge))
            },
            (ButtonAction::WithdrawOrder(code), _) => {
                let actor = if self.is_staff(user.id) { Actor::Admin(user.id) } else { Actor::Client(user.id) };
                let result = self.orders.cancel_order(&code, actor).await;
                settle(result, |order| Reply::OrderCancelled { order })
            },
            (ButtonAction::AcceptDeposit(code), _) => self.resolve(user.id, &code, DepositDecision::Accept).await,
            (ButtonAction::RejectDeposit(code), _) => self.resolve(user.id, &code, DepositDecision::Reject).await,
            (action, step) => {
                debug!("💬️ Button {action} makes no sense for {} at {}", user.id, step.name());
                Ok(Reply::NotUnderstood { step: step.name().to_string() })
            },
        }
    }

    async fn resolve(
        &self,
        staff: UserId,
        code: &crate::db_types::OperationCode,
        decision: DepositDecision,
    ) -> Result<Reply, DialogError> {
        if !self.is_staff(staff) {
            warn!("💬️ User {staff} tried to resolve deposit {code} without being staff");
            return Ok(Reply::NotAuthorized);
        }
        let result = self.deposits.resolve_deposit(code, decision).await;
        settle(result, |resolution| match resolution {
            DepositResolution::Accepted { deposit, client } => Reply::DepositAccepted { deposit, client },
            DepositResolution::Rejected(deposit) => Reply::DepositRejected { deposit },
        })
    }

    async fn on_text(&self, user: &UserProfile, text: &str) -> Result<Reply, DialogError> {
        let step = self.sessions.current_step(user.id);
        let reply = match step {
            DialogStep::AwaitingDepositAmount => match parse_amount(text) {
                Ok(amount) => {
                    self.sessions.advance(user.id, DialogStep::AwaitingDepositConfirmation { amount });
                    Reply::ConfirmDeposit { amount }
                },
                Err(reason) => {
                    self.sessions.advance(user.id, step);
                    Reply::InvalidAmount { reason }
                },
            },
            DialogStep::AwaitingReceipt { operation_code } => {
                self.sessions.advance(user.id, DialogStep::AwaitingReceipt { operation_code: operation_code.clone() });
                Reply::ReceiptExpected { operation_code }
            },
            DialogStep::AwaitingOrderApp if text.is_empty() => {
                self.sessions.advance(user.id, step);
                Reply::InvalidApp
            },
            DialogStep::AwaitingOrderApp => {
                let app = text.to_string();
                self.sessions.advance(user.id, DialogStep::AwaitingOrderQuantity { app: app.clone() });
                Reply::AskOrderQuantity { app }
            },
            DialogStep::AwaitingOrderQuantity { app } => {
                match parse_quantity(text).and_then(|q| self.prices.quote(q)) {
                    Some(quote) => {
                        let next = DialogStep::AwaitingOrderConfirmation { app: app.clone(), quote };
                        self.sessions.advance(user.id, next);
                        Reply::ConfirmOrder { app, quote }
                    },
                    None => {
                        self.sessions.advance(user.id, DialogStep::AwaitingOrderQuantity { app });
                        Reply::InvalidQuantity { input: text.to_string() }
                    },
                }
            },
            step => Reply::NotUnderstood { step: step.name().to_string() },
        };
        Ok(reply)
    }

    async fn on_file(&self, user: &UserProfile, file_ref: &str) -> Result<Reply, DialogError> {
        match self.sessions.current_step(user.id) {
            DialogStep::AwaitingReceipt { operation_code } => {
                let result = self.deposits.attach_receipt(&operation_code, file_ref).await;
                if !matches!(&result, Err(e) if e.is_validation()) {
                    self.sessions.reset(user.id);
                }
                settle(result, |deposit| Reply::ReceiptReceived { deposit })
            },
            step => Ok(Reply::NotUnderstood { step: step.name().to_string() }),
        }
    }
}

/// A deposit amount: a positive number with at most two decimals, up to [`MAX_DEPOSIT_AMOUNT`].
fn parse_amount(text: &str) -> Result<Money, String> {
    let amount = text.parse::<Money>().map_err(|e| e.to_string())?;
    if !amount.is_positive() {
        Err("The amount must be greater than zero".to_string())
    } else if amount > MAX_DEPOSIT_AMOUNT {
        Err(format!("The amount cannot be more than {MAX_DEPOSIT_AMOUNT}"))
    } else {
        Ok(amount)
    }
}

/// A whole number of codes, up to [`MAX_ORDER_QUANTITY`].
fn parse_quantity(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().filter(|q| (1..=MAX_ORDER_QUANTITY).contains(q))
}
