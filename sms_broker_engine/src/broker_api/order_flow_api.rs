use std::fmt::Debug;

use log::*;

use crate::{
    challenge::{Challenge, ChallengeAnswer},
    db_types::{Actor, Money, NewOrder, Order, OrderCode, UserId, UserProfile},
    events::{EventProducers, OrderEvent},
    order_objects::{ClaimedOrder, VerifyOutcome},
    pricing::{PriceSchedule, MAX_ORDER_QUANTITY},
    traits::{OrderFlowError, OrderManagement},
};

/// `OrderFlowApi` is the primary API for the order life cycle: clients submit orders, operators claim them and prove
/// they are human, and clients or admins may cancel them along the way.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B: Clone> Clone for OrderFlowApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), producers: self.producers.clone() }
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Prices and stores a new `Pending` order for `client`.
    ///
    /// User input is validated before it gets here, but an empty app name or a quantity outside
    /// `1..=MAX_ORDER_QUANTITY` is still refused.
    pub async fn submit_order(
        &self,
        client: &UserProfile,
        app: &str,
        quantity: i64,
        base_unit_price: Money,
    ) -> Result<Order, OrderFlowError> {
        let app = app.trim();
        if app.is_empty() {
            return Err(OrderFlowError::InvalidOrder("the app name is empty".into()));
        }
        let quote = PriceSchedule::new(base_unit_price).quote(quantity).ok_or_else(|| {
            OrderFlowError::InvalidOrder(format!(
                "{quantity} is not a valid quantity. Orders take between 1 and {MAX_ORDER_QUANTITY} codes"
            ))
        })?;
        let new_order = NewOrder {
            client: client.clone(),
            app: app.to_string(),
            quantity,
            unit_price: quote.unit_price,
            total_price: quote.total,
        };
        let order = self.db.insert_order(new_order).await?;
        info!(
            "🔄️📦️ Order {} created for client {}: {} x {} at {} = {}",
            order.order_code, client.id, order.quantity, order.app, order.unit_price, order.total_price
        );
        self.producers.publish_order_event(OrderEvent::Created(order.clone())).await;
        Ok(order)
    }

    /// Try to take the order for `operator`. Exactly one concurrent caller wins and receives a fresh challenge; the
    /// others get a conflict.
    pub async fn claim_order(&self, code: &OrderCode, operator: &UserProfile) -> Result<ClaimedOrder, OrderFlowError> {
        let order = self.db.claim_order(code, operator).await.map_err(|e| {
            if e.is_conflict() {
                debug!("🔄️📦️ Operator {} lost the claim on {code}. {e}", operator.id);
            }
            e
        })?;
        let challenge = Challenge::generate(&mut rand::thread_rng());
        info!("🔄️📦️ Order {code} claimed by operator {}", operator.id);
        let event = OrderEvent::Claimed { order: order.clone(), challenge: challenge.clone() };
        self.producers.publish_order_event(event).await;
        Ok(ClaimedOrder { order, challenge })
    }

    /// Checks the operator's answer. A correct answer moves the order to `Accepted`. A wrong one leaves it assigned to
    /// the same operator, who may ask for a new challenge.
    ///
    /// Answers for orders that are not assigned to `operator` are conflicts, whatever the chosen value.
    pub async fn verify_challenge(
        &self,
        answer: &ChallengeAnswer,
        operator: UserId,
    ) -> Result<VerifyOutcome, OrderFlowError> {
        let code = &answer.order_code;
        if answer.is_correct() {
            let order = self.db.accept_order(code, operator).await?;
            info!("🔄️📦️ Operator {operator} passed the challenge. Order {code} is accepted");
            self.producers.publish_order_event(OrderEvent::Accepted(order.clone())).await;
            Ok(VerifyOutcome::Accepted(order))
        } else {
            let order = self.assigned_order(code, operator).await?;
            info!("🔄️📦️ Operator {operator} failed the challenge for order {code}");
            self.producers.publish_order_event(OrderEvent::VerificationFailed(order.clone())).await;
            Ok(VerifyOutcome::Failed(order))
        }
    }

    /// Hands out a new challenge for an order that is still assigned to `operator`.
    pub async fn reissue_challenge(&self, code: &OrderCode, operator: UserId) -> Result<ClaimedOrder, OrderFlowError> {
        let order = self.assigned_order(code, operator).await?;
        let challenge = Challenge::generate(&mut rand::thread_rng());
        debug!("🔄️📦️ New challenge issued to operator {operator} for order {code}");
        let event = OrderEvent::Claimed { order: order.clone(), challenge: challenge.clone() };
        self.producers.publish_order_event(event).await;
        Ok(ClaimedOrder { order, challenge })
    }

    /// Cancels the order on behalf of `actor`. Cancelling a cancelled order succeeds without publishing anything.
    pub async fn cancel_order(&self, code: &OrderCode, actor: Actor) -> Result<Order, OrderFlowError> {
        let result = self.db.cancel_order(code, actor).await?;
        if result.changed {
            info!("🔄️📦️ Order {code} cancelled by {actor}");
            let event = OrderEvent::Cancelled {
                order: result.order.clone(),
                previous_operator: result.previous_operator,
                actor,
            };
            self.producers.publish_order_event(event).await;
        }
        Ok(result.order)
    }

    pub async fn fetch_order(&self, code: &OrderCode) -> Result<Option<Order>, OrderFlowError> {
        self.db.fetch_order(code).await
    }

    async fn assigned_order(&self, code: &OrderCode, operator: UserId) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order(code).await?.ok_or_else(|| OrderFlowError::OrderNotFound(code.clone()))?;
        if order.is_assigned_to(operator) {
            Ok(order)
        } else {
            Err(OrderFlowError::NotAssignedToOperator { code: code.clone(), operator })
        }
    }
}
