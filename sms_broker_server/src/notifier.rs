//! The notifier the server ships with. It writes every notice to the log instead of a chat.
//!
//! A transport adapter that polls `/api/dialog` can tail these lines, or replace [`LogNotifier`] with a real
//! [`Notifier`] when embedding the engine.
use log::*;
use sms_broker_engine::{
    db_types::Money,
    notifier::{Delivery, Notice, Notifier, NotifyError, Recipient},
};

use crate::config::ServerConfig;

#[derive(Debug, Clone)]
pub struct LogNotifier {
    orders_channel: Option<i64>,
    deposits_channel: Option<i64>,
    payout: Money,
}

impl LogNotifier {
    pub fn new(orders_channel: Option<i64>, deposits_channel: Option<i64>, payout: Money) -> Self {
        Self { orders_channel, deposits_channel, payout }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.orders_channel_id, config.deposits_channel_id, config.operator_payout)
    }

    /// The chat a notice for `recipient` would go to, if one is configured.
    fn chat_for(&self, recipient: Recipient) -> Result<i64, NotifyError> {
        let chat = match recipient {
            Recipient::User(id) => Some(id.0),
            Recipient::OrdersChannel => self.orders_channel,
            Recipient::DepositsChannel => self.deposits_channel,
        };
        chat.ok_or_else(|| NotifyError { recipient, reason: "No chat is configured for this channel".into() })
    }

    fn render(&self, notice: &Notice) -> String {
        match notice {
            Notice::OrderCreated { quantity, .. } => match self.payout.checked_mul(*quantity) {
                Some(earnings) => format!("{notice}. Operator earns {} per code ({earnings} in total)", self.payout),
                None => format!("{notice}. Operator earns {} per code", self.payout),
            },
            _ => notice.to_string(),
        }
    }
}

impl Notifier for LogNotifier {
    fn deliver(&self, recipient: Recipient, notice: Notice) -> Delivery {
        let result = self.chat_for(recipient).map(|chat| {
            info!("📬️ [chat {chat}] {}", self.render(&notice));
        });
        Box::pin(async move { result })
    }
}
