use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    challenge::ChallengeAnswer,
    db_types::{OperationCode, OrderCode},
};

/// Something a user did, as reported by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Intent {
    /// `/start`
    Start,
    /// `/cancel`
    Cancel,
    Text(String),
    Button(ButtonAction),
    /// An uploaded file, identified by whatever reference the transport uses
    File(String),
}

impl Intent {
    /// Interprets a plain text message, recognising the `/start` and `/cancel` commands.
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        match text.trim() {
            "/start" => Intent::Start,
            "/cancel" => Intent::Cancel,
            _ => Intent::Text(text),
        }
    }
}

/// A button press. The string form is the callback data attached to the button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ButtonAction {
    Deposit,
    ConfirmDeposit,
    CancelDeposit,
    Sms,
    ConfirmOrder,
    CancelOrder,
    History,
    Profile,
    Info,
    /// An operator wants to take this order
    ClaimOrder(OrderCode),
    /// An operator picked a challenge answer
    Answer(ChallengeAnswer),
    /// An operator who failed a challenge wants another one
    NewChallenge(OrderCode),
    /// A client withdraws one of their orders
    WithdrawOrder(OrderCode),
    /// Staff approve a deposit
    AcceptDeposit(OperationCode),
    /// Staff turn a deposit down
    RejectDeposit(OperationCode),
}

impl Display for ButtonAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ButtonAction::Deposit => write!(f, "deposit"),
            ButtonAction::ConfirmDeposit => write!(f, "confirm_deposit"),
            ButtonAction::CancelDeposit => write!(f, "cancel_deposit"),
            ButtonAction::Sms => write!(f, "sms"),
            ButtonAction::ConfirmOrder => write!(f, "confirm_order"),
            ButtonAction::CancelOrder => write!(f, "cancel_order"),
            ButtonAction::History => write!(f, "historial"),
            ButtonAction::Profile => write!(f, "perfil"),
            ButtonAction::Info => write!(f, "info"),
            ButtonAction::ClaimOrder(code) => write!(f, "order_accept|{code}"),
            ButtonAction::Answer(answer) => write!(f, "{answer}"),
            ButtonAction::NewChallenge(code) => write!(f, "captcha_new|{code}"),
            ButtonAction::WithdrawOrder(code) => write!(f, "order_cancel|{code}"),
            ButtonAction::AcceptDeposit(code) => write!(f, "deposit_accept|{code}"),
            ButtonAction::RejectDeposit(code) => write!(f, "deposit_reject|{code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown button: {0}")]
pub struct UnknownButton(String);

impl FromStr for ButtonAction {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownButton(s.to_string());
        let action = match s.split_once('|') {
            None => match s {
                "deposit" => ButtonAction::Deposit,
                "confirm_deposit" => ButtonAction::ConfirmDeposit,
                "cancel_deposit" => ButtonAction::CancelDeposit,
                "sms" => ButtonAction::Sms,
                "confirm_order" => ButtonAction::ConfirmOrder,
                "cancel_order" => ButtonAction::CancelOrder,
                "historial" => ButtonAction::History,
                "perfil" => ButtonAction::Profile,
                "info" => ButtonAction::Info,
                _ => return Err(unknown()),
            },
            Some(("captcha", _)) => ButtonAction::Answer(s.parse().map_err(|_| unknown())?),
            Some((_, "")) => return Err(unknown()),
            Some(("order_accept", code)) => ButtonAction::ClaimOrder(OrderCode::from(code)),
            Some(("captcha_new", code)) => ButtonAction::NewChallenge(OrderCode::from(code)),
            Some(("order_cancel", code)) => ButtonAction::WithdrawOrder(OrderCode::from(code)),
            Some(("deposit_accept", code)) => ButtonAction::AcceptDeposit(OperationCode::from(code)),
            Some(("deposit_reject", code)) => ButtonAction::RejectDeposit(OperationCode::from(code)),
            Some(_) => return Err(unknown()),
        };
        Ok(action)
    }
}

impl TryFrom<String> for ButtonAction {
    type Error = UnknownButton;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ButtonAction> for String {
    fn from(value: ButtonAction) -> Self {
        value.to_string()
    }
}
