use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use smsb_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        UserId         ---------------------------------------------------------
/// The identifier the chat transport assigns to a person. Clients, operators and admins all share this id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|_| ConversionError(format!("Invalid user id: {s}")))
    }
}

/// A user as seen by the transport: id plus whatever display name came with the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
}

impl UserProfile {
    pub fn new<S: Into<String>>(id: UserId, name: S) -> Self {
        Self { id, name: name.into() }
    }
}

/// Who is asking for a state change. Admin privileges are granted by the caller (from configuration), not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Client(UserId),
    Admin(UserId),
}

impl Actor {
    pub fn user_id(&self) -> UserId {
        match self {
            Actor::Client(id) | Actor::Admin(id) => *id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin(_))
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Client(id) => write!(f, "client {id}"),
            Actor::Admin(id) => write!(f, "admin {id}"),
        }
    }
}

//--------------------------------------       OrderCode       ---------------------------------------------------------
/// The human-facing order reference, e.g. `#0042-K7Q`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderCode(pub String);

impl OrderCode {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OrderCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OrderCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

//--------------------------------------     OperationCode     ---------------------------------------------------------
/// The human-facing deposit reference, e.g. `REC-241016093012-7KQ2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OperationCode(pub String);

impl OperationCode {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OperationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OperationCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OperationCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// Submitted by a client and waiting for an operator to claim it.
    Pending,
    /// Claimed by exactly one operator, who still has to pass the verification challenge.
    Assigned,
    /// The claiming operator passed the challenge. Terminal.
    Accepted,
    /// Withdrawn by the client or an admin. Terminal.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Assigned => write!(f, "Assigned"),
            OrderStatusType::Accepted => write!(f, "Accepted"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "accepted" => Ok(Self::Accepted),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------  DepositStatusType    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum DepositStatusType {
    /// Opened by the client; the receipt may or may not have been uploaded yet.
    Pending,
    /// Staff confirmed the payment and the client's balance was credited. Terminal.
    Accepted,
    /// Staff could not confirm the payment. Terminal.
    Rejected,
}

impl Display for DepositStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositStatusType::Pending => write!(f, "Pending"),
            DepositStatusType::Accepted => write!(f, "Accepted"),
            DepositStatusType::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for DepositStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ConversionError(format!("Invalid deposit status: {s}"))),
        }
    }
}

//--------------------------------------        Client         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    pub balance: Money,
    pub orders_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       Operator        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Operator {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    pub retirable_balance: Money,
    pub accepted: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_code: OrderCode,
    pub client_id: UserId,
    pub app: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub status: OrderStatusType,
    /// Set if and only if the order is `Assigned` or `Accepted`
    pub operator_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_assigned_to(&self, operator: UserId) -> bool {
        self.status == OrderStatusType::Assigned && self.operator_id == Some(operator)
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub client: UserProfile,
    /// The app or service the verification codes are for
    pub app: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

//--------------------------------------        Deposit        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Deposit {
    pub id: i64,
    pub operation_code: OperationCode,
    pub client_id: UserId,
    pub amount: Money,
    pub status: DepositStatusType,
    /// A transport-specific reference to the uploaded receipt, e.g. a file id or path
    pub receipt_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

//--------------------------------------       NewDeposit      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeposit {
    pub client: UserProfile,
    pub amount: Money,
}
