use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sms_broker_engine::{
    db_types::{Client, Deposit, UserId, UserProfile},
    dialog::{Intent, Reply},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// One inbound chat event, forwarded by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub name: String,
    pub intent: Intent,
}

impl DialogRequest {
    pub fn profile(&self) -> UserProfile {
        UserProfile::new(self.user_id, self.name.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogResponse {
    pub user_id: UserId,
    pub reply: Reply,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterOperatorRequest {
    pub user_id: UserId,
    pub name: String,
}

/// The outcome of an accepted deposit: the deposit and the credited client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedDeposit {
    pub deposit: Deposit,
    pub client: Client,
}
