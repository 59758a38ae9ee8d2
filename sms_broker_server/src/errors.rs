use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use sms_broker_engine::{dialog::DialogError, AccountApiError, DepositError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    ValidationError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        if e.is_conflict() {
            Self::Conflict(e.to_string())
        } else if e.is_not_found() {
            Self::NoRecordFound(e.to_string())
        } else if e.is_validation() {
            Self::ValidationError(e.to_string())
        } else {
            error!("💻️ Order flow failure. {e}");
            Self::BackendError(e.to_string())
        }
    }
}

impl From<DepositError> for ServerError {
    fn from(e: DepositError) -> Self {
        if e.is_conflict() {
            Self::Conflict(e.to_string())
        } else if e.is_not_found() {
            Self::NoRecordFound(e.to_string())
        } else if e.is_validation() {
            Self::ValidationError(e.to_string())
        } else {
            error!("💻️ Deposit flow failure. {e}");
            Self::BackendError(e.to_string())
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::QueryError(s) => Self::ValidationError(s),
            AccountApiError::DatabaseError(s) => {
                error!("💻️ Account query failure. {s}");
                Self::BackendError(format!("Database error: {s}"))
            },
        }
    }
}

impl From<DialogError> for ServerError {
    fn from(e: DialogError) -> Self {
        match e {
            DialogError::Order(e) => e.into(),
            DialogError::Deposit(e) => e.into(),
            DialogError::Account(e) => e.into(),
        }
    }
}
