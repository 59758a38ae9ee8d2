//! Identifies the admin behind a state-changing API request.
//!
//! The bearer token proves the caller is a trusted frontend. The frontend says which of its users is acting in the
//! `X-Actor-Id` header, and that user must be one of the configured admins.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use log::*;
use sms_broker_engine::db_types::UserId;

use crate::{config::ServerOptions, errors::ServerError};

pub const ACTOR_HEADER: &str = "X-Actor-Id";

/// An admin, as named by the `X-Actor-Id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminActor(pub UserId);

impl FromRequest for AdminActor {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(admin_from_request(req))
    }
}

fn admin_from_request(req: &HttpRequest) -> Result<AdminActor, ServerError> {
    let options = req
        .app_data::<web::Data<ServerOptions>>()
        .ok_or_else(|| ServerError::ConfigurationError("Server options are not available to request handlers".into()))?;
    let user = req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::InsufficientPermissions(format!("The {ACTOR_HEADER} header is required")))?
        .parse::<UserId>()
        .map_err(|e| ServerError::InsufficientPermissions(e.to_string()))?;
    if options.is_admin(user) {
        trace!("💻️ User {user} is acting as admin");
        Ok(AdminActor(user))
    } else {
        info!("💻️ User {user} attempted an admin action on {}", req.path());
        Err(ServerError::InsufficientPermissions(format!("User {user} is not an admin")))
    }
}
