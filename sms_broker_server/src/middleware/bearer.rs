//! Bearer token middleware for the admin API.
//!
//! Every request must carry `Authorization: Bearer <token>`, where the token matches `SMSB_API_TOKEN`. Anything else
//! is answered with 401 before the request reaches a handler. An empty configured token refuses every request.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{debug, trace};
use smsb_common::Secret;

use crate::errors::ServerError;

pub struct BearerAuthFactory {
    token: Secret<String>,
}

impl BearerAuthFactory {
    pub fn new(token: Secret<String>) -> Self {
        BearerAuthFactory { token }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuthFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = BearerAuthService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthService { token: self.token.clone(), service: Rc::new(service) }))
    }
}

pub struct BearerAuthService<S> {
    token: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verdict = check_bearer_token(&req, &self.token);
        Box::pin(async move {
            verdict?;
            trace!("💻️ Bearer token accepted for {}", req.path());
            service.call(req).await
        })
    }
}

fn check_bearer_token(req: &ServiceRequest, token: &Secret<String>) -> Result<(), ServerError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ServerError::AuthenticationError("No Authorization header was provided".into()))?;
    let candidate = header
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| ServerError::AuthenticationError("The Authorization header is not a bearer token".into()))?;
    if token.is_empty() || !token.matches(candidate.trim()) {
        debug!("💻️ Rejected a request to {} with an invalid bearer token", req.path());
        return Err(ServerError::AuthenticationError("Invalid API token".into()));
    }
    Ok(())
}
