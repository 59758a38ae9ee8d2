//! # SMS broker server
//! The HTTP face of the SMS broker. It is responsible for:
//! * Accepting chat events from a transport adapter on `/api/dialog` and answering with the typed reply.
//! * Giving admins a token-guarded API to inspect and resolve orders and deposits.
//! * Forwarding order and deposit events to the configured [`notifier`].
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: The admin API and the dialog webhook. See [routes](routes/index.html).

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod notifier;
pub mod routes;
pub mod server;
pub mod session_worker;

#[cfg(test)]
mod endpoint_tests;
