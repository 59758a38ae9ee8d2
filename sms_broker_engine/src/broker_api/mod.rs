//! # SMS broker public API
//!
//! The `broker_api` module exposes the programmatic API for the broker. It is split along the same lines as the
//! backend traits, so that callers only ask for the capabilities they need.
//!
//! * [`order_flow_api`] drives the order state machine: submission, claims, challenge verification and cancellation.
//! * [`deposit_flow_api`] drives the deposit ledger: opening deposits, attaching receipts and staff resolution.
//! * [`accounts_api`] answers read-only questions about clients, operators, orders and deposits.
//!
//! # API usage
//!
//! Every API is created by supplying a backend that implements the matching trait. The flow APIs also take the
//! [`EventProducers`](crate::events::EventProducers) they publish to.
//!
//! ```rust,ignore
//! use sms_broker_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/sms_broker.db", 5).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let order = api.submit_order(&client, "WhatsApp", 30, Money::from_units(10)).await?;
//! ```

pub mod accounts_api;
pub mod deposit_flow_api;
pub mod order_flow_api;
pub mod order_objects;
