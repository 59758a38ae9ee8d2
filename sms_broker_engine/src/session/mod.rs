//! Per-user conversation state.
//!
//! A user working through a multi-step dialog (entering a deposit amount, picking an app and quantity, uploading a
//! receipt) has a [`DialogStep`] in the [`SessionStore`]. Sessions only live in memory and expire after a period of
//! inactivity.
mod step;
mod store;

pub use step::DialogStep;
pub use store::{SessionStore, DEFAULT_IDLE_TIMEOUT_MINUTES};
