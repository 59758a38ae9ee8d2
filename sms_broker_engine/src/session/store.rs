use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use log::*;

use crate::{db_types::UserId, session::DialogStep};

pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
struct Session {
    step: DialogStep,
    last_seen: DateTime<Utc>,
}

/// Concurrent, in-memory map of user sessions.
///
/// Cloning is cheap and every clone sees the same sessions. A session that has been idle for longer than the timeout
/// is treated as if it never existed, whether or not the background sweep has removed it yet.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<UserId, Session>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES))
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self { sessions: Arc::new(DashMap::new()), idle_timeout }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn current_step(&self, user: UserId) -> DialogStep {
        self.current_step_at(user, Utc::now())
    }

    pub fn current_step_at(&self, user: UserId, now: DateTime<Utc>) -> DialogStep {
        let timeout = self.idle_timeout;
        if self.sessions.remove_if(&user, |_, s| now - s.last_seen > timeout).is_some() {
            debug!("💬️ Session for {user} expired");
            return DialogStep::Idle;
        }
        self.sessions.get(&user).map(|s| s.step.clone()).unwrap_or_default()
    }

    /// Moves the user to `step`, refreshing their activity time. Advancing to `Idle` ends the session.
    pub fn advance(&self, user: UserId, step: DialogStep) {
        self.advance_at(user, step, Utc::now())
    }

    pub fn advance_at(&self, user: UserId, step: DialogStep, now: DateTime<Utc>) {
        trace!("💬️ {user} -> {}", step.name());
        if step.is_idle() {
            self.sessions.remove(&user);
        } else {
            self.sessions.insert(user, Session { step, last_seen: now });
        }
    }

    /// Drops the user's session. Returns `true` if there was one.
    pub fn reset(&self, user: UserId) -> bool {
        self.sessions.remove(&user).is_some()
    }

    /// Removes every session that has been idle for longer than the timeout and returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Utc::now())
    }

    pub fn evict_idle_at(&self, now: DateTime<Utc>) -> usize {
        let timeout = self.idle_timeout;
        let mut evicted = 0;
        self.sessions.retain(|_, s| {
            let keep = now - s.last_seen <= timeout;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
