use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::db_types::{OperationCode, OrderCode};

/// Digits and upper-case letters, minus the ones that are easy to confuse when read aloud (0/O, 1/I/L).
const SUFFIX_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";
const ORDER_SUFFIX_LEN: usize = 3;
const OPERATION_SUFFIX_LEN: usize = 4;

/// Generates order and operation codes.
///
/// Codes combine a per-process sequence number (orders) or a timestamp (deposits) with a short random suffix, so two
/// processes sharing a database, or a restarted process, are unlikely to collide. The schema still enforces
/// uniqueness, and callers retry with a fresh code when an insert hits the constraint.
#[derive(Debug)]
pub struct CodeGenerator {
    counter: AtomicU64,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(start: u64) -> Self {
        Self { counter: AtomicU64::new(start) }
    }

    /// e.g. `#0042-K7Q`
    pub fn next_order_code(&self) -> OrderCode {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        OrderCode(format!("#{seq:04}-{}", random_suffix(ORDER_SUFFIX_LEN)))
    }

    /// e.g. `REC-241016093012-7KQ2`
    pub fn next_operation_code(&self, now: DateTime<Utc>) -> OperationCode {
        OperationCode(format!("REC-{}-{}", now.format("%y%m%d%H%M%S"), random_suffix(OPERATION_SUFFIX_LEN)))
    }
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char).collect()
}
