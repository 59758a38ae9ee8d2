//! Human-verification challenge handed to an operator right after a successful claim.
//!
//! The challenge is a simple addition with a handful of multiple-choice answers. Nothing is stored server side: each
//! answer button carries the order code, the chosen value and the correct value (see [`ChallengeAnswer`]).
use std::{fmt::Display, str::FromStr};

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::OrderCode;

pub const OPERAND_A_RANGE: std::ops::RangeInclusive<i64> = 100..=999;
pub const OPERAND_B_RANGE: std::ops::RangeInclusive<i64> = 10..=99;
const CALLBACK_PREFIX: &str = "captcha";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub operand_a: i64,
    pub operand_b: i64,
    /// The correct answer plus two or three decoys, shuffled
    pub options: Vec<i64>,
    pub correct: i64,
}

impl Challenge {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let operand_a = rng.gen_range(OPERAND_A_RANGE);
        let operand_b = rng.gen_range(OPERAND_B_RANGE);
        let correct = operand_a + operand_b;
        let decoy_count = rng.gen_range(2..=3);
        let mut options = decoys(correct, decoy_count, rng);
        options.push(correct);
        options.shuffle(rng);
        Self { operand_a, operand_b, options, correct }
    }

    pub fn question(&self) -> String {
        format!("{} + {} = ?", self.operand_a, self.operand_b)
    }

    pub fn is_correct(&self, chosen: i64) -> bool {
        chosen == self.correct
    }

    /// One answer per option, in display order.
    pub fn answers(&self, order_code: &OrderCode) -> Vec<ChallengeAnswer> {
        self.options
            .iter()
            .map(|&chosen| ChallengeAnswer { order_code: order_code.clone(), chosen, correct: self.correct })
            .collect()
    }
}

/// Perturbs the last digit of `correct`. Every offset in 1..=9 gives a different last digit, so the decoys are
/// distinct from each other and from the correct value. Should the result ever collide anyway, small offsets are used.
fn decoys<R: Rng + ?Sized>(correct: i64, count: usize, rng: &mut R) -> Vec<i64> {
    let base = correct - correct % 10;
    let last = correct % 10;
    let mut result: Vec<i64> = rand::seq::index::sample(rng, 9, count)
        .into_iter()
        .map(|i| base + (last + i as i64 + 1) % 10)
        .collect();
    result.dedup();
    let mut offset = 1;
    while result.len() < count {
        let candidate = correct + offset;
        if !result.contains(&candidate) {
            result.push(candidate);
        }
        offset += 1;
    }
    result
}

//--------------------------------------    ChallengeAnswer    ---------------------------------------------------------
/// A single answer button. Its wire form is `captcha|<order_code>|<chosen>|<correct>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeAnswer {
    pub order_code: OrderCode,
    pub chosen: i64,
    pub correct: i64,
}

impl ChallengeAnswer {
    pub fn is_correct(&self) -> bool {
        self.chosen == self.correct
    }
}

impl Display for ChallengeAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{CALLBACK_PREFIX}|{}|{}|{}", self.order_code, self.chosen, self.correct)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed challenge answer: {0}")]
pub struct ChallengeAnswerParseError(String);

impl FromStr for ChallengeAnswer {
    type Err = ChallengeAnswerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ChallengeAnswerParseError(s.to_string());
        let mut parts = s.split('|');
        if parts.next() != Some(CALLBACK_PREFIX) {
            return Err(err());
        }
        let order_code = parts.next().filter(|c| !c.is_empty()).ok_or_else(err)?;
        let chosen = parts.next().and_then(|v| v.parse::<i64>().ok()).ok_or_else(err)?;
        let correct = parts.next().and_then(|v| v.parse::<i64>().ok()).ok_or_else(err)?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self { order_code: OrderCode::from(order_code), chosen, correct })
    }
}
