use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_SYMBOL: &str = "$";

//--------------------------------------       Money         ---------------------------------------------------------
/// A monetary amount, stored as a whole number of cents.
///
/// Balances, prices and deposit amounts all use this type, so arithmetic is always exact.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `None` if the product does not fit.
    pub fn checked_mul(self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Never goes below zero.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self((self.0 - rhs.0).max(0))
    }
}

/// Renders as `$1,234.50`, matching how amounts are shown to clients and staff.
impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        let units = (cents / 100).to_string();
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, c) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        write!(f, "{sign}{CURRENCY_SYMBOL}{grouped}.{:02}", cents % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("No amount was given")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' is too large")]
    Overflow(String),
}

/// Parses user-entered amounts such as `100`, `99.5`, `$1,250.00`. Negative amounts are not accepted here; a leading
/// minus sign is reported as not-a-number.
impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix(CURRENCY_SYMBOL).unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let digits = trimmed.replace(',', "");
        let (units, fraction) = match digits.split_once('.') {
            Some((u, f)) => (u, f),
            None => (digits.as_str(), ""),
        };
        let all_digits = |v: &str| v.chars().all(|c| c.is_ascii_digit());
        if (units.is_empty() && fraction.is_empty()) || !all_digits(units) || !all_digits(fraction) {
            return Err(MoneyParseError::NotANumber(s.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }
        let overflow = || MoneyParseError::Overflow(s.to_string());
        let units = if units.is_empty() { 0 } else { units.parse::<i64>().map_err(|_| overflow())? };
        let fraction = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| overflow())? * 10,
            _ => fraction.parse::<i64>().map_err(|_| overflow())?,
        };
        units.checked_mul(100).and_then(|c| c.checked_add(fraction)).map(Money).ok_or_else(overflow)
    }
}
