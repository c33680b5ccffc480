//! Fixed-point monetary values.
//!
//! Amounts are stored as an integer count of minor units (centavos), never as
//! a binary float, so arithmetic round-trips exactly. The type also carries
//! the ledger's central invariant: a `Money` is never negative, which makes
//! `checked_sub` double as the sufficiency check — subtracting more than the
//! current value yields `None` instead of a negative amount.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::entity::ValueObject;
use crate::error::DomainError;

const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// A non-negative monetary amount in minor units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from a minor-unit count, rejecting negative values.
    pub fn from_minor_units(units: i64) -> Result<Self, DomainError> {
        if units < 0 {
            return Err(DomainError::invalid_amount(format!(
                "amount cannot be negative ({units} minor units)"
            )));
        }
        Ok(Self(units))
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Add, returning `None` on overflow.
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtract, returning `None` when the result would go negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        if other.0 > self.0 {
            return None;
        }
        Some(Money(self.0 - other.0))
    }
}

impl ValueObject for Money {}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_UNITS_PER_MAJOR,
            self.0 % MINOR_UNITS_PER_MAJOR
        )
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parse a decimal string such as `"100"`, `"100.5"` or `"100.50"`.
    ///
    /// At most two fraction digits are accepted; anything finer would silently
    /// lose precision, so it is rejected instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::invalid_amount("amount cannot be empty"));
        }
        if s.starts_with('-') {
            return Err(DomainError::invalid_amount(format!(
                "amount cannot be negative: {s}"
            )));
        }

        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, ""),
        };

        if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_amount(format!(
                "amount must be a decimal number: {s}"
            )));
        }
        if minor.len() > 2 || !minor.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_amount(format!(
                "amount supports at most two fraction digits: {s}"
            )));
        }

        let major: i64 = major
            .parse()
            .map_err(|_| DomainError::invalid_amount(format!("amount out of range: {s}")))?;

        let minor: i64 = match minor.len() {
            0 => 0,
            1 => {
                // "100.5" means 50 minor units, not 5.
                minor
                    .parse::<i64>()
                    .map_err(|_| DomainError::invalid_amount(format!("amount out of range: {s}")))?
                    * 10
            }
            _ => minor
                .parse()
                .map_err(|_| DomainError::invalid_amount(format!("amount out of range: {s}")))?,
        };

        major
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .and_then(|m| m.checked_add(minor))
            .map(Money)
            .ok_or_else(|| DomainError::invalid_amount(format!("amount out of range: {s}")))
    }
}
