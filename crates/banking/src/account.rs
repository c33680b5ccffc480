//! Account entity and its natural key.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use ledgerbank_core::{AccountId, ClientId, DomainError, DomainResult, Entity, Money};

/// Account number: a positive integer, unique across the system.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(i64);

impl AccountNumber {
    pub fn new(number: i64) -> DomainResult<Self> {
        if number <= 0 {
            return Err(DomainError::invalid_id(format!(
                "account number must be a positive integer: {number}"
            )));
        }
        Ok(Self(number))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for AccountNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: i64 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::invalid_id(format!("account number must be an integer: {s:?}")))?;
        Self::new(number)
    }
}

/// A client's account.
///
/// `balance` is the only mutable field, and it is mutated exclusively by the
/// ledger engine's deposit/withdraw operations through the store — never
/// directly. The `Money` type keeps it non-negative by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub number: AccountNumber,
    pub balance: Money,
    pub client_id: ClientId,
    pub opened_at: DateTime<Utc>,
}

impl Account {
    pub fn open(
        number: AccountNumber,
        client_id: ClientId,
        initial_balance: Money,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            number,
            balance: initial_balance,
            client_id,
            opened_at,
        }
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_number_must_be_positive() {
        assert!(AccountNumber::new(1001).is_ok());
        for bad in [0, -1, -1001] {
            let err = AccountNumber::new(bad).unwrap_err();
            assert!(matches!(err, DomainError::InvalidId(_)));
        }
    }

    #[test]
    fn account_number_parses_from_text() {
        assert_eq!("1001".parse::<AccountNumber>().unwrap().value(), 1001);
        assert!("10.5".parse::<AccountNumber>().is_err());
        assert!("-3".parse::<AccountNumber>().is_err());
        assert!("abc".parse::<AccountNumber>().is_err());
    }

    #[test]
    fn open_starts_with_the_given_balance() {
        let number = AccountNumber::new(1001).unwrap();
        let account = Account::open(number, ClientId::new(), Money::ZERO, Utc::now());
        assert_eq!(account.balance, Money::ZERO);
        assert_eq!(account.number, number);
    }
}
