//! Client entity and its natural key.

use chrono::{DateTime, NaiveDate, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use ledgerbank_core::{ClientId, DomainError, DomainResult, Entity};

/// National tax identifier: exactly eleven ASCII digits.
///
/// This is the client's natural key. It is unique across the system and
/// immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    pub const LEN: usize = 11;

    pub fn new(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if raw.len() != Self::LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!(
                "tax id must be exactly {} digits: {raw:?}",
                Self::LEN
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TaxId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaxId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Wire format for birth dates, kept from the upstream API contract.
const BIRTH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a birth date in `dd/mm/yyyy` form.
pub fn parse_birth_date(raw: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), BIRTH_DATE_FORMAT)
        .map_err(|_| DomainError::validation(format!("invalid birth date (expected dd/mm/yyyy): {raw:?}")))
}

/// A registered client.
///
/// The tax id is unique and immutable after creation; clients are never
/// deleted. Profile mutation flows are out of scope here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub tax_id: TaxId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub address: String,
    pub registered_at: DateTime<Utc>,
}

impl Client {
    /// Validate registration fields and build the client record.
    pub fn register(
        tax_id: TaxId,
        name: &str,
        birth_date: NaiveDate,
        address: &str,
        registered_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
            return Err(DomainError::validation(
                "name must contain only letters and spaces",
            ));
        }

        let address = address.trim();
        if address.is_empty() {
            return Err(DomainError::validation("address cannot be empty"));
        }
        if !address
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | ',' | '.' | '-'))
        {
            return Err(DomainError::validation(
                "address must contain only letters, digits and the characters , . -",
            ));
        }

        Ok(Self {
            id: ClientId::new(),
            tax_id,
            name: name.to_string(),
            birth_date,
            address: address.to_string(),
            registered_at,
        })
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tax_id() -> TaxId {
        TaxId::new("11111111111").unwrap()
    }

    fn test_birth_date() -> NaiveDate {
        parse_birth_date("01/01/1990").unwrap()
    }

    #[test]
    fn tax_id_requires_eleven_digits() {
        assert!(TaxId::new("12345678901").is_ok());
        assert!(TaxId::new(" 12345678901 ").is_ok());

        for bad in ["", "1234567890", "123456789012", "1234567890a", "12345-67890"] {
            let err = TaxId::new(bad).unwrap_err();
            match err {
                DomainError::InvalidId(_) => {}
                other => panic!("expected InvalidId for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn birth_date_uses_day_month_year() {
        assert_eq!(
            parse_birth_date("31/12/1985").unwrap(),
            NaiveDate::from_ymd_opt(1985, 12, 31).unwrap()
        );
        assert!(parse_birth_date("1985-12-31").is_err());
        assert!(parse_birth_date("32/01/1990").is_err());
    }

    #[test]
    fn register_accepts_accented_names() {
        let client = Client::register(
            test_tax_id(),
            "João da Silva",
            test_birth_date(),
            "Rua das Flores 123, Bairro Jardim",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(client.name, "João da Silva");
    }

    #[test]
    fn register_rejects_names_with_digits_or_punctuation() {
        for bad in ["", "   ", "John 3rd", "Jo@o"] {
            let err = Client::register(
                test_tax_id(),
                bad,
                test_birth_date(),
                "Rua A 1",
                Utc::now(),
            )
            .unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                other => panic!("expected Validation for name {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn register_rejects_addresses_with_odd_characters() {
        let err = Client::register(
            test_tax_id(),
            "Maria",
            test_birth_date(),
            "Rua A #1",
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn register_trims_whitespace() {
        let client = Client::register(
            test_tax_id(),
            "  Maria  ",
            test_birth_date(),
            "  Rua A 1  ",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(client.name, "Maria");
        assert_eq!(client.address, "Rua A 1");
    }
}
