//! Payment instruments attached to records.
//!
//! A record can be paid in cash, through a debit instrument, or through a
//! credit instrument. The wire/storage encoding is `"cash"`,
//! `"debit:<uuid>"` or `"credit:<uuid>"`; an absent value means the record
//! carries no instrument information and is treated like cash.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::EngineError;

const DEBIT_PREFIX: &str = "debit:";
const CREDIT_PREFIX: &str = "credit:";

/// How a record was paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Debit(Uuid),
    Credit(Uuid),
}

impl PaymentMethod {
    /// Returns the referenced instrument id, if any.
    #[must_use]
    pub fn instrument_id(self) -> Option<Uuid> {
        match self {
            Self::Cash => None,
            Self::Debit(id) | Self::Credit(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_credit(self) -> bool {
        matches!(self, Self::Credit(_))
    }

    /// Encodes the method for storage and the wire.
    #[must_use]
    pub fn as_wire(self) -> String {
        match self {
            Self::Cash => "cash".to_string(),
            Self::Debit(id) => format!("{DEBIT_PREFIX}{id}"),
            Self::Credit(id) => format!("{CREDIT_PREFIX}{id}"),
        }
    }

    /// Decodes a stored/wire payment method.
    pub fn parse_wire(value: &str) -> Result<Self, EngineError> {
        let invalid =
            || EngineError::InvalidInstrument(format!("invalid payment method: {value}"));

        if value == "cash" {
            return Ok(Self::Cash);
        }
        if let Some(id) = value.strip_prefix(DEBIT_PREFIX) {
            return Uuid::parse_str(id).map(Self::Debit).map_err(|_| invalid());
        }
        if let Some(id) = value.strip_prefix(CREDIT_PREFIX) {
            return Uuid::parse_str(id).map(Self::Credit).map_err(|_| invalid());
        }
        Err(invalid())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_wire())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_wire())
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        PaymentMethod::parse_wire(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        let id = Uuid::new_v4();
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Debit(id),
            PaymentMethod::Credit(id),
        ] {
            assert_eq!(PaymentMethod::parse_wire(&method.as_wire()).unwrap(), method);
        }
    }

    #[test]
    fn parse_rejects_unknown_schemes() {
        assert!(PaymentMethod::parse_wire("cheque:abc").is_err());
        assert!(PaymentMethod::parse_wire("debit:not-a-uuid").is_err());
        assert!(PaymentMethod::parse_wire("").is_err());
    }
}
