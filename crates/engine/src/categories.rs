//! Record categories.
//!
//! Two labels are reserved and drive derivation rules: the instrument
//! payment label (a cash-settled payment against a credit instrument) and
//! the transfer label (one half of a linked pocket-to-pocket transfer).
//! Everything else is a free-form user label. Matching against the reserved
//! labels goes through NFKC normalization plus casefolding so `"Transfer"`
//! and `"transfer"` are the same category.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;

/// Wire label for payments against a credit instrument.
pub const INSTRUMENT_PAYMENT_LABEL: &str = "instrument payment";
/// Wire label for transfer record halves.
pub const TRANSFER_LABEL: &str = "transfer";

/// A record category.
///
/// Closed over the reserved labels so derivation code can match
/// exhaustively instead of comparing raw strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Category {
    InstrumentPayment,
    Transfer,
    Other(String),
}

fn normalized(label: &str) -> String {
    label.trim().nfkc().collect::<String>().to_lowercase()
}

impl Category {
    /// Parses a wire/user label into a category.
    ///
    /// Never fails: labels that are not reserved become [`Category::Other`]
    /// with the trimmed original spelling preserved.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match normalized(label).as_str() {
            INSTRUMENT_PAYMENT_LABEL => Self::InstrumentPayment,
            TRANSFER_LABEL => Self::Transfer,
            _ => Self::Other(label.trim().to_string()),
        }
    }

    /// Returns the wire label for this category.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::InstrumentPayment => INSTRUMENT_PAYMENT_LABEL,
            Self::Transfer => TRANSFER_LABEL,
            Self::Other(label) => label,
        }
    }

    #[must_use]
    pub fn is_instrument_payment(&self) -> bool {
        matches!(self, Self::InstrumentPayment)
    }

    #[must_use]
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer)
    }

    /// Returns `true` for the reserved labels that only engine operators may
    /// attach to records.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Category::parse(&label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_labels_fold_case_and_whitespace() {
        assert_eq!(Category::parse("transfer"), Category::Transfer);
        assert_eq!(Category::parse(" Transfer "), Category::Transfer);
        assert_eq!(
            Category::parse("Instrument Payment"),
            Category::InstrumentPayment
        );
    }

    #[test]
    fn free_form_keeps_original_spelling() {
        let category = Category::parse("  Mercado ");
        assert_eq!(category, Category::Other("Mercado".to_string()));
        assert_eq!(category.label(), "Mercado");
        assert!(!category.is_reserved());
    }

    #[test]
    fn nfkc_normalization_applies_to_reserved_match() {
        // Fullwidth letters normalize to ASCII under NFKC.
        assert_eq!(Category::parse("ｔｒａｎｓｆｅｒ"), Category::Transfer);
    }
}
