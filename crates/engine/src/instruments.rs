//! Payment instruments (debit and credit cards/accounts).
//!
//! Only credit instruments carry a pending (unpaid) amount, and it is never
//! stored: it is derived from the records tagged against the instrument.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Debit,
    Credit,
}

impl InstrumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for InstrumentKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(EngineError::InvalidInstrument(format!(
                "invalid instrument kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: Uuid,
    pub owner_id: String,
    pub issuer: String,
    pub kind: InstrumentKind,
    pub last4: String,
    pub display_name: String,
    pub credit_limit: Option<Money>,
}

impl Instrument {
    pub fn new(
        owner_id: String,
        issuer: String,
        kind: InstrumentKind,
        last4: String,
        display_name: String,
        credit_limit: Option<Money>,
    ) -> ResultEngine<Self> {
        if last4.len() != 4 || !last4.chars().all(|c| c.is_ascii_digit()) {
            return Err(EngineError::InvalidInstrument(
                "last4 must be exactly four digits".to_string(),
            ));
        }
        if credit_limit.is_some() && kind != InstrumentKind::Credit {
            return Err(EngineError::InvalidInstrument(
                "credit limit is only valid for credit instruments".to_string(),
            ));
        }
        if let Some(limit) = credit_limit
            && !limit.is_positive()
        {
            return Err(EngineError::InvalidAmount(
                "credit limit must be positive".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            issuer,
            kind,
            last4,
            display_name,
            credit_limit,
        })
    }

    #[must_use]
    pub fn is_credit(&self) -> bool {
        self.kind == InstrumentKind::Credit
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "instruments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub issuer: String,
    pub kind: String,
    pub last4: String,
    pub display_name: String,
    pub credit_limit_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Instrument> for ActiveModel {
    fn from(instrument: &Instrument) -> Self {
        Self {
            id: ActiveValue::Set(instrument.id.to_string()),
            owner_id: ActiveValue::Set(instrument.owner_id.clone()),
            issuer: ActiveValue::Set(instrument.issuer.clone()),
            kind: ActiveValue::Set(instrument.kind.as_str().to_string()),
            last4: ActiveValue::Set(instrument.last4.clone()),
            display_name: ActiveValue::Set(instrument.display_name.clone()),
            credit_limit_minor: ActiveValue::Set(instrument.credit_limit.map(Money::minor)),
        }
    }
}

impl TryFrom<Model> for Instrument {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "instrument")?,
            owner_id: model.owner_id,
            issuer: model.issuer,
            kind: InstrumentKind::try_from(model.kind.as_str())?,
            last4: model.last4,
            display_name: model.display_name,
            credit_limit: model.credit_limit_minor.map(Money::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last4_must_be_digits() {
        let err = Instrument::new(
            "alice".to_string(),
            "Bancolombia".to_string(),
            InstrumentKind::Debit,
            "12ab".to_string(),
            "Debito".to_string(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInstrument("last4 must be exactly four digits".to_string())
        );
    }

    #[test]
    fn credit_limit_only_on_credit_kind() {
        let err = Instrument::new(
            "alice".to_string(),
            "Bancolombia".to_string(),
            InstrumentKind::Debit,
            "1234".to_string(),
            "Debito".to_string(),
            Some(Money::new(100_000)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInstrument(
                "credit limit is only valid for credit instruments".to_string()
            )
        );
    }
}
