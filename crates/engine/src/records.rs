//! Money-movement records.
//!
//! A [`Record`] is a single income or expense event owned by exactly one
//! user. Records are the only source of truth: balances, pending amounts
//! and totals are always re-derived from the full record set, never stored.
//!
//! Pocket and instrument references are **soft**: deleting a pocket or an
//! instrument leaves records pointing at the dead id, and derivation code
//! must degrade gracefully (orphaned pocket references count as
//! unassigned; orphaned instrument references fail open as cash-affecting).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, Money, PaymentMethod, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for RecordKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid record kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: RecordKind,
    pub amount: Money,
    pub category: Category,
    pub payment: Option<PaymentMethod>,
    pub pocket_id: Option<Uuid>,
    /// Set on both halves of a transfer; each half points at its peer.
    pub linked_transfer_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: String,
        kind: RecordKind,
        amount: Money,
        category: Category,
        payment: Option<PaymentMethod>,
        pocket_id: Option<Uuid>,
        note: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            amount,
            category,
            payment,
            pocket_id,
            linked_transfer_id: None,
            note,
            created_at,
        })
    }

    /// Returns `true` if this record is one half of a linked transfer.
    #[must_use]
    pub fn is_transfer_half(&self) -> bool {
        self.linked_transfer_id.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub category: String,
    pub payment: Option<String>,
    pub pocket_id: Option<String>,
    pub linked_transfer_id: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Record> for ActiveModel {
    fn from(record: &Record) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            owner_id: ActiveValue::Set(record.owner_id.clone()),
            kind: ActiveValue::Set(record.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(record.amount.minor()),
            category: ActiveValue::Set(record.category.label().to_string()),
            payment: ActiveValue::Set(record.payment.map(PaymentMethod::as_wire)),
            pocket_id: ActiveValue::Set(record.pocket_id.map(|id| id.to_string())),
            linked_transfer_id: ActiveValue::Set(
                record.linked_transfer_id.map(|id| id.to_string()),
            ),
            note: ActiveValue::Set(record.note.clone()),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}

impl TryFrom<Model> for Record {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let payment = model
            .payment
            .as_deref()
            .map(PaymentMethod::parse_wire)
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "record")?,
            owner_id: model.owner_id,
            kind: RecordKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            category: Category::parse(&model.category),
            payment,
            pocket_id: model
                .pocket_id
                .as_deref()
                .map(|id| parse_uuid(id, "pocket"))
                .transpose()?,
            linked_transfer_id: model
                .linked_transfer_id
                .as_deref()
                .map(|id| parse_uuid(id, "record"))
                .transpose()?,
            note: model.note,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: RecordKind, amount: i64) -> Record {
        Record::new(
            "alice".to_string(),
            kind,
            Money::new(amount),
            Category::parse("Groceries"),
            Some(PaymentMethod::Cash),
            None,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_non_positive_amount() {
        let err = Record::new(
            "alice".to_string(),
            RecordKind::Expense,
            Money::ZERO,
            Category::parse("Groceries"),
            None,
            None,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount must be positive".to_string())
        );
    }

    #[test]
    fn model_round_trip() {
        let mut original = record(RecordKind::Expense, 1234);
        original.pocket_id = Some(Uuid::new_v4());
        let model = Model {
            id: original.id.to_string(),
            owner_id: original.owner_id.clone(),
            kind: original.kind.as_str().to_string(),
            amount_minor: original.amount.minor(),
            category: original.category.label().to_string(),
            payment: original.payment.map(PaymentMethod::as_wire),
            pocket_id: original.pocket_id.map(|id| id.to_string()),
            linked_transfer_id: None,
            note: None,
            created_at: original.created_at,
        };
        assert_eq!(Record::try_from(model).unwrap(), original);
    }
}
