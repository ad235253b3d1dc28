//! Shared expenses.
//!
//! A [`SharedExpense`] records that one room member paid an amount on
//! behalf of a weighted set of participants. The per-participant weights
//! live in the `expense_shares` child table; the expense row holds the
//! event itself. Expenses are immutable except for full replace-in-place by
//! their creator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, expense_shares, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedExpense {
    pub id: Uuid,
    pub room_id: Uuid,
    pub amount: Money,
    pub payer_id: String,
    /// Participant user id -> positive integer share weight.
    pub shares: BTreeMap<String, u32>,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl SharedExpense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        room_id: Uuid,
        amount: Money,
        payer_id: String,
        shares: BTreeMap<String, u32>,
        note: Option<String>,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        if shares.is_empty() {
            return Err(EngineError::InvalidShare(
                "an expense needs at least one participant".to_string(),
            ));
        }
        if shares.values().any(|&weight| weight == 0) {
            return Err(EngineError::InvalidShare(
                "share weights must be positive".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            room_id,
            amount,
            payer_id,
            shares,
            note,
            created_by,
            created_at,
        })
    }

    /// Sum of all participant weights; never zero for a validated expense.
    #[must_use]
    pub fn total_shares(&self) -> u64 {
        self.shares.values().map(|&w| u64::from(w)).sum()
    }

    /// Rebuilds an expense from its stored row plus its share rows.
    pub fn try_from_models(
        model: Model,
        share_models: Vec<expense_shares::Model>,
    ) -> ResultEngine<Self> {
        let mut shares = BTreeMap::new();
        for share in share_models {
            let weight = u32::try_from(share.weight).map_err(|_| {
                EngineError::InvalidShare("share weights must be positive".to_string())
            })?;
            shares.insert(share.member_id, weight);
        }
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            room_id: parse_uuid(&model.room_id, "room")?,
            amount: Money::new(model.amount_minor),
            payer_id: model.payer_id,
            shares,
            note: model.note,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }

    /// Share rows for persistence, one per participant.
    #[must_use]
    pub fn share_models(&self) -> Vec<expense_shares::ActiveModel> {
        self.shares
            .iter()
            .map(|(member_id, &weight)| expense_shares::ActiveModel {
                expense_id: ActiveValue::Set(self.id.to_string()),
                member_id: ActiveValue::Set(member_id.clone()),
                weight: ActiveValue::Set(i64::from(weight)),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub room_id: String,
    pub amount_minor: i64,
    pub payer_id: String,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rooms::Entity",
        from = "Column::RoomId",
        to = "super::rooms::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Rooms,
    #[sea_orm(has_many = "super::expense_shares::Entity")]
    Shares,
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl Related<super::expense_shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SharedExpense> for ActiveModel {
    fn from(expense: &SharedExpense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            room_id: ActiveValue::Set(expense.room_id.to_string()),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            payer_id: ActiveValue::Set(expense.payer_id.clone()),
            note: ActiveValue::Set(expense.note.clone()),
            created_by: ActiveValue::Set(expense.created_by.clone()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}
