//! Named pockets.
//!
//! A pocket is a named sub-total of the owner's money (savings, a debt
//! being paid off, a planned future spend). A pocket never stores its own
//! amount; the amount is derived from the record set on every read. The
//! implicit "general" pocket is not stored at all: records with no pocket
//! reference count toward the unassigned total.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PocketKind {
    General,
    Savings,
    Debt,
    /// Accumulates *planned* spend: the derived amount sums expense records
    /// only, unfiltered by payment instrument.
    Future,
}

impl PocketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Savings => "savings",
            Self::Debt => "debt",
            Self::Future => "future",
        }
    }
}

impl TryFrom<&str> for PocketKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "general" => Ok(Self::General),
            "savings" => Ok(Self::Savings),
            "debt" => Ok(Self::Debt),
            "future" => Ok(Self::Future),
            other => Err(EngineError::InvalidPocket(format!(
                "invalid pocket kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pocket {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub kind: PocketKind,
    pub goal: Option<Money>,
    /// Free-form period label ("2026-12", "next summer"); only meaningful
    /// for `future` pockets.
    pub target_period: Option<String>,
}

impl Pocket {
    pub fn new(
        owner_id: String,
        name: String,
        kind: PocketKind,
        goal: Option<Money>,
        target_period: Option<String>,
    ) -> ResultEngine<Self> {
        if let Some(goal) = goal
            && !goal.is_positive()
        {
            return Err(EngineError::InvalidAmount(
                "pocket goal must be positive".to_string(),
            ));
        }
        if target_period.is_some() && kind != PocketKind::Future {
            return Err(EngineError::InvalidPocket(
                "target period is only valid for future pockets".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            kind,
            goal,
            target_period,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pockets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub kind: String,
    pub goal_minor: Option<i64>,
    pub target_period: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Pocket> for ActiveModel {
    fn from(pocket: &Pocket) -> Self {
        Self {
            id: ActiveValue::Set(pocket.id.to_string()),
            owner_id: ActiveValue::Set(pocket.owner_id.clone()),
            name: ActiveValue::Set(pocket.name.clone()),
            kind: ActiveValue::Set(pocket.kind.as_str().to_string()),
            goal_minor: ActiveValue::Set(pocket.goal.map(Money::minor)),
            target_period: ActiveValue::Set(pocket.target_period.clone()),
        }
    }
}

impl TryFrom<Model> for Pocket {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "pocket")?,
            owner_id: model.owner_id,
            name: model.name,
            kind: PocketKind::try_from(model.kind.as_str())?,
            goal: model.goal_minor.map(Money::new),
            target_period: model.target_period,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_period_requires_future_kind() {
        let err = Pocket::new(
            "alice".to_string(),
            "Vacaciones".to_string(),
            PocketKind::Savings,
            None,
            Some("2026-12".to_string()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidPocket("target period is only valid for future pockets".to_string())
        );
    }

    #[test]
    fn goal_must_be_positive() {
        let err = Pocket::new(
            "alice".to_string(),
            "Ahorros".to_string(),
            PocketKind::Savings,
            Some(Money::ZERO),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("pocket goal must be positive".to_string())
        );
    }
}
