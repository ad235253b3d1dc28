//! Stored recurring-transaction rules.
//!
//! Only the rule *shape* is part of the system: rules are created, listed,
//! edited and deleted, but nothing materializes them into records; there
//! is no scheduler or executor here.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Category, EngineError, Money, PaymentMethod, RecordKind, ResultEngine, util::parse_uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid frequency: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: RecordKind,
    pub amount: Money,
    pub category: Category,
    pub payment: Option<PaymentMethod>,
    pub frequency: Frequency,
    /// Capped at 28 so the rule is valid in every month.
    pub day_of_month: u8,
    pub is_active: bool,
    pub last_executed_at: Option<DateTime<Utc>>,
}

impl RecurringRule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: String,
        kind: RecordKind,
        amount: Money,
        category: Category,
        payment: Option<PaymentMethod>,
        frequency: Frequency,
        day_of_month: u8,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        if !(1..=28).contains(&day_of_month) {
            return Err(EngineError::InvalidRecord(
                "day of month must be between 1 and 28".to_string(),
            ));
        }
        if category.is_reserved() {
            return Err(EngineError::InvalidRecord(format!(
                "category \"{category}\" is reserved"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            amount,
            category,
            payment,
            frequency,
            day_of_month,
            is_active: true,
            last_executed_at: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub owner_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub category: String,
    pub payment: Option<String>,
    pub frequency: String,
    pub day_of_month: i32,
    pub is_active: bool,
    pub last_executed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&RecurringRule> for ActiveModel {
    fn from(rule: &RecurringRule) -> Self {
        Self {
            id: ActiveValue::Set(rule.id.to_string()),
            owner_id: ActiveValue::Set(rule.owner_id.clone()),
            kind: ActiveValue::Set(rule.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(rule.amount.minor()),
            category: ActiveValue::Set(rule.category.label().to_string()),
            payment: ActiveValue::Set(rule.payment.map(PaymentMethod::as_wire)),
            frequency: ActiveValue::Set(rule.frequency.as_str().to_string()),
            day_of_month: ActiveValue::Set(i32::from(rule.day_of_month)),
            is_active: ActiveValue::Set(rule.is_active),
            last_executed_at: ActiveValue::Set(rule.last_executed_at),
        }
    }
}

impl TryFrom<Model> for RecurringRule {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let day_of_month = u8::try_from(model.day_of_month).map_err(|_| {
            EngineError::InvalidRecord("day of month must be between 1 and 28".to_string())
        })?;
        Ok(Self {
            id: parse_uuid(&model.id, "recurring rule")?,
            owner_id: model.owner_id,
            kind: RecordKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount_minor),
            category: Category::parse(&model.category),
            payment: model
                .payment
                .as_deref()
                .map(PaymentMethod::parse_wire)
                .transpose()?,
            frequency: Frequency::try_from(model.frequency.as_str())?,
            day_of_month,
            is_active: model.is_active,
            last_executed_at: model.last_executed_at,
        })
    }
}
