//! Recurring-rule storage operations.
//!
//! Rules are stored and managed here; nothing executes them.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    EngineError, RecurringRule, ResultEngine, RuleNewCmd, RuleUpdateCmd, recurring,
};

use super::Engine;

impl Engine {
    /// Stores a new recurring rule.
    pub async fn new_rule(&self, cmd: RuleNewCmd) -> ResultEngine<Uuid> {
        let rule = RecurringRule::new(
            cmd.owner_id,
            cmd.kind,
            cmd.amount,
            cmd.category,
            cmd.payment,
            cmd.frequency,
            cmd.day_of_month,
        )?;
        recurring::ActiveModel::from(&rule)
            .insert(&self.database)
            .await?;
        Ok(rule.id)
    }

    /// Lists the owner's rules, stable by day of month then id.
    pub async fn list_rules(&self, owner_id: &str) -> ResultEngine<Vec<RecurringRule>> {
        let models = recurring::Entity::find()
            .filter(recurring::Column::OwnerId.eq(owner_id))
            .order_by_asc(recurring::Column::DayOfMonth)
            .order_by_asc(recurring::Column::Id)
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(RecurringRule::try_from(model)?);
        }
        Ok(out)
    }

    /// Replaces a rule in place; `last_executed_at` is preserved.
    pub async fn update_rule(&self, cmd: RuleUpdateCmd) -> ResultEngine<()> {
        let stored = self.require_rule(&cmd.owner_id, cmd.rule_id).await?;

        let mut replacement = RecurringRule::new(
            cmd.owner_id,
            cmd.kind,
            cmd.amount,
            cmd.category,
            cmd.payment,
            cmd.frequency,
            cmd.day_of_month,
        )?;
        replacement.id = stored.id;
        replacement.is_active = cmd.is_active;
        replacement.last_executed_at = stored.last_executed_at;

        recurring::ActiveModel::from(&replacement)
            .update(&self.database)
            .await?;
        Ok(())
    }

    /// Deletes a rule.
    pub async fn delete_rule(&self, owner_id: &str, rule_id: Uuid) -> ResultEngine<()> {
        self.require_rule(owner_id, rule_id).await?;
        recurring::Entity::delete_by_id(rule_id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn require_rule(&self, owner_id: &str, rule_id: Uuid) -> ResultEngine<RecurringRule> {
        let model = recurring::Entity::find_by_id(rule_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("recurring rule not exists".to_string()))?;
        if model.owner_id != owner_id {
            return Err(EngineError::KeyNotFound(
                "recurring rule not exists".to_string(),
            ));
        }
        RecurringRule::try_from(model)
    }
}
