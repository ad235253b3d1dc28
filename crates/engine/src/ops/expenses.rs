//! Shared expense writes.

use std::collections::BTreeMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseNewCmd, ExpenseUpdateCmd, ResultEngine, SharedExpense, expense_shares,
    expenses, util::normalize_optional_text,
};

use super::{Engine, with_tx};

fn collect_shares(pairs: &[(String, u32)]) -> ResultEngine<BTreeMap<String, u32>> {
    let mut shares = BTreeMap::new();
    for (member_id, weight) in pairs {
        if shares.insert(member_id.clone(), *weight).is_some() {
            return Err(EngineError::InvalidShare(format!(
                "participant \"{member_id}\" is listed twice"
            )));
        }
    }
    Ok(shares)
}

impl Engine {
    /// Records a shared expense; payer, creator and every participant must
    /// be room members.
    pub async fn new_expense(&self, cmd: ExpenseNewCmd) -> ResultEngine<Uuid> {
        self.require_room(cmd.room_id).await?;
        self.require_member(cmd.room_id, &cmd.created_by).await?;

        let shares = collect_shares(&cmd.shares)?;
        let expense = SharedExpense::new(
            cmd.room_id,
            cmd.amount,
            cmd.payer_id,
            shares,
            normalize_optional_text(cmd.note.as_deref()),
            cmd.created_by,
            cmd.created_at,
        )?;
        self.require_expense_members(&expense).await?;

        with_tx!(self, |db_tx| {
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            for share in expense.share_models() {
                share.insert(&db_tx).await?;
            }
            Ok::<(), EngineError>(())
        })?;
        Ok(expense.id)
    }

    /// Replaces a shared expense in place; only its creator may do so.
    pub async fn update_expense(&self, cmd: ExpenseUpdateCmd) -> ResultEngine<()> {
        let stored = self.require_expense(cmd.room_id, cmd.expense_id).await?;
        if stored.created_by != cmd.user_id {
            return Err(EngineError::Forbidden(
                "only the creator can edit an expense".to_string(),
            ));
        }

        let shares = collect_shares(&cmd.shares)?;
        let mut replacement = SharedExpense::new(
            cmd.room_id,
            cmd.amount,
            cmd.payer_id,
            shares,
            normalize_optional_text(cmd.note.as_deref()),
            stored.created_by,
            stored.created_at,
        )?;
        replacement.id = stored.id;
        self.require_expense_members(&replacement).await?;

        with_tx!(self, |db_tx| {
            expenses::ActiveModel::from(&replacement)
                .update(&db_tx)
                .await?;
            expense_shares::Entity::delete_many()
                .filter(expense_shares::Column::ExpenseId.eq(replacement.id.to_string()))
                .exec(&db_tx)
                .await?;
            for share in replacement.share_models() {
                share.insert(&db_tx).await?;
            }
            Ok::<(), EngineError>(())
        })
    }

    /// Deletes a shared expense; only its creator may do so.
    pub async fn delete_expense(
        &self,
        room_id: Uuid,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        let stored = self.require_expense(room_id, expense_id).await?;
        if stored.created_by != user_id {
            return Err(EngineError::Forbidden(
                "only the creator can delete an expense".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            expense_shares::Entity::delete_many()
                .filter(expense_shares::Column::ExpenseId.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok::<(), EngineError>(())
        })
    }

    async fn require_expense(
        &self,
        room_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<SharedExpense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        if model.room_id != room_id.to_string() {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        let shares = expense_shares::Entity::find()
            .filter(expense_shares::Column::ExpenseId.eq(expense_id.to_string()))
            .all(&self.database)
            .await?;
        SharedExpense::try_from_models(model, shares)
    }

    /// Payer and every participant must be members of the expense's room.
    async fn require_expense_members(&self, expense: &SharedExpense) -> ResultEngine<()> {
        self.require_member(expense.room_id, &expense.payer_id)
            .await
            .map_err(|_| {
                EngineError::InvalidShare("the payer is not a member of this room".to_string())
            })?;
        for member_id in expense.shares.keys() {
            self.require_member(expense.room_id, member_id)
                .await
                .map_err(|_| {
                    EngineError::InvalidShare(format!(
                        "participant \"{member_id}\" is not a member of this room"
                    ))
                })?;
        }
        Ok(())
    }
}
