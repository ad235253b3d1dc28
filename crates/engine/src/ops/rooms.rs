//! Rooms, membership and settlement queries.

use std::collections::BTreeMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    Debt, EngineError, Money, ResultEngine, Room, RoomMember, SharedExpense, expense_shares,
    expenses, room_members, rooms, settle, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a room with its creator as first member.
    pub async fn new_room(
        &self,
        name: &str,
        creator_id: &str,
        creator_display_name: &str,
    ) -> ResultEngine<Room> {
        let name = normalize_required_name(name, "room")?;
        let display_name = normalize_required_name(creator_display_name, "member")?;
        let room = Room::new(name);
        let member = RoomMember {
            room_id: room.id,
            user_id: creator_id.to_string(),
            display_name,
        };

        with_tx!(self, |db_tx| {
            rooms::ActiveModel::from(&room).insert(&db_tx).await?;
            room_members::ActiveModel::from(&member)
                .insert(&db_tx)
                .await?;
            Ok::<(), EngineError>(())
        })?;
        Ok(room)
    }

    /// Adds a member to a room; only existing members can add.
    pub async fn add_room_member(
        &self,
        room_id: Uuid,
        user_id: &str,
        display_name: &str,
        added_by: &str,
    ) -> ResultEngine<()> {
        let display_name = normalize_required_name(display_name, "member")?;
        self.require_room(room_id).await?;
        self.require_member(room_id, added_by).await?;

        let existing = room_members::Entity::find_by_id((room_id.to_string(), user_id.to_string()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(user_id.to_string()));
        }

        let member = RoomMember {
            room_id,
            user_id: user_id.to_string(),
            display_name,
        };
        room_members::ActiveModel::from(&member)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    /// The room with its members and full expense set, visible to members
    /// only.
    pub async fn room_snapshot(
        &self,
        room_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(Room, Vec<RoomMember>, Vec<SharedExpense>)> {
        let room = self.require_room(room_id).await?;
        self.require_member(room_id, user_id).await?;
        let members = self.load_members(room_id).await?;
        let expenses = self.load_expenses(room_id).await?;
        Ok((room, members, expenses))
    }

    /// Per-member net position over the room's expenses.
    pub async fn room_net_positions(
        &self,
        room_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<BTreeMap<String, Money>> {
        self.require_room(room_id).await?;
        self.require_member(room_id, user_id).await?;
        let members = self.load_members(room_id).await?;
        let expenses = self.load_expenses(room_id).await?;
        Ok(settle::net_positions(&members, &expenses))
    }

    /// Raw pairwise who-owes-whom amounts over the room's expenses.
    pub async fn room_pairwise_debts(
        &self,
        room_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Debt>> {
        self.require_room(room_id).await?;
        self.require_member(room_id, user_id).await?;
        let members = self.load_members(room_id).await?;
        let expenses = self.load_expenses(room_id).await?;
        Ok(settle::pairwise_debts(&members, &expenses))
    }

    pub(crate) async fn require_room(&self, room_id: Uuid) -> ResultEngine<Room> {
        let model = rooms::Entity::find_by_id(room_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("room not exists".to_string()))?;
        Room::try_from(model)
    }

    pub(crate) async fn require_member(&self, room_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let member = room_members::Entity::find_by_id((room_id.to_string(), user_id.to_string()))
            .one(&self.database)
            .await?;
        if member.is_none() {
            return Err(EngineError::Forbidden(
                "user is not a member of this room".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) async fn load_members(&self, room_id: Uuid) -> ResultEngine<Vec<RoomMember>> {
        let models = room_members::Entity::find()
            .filter(room_members::Column::RoomId.eq(room_id.to_string()))
            .order_by_asc(room_members::Column::UserId)
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(RoomMember::try_from(model)?);
        }
        Ok(out)
    }

    pub(crate) async fn load_expenses(&self, room_id: Uuid) -> ResultEngine<Vec<SharedExpense>> {
        let rows: Vec<(expenses::Model, Vec<expense_shares::Model>)> = expenses::Entity::find()
            .filter(expenses::Column::RoomId.eq(room_id.to_string()))
            .order_by_asc(expenses::Column::CreatedAt)
            .find_with_related(expense_shares::Entity)
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for (model, share_models) in rows {
            out.push(SharedExpense::try_from_models(model, share_models)?);
        }
        Ok(out)
    }
}
