//! Room membership rows.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A user's membership in a room, with the display name resolved from the
/// external identity store at join time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    pub room_id: Uuid,
    pub user_id: String,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "room_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub room_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub display_name: String,
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
}

impl Related<super::rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&RoomMember> for ActiveModel {
    fn from(member: &RoomMember) -> Self {
        Self {
            room_id: ActiveValue::Set(member.room_id.to_string()),
            user_id: ActiveValue::Set(member.user_id.clone()),
            display_name: ActiveValue::Set(member.display_name.clone()),
        }
    }
}

impl TryFrom<Model> for RoomMember {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            room_id: parse_uuid(&model.room_id, "room")?,
            user_id: model.user_id,
            display_name: model.display_name,
        })
    }
}
