//! Shared rooms.
//!
//! A room groups members who split expenses. Membership display names come
//! from an external identity store and are captured at join time; user ids
//! are opaque strings.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub join_code: String,
}

impl Room {
    pub fn new(name: String) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            name,
            join_code: join_code_for(id),
        }
    }
}

/// Derives the shareable join code from the room id.
///
/// The redemption flow lives outside the engine; the code is only stored.
fn join_code_for(id: Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub join_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::room_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Room> for ActiveModel {
    fn from(room: &Room) -> Self {
        Self {
            id: ActiveValue::Set(room.id.to_string()),
            name: ActiveValue::Set(room.name.clone()),
            join_code: ActiveValue::Set(room.join_code.clone()),
        }
    }
}

impl TryFrom<Model> for Room {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "room")?,
            name: model.name,
            join_code: model.join_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_code_is_eight_upper_hex_chars() {
        let room = Room::new("Piso 3B".to_string());
        assert_eq!(room.join_code.len(), 8);
        assert!(
            room.join_code
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }
}
