//! Pocket CRUD.

use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    EngineError, Money, Pocket, PocketKind, ResultEngine, pockets,
    util::{normalize_optional_text, normalize_required_name},
};

use super::Engine;

impl Engine {
    /// Creates a pocket; names are unique per owner.
    pub async fn new_pocket(
        &self,
        owner_id: &str,
        name: &str,
        kind: PocketKind,
        goal: Option<Money>,
        target_period: Option<&str>,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "pocket")?;
        let existing = pockets::Entity::find()
            .filter(pockets::Column::OwnerId.eq(owner_id))
            .filter(pockets::Column::Name.eq(name.as_str()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(name));
        }

        let pocket = Pocket::new(
            owner_id.to_string(),
            name,
            kind,
            goal,
            normalize_optional_text(target_period),
        )?;
        pockets::ActiveModel::from(&pocket)
            .insert(&self.database)
            .await?;
        Ok(pocket.id)
    }

    /// Renames a pocket and/or replaces its goal.
    ///
    /// The kind is fixed at creation: records already derive against it and
    /// changing it would silently rewrite history.
    pub async fn update_pocket(
        &self,
        owner_id: &str,
        pocket_id: Uuid,
        name: Option<&str>,
        goal: Option<Money>,
    ) -> ResultEngine<()> {
        let stored = self.require_pocket(owner_id, pocket_id).await?;

        let name = match name {
            Some(value) => {
                let normalized = normalize_required_name(value, "pocket")?;
                if normalized != stored.name {
                    let clash = pockets::Entity::find()
                        .filter(pockets::Column::OwnerId.eq(owner_id))
                        .filter(pockets::Column::Name.eq(normalized.as_str()))
                        .one(&self.database)
                        .await?;
                    if clash.is_some() {
                        return Err(EngineError::ExistingKey(normalized));
                    }
                }
                normalized
            }
            None => stored.name,
        };
        let goal_minor = match goal {
            Some(goal) => {
                if !goal.is_positive() {
                    return Err(EngineError::InvalidAmount(
                        "pocket goal must be positive".to_string(),
                    ));
                }
                Some(goal.minor())
            }
            None => stored.goal.map(Money::minor),
        };

        let model = pockets::ActiveModel {
            id: ActiveValue::Set(pocket_id.to_string()),
            name: ActiveValue::Set(name),
            goal_minor: ActiveValue::Set(goal_minor),
            ..Default::default()
        };
        model.update(&self.database).await?;
        Ok(())
    }

    /// Deletes a pocket.
    ///
    /// Records targeting it are left untouched; their references become
    /// unresolvable and count toward the unassigned bucket on display.
    pub async fn delete_pocket(&self, owner_id: &str, pocket_id: Uuid) -> ResultEngine<()> {
        self.require_pocket(owner_id, pocket_id).await?;
        pockets::Entity::delete_by_id(pocket_id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Lists the owner's pockets, sorted by name.
    pub async fn list_pockets(&self, owner_id: &str) -> ResultEngine<Vec<Pocket>> {
        let models = pockets::Entity::find()
            .filter(pockets::Column::OwnerId.eq(owner_id))
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Pocket::try_from(model)?);
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    pub(crate) async fn require_pocket(
        &self,
        owner_id: &str,
        pocket_id: Uuid,
    ) -> ResultEngine<Pocket> {
        let model = pockets::Entity::find_by_id(pocket_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("pocket not exists".to_string()))?;
        if model.owner_id != owner_id {
            return Err(EngineError::KeyNotFound("pocket not exists".to_string()));
        }
        Pocket::try_from(model)
    }
}
