//! Record write and list operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    EngineError, Record, RecordKind, RecordNewCmd, RecordUpdateCmd, ResultEngine, records,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// Filter for [`Engine::list_records`].
#[derive(Clone, Copy, Debug)]
pub struct RecordListFilter {
    /// Only records targeting this pocket.
    pub pocket_id: Option<Uuid>,
    pub kind: Option<RecordKind>,
    /// Transfer halves are part of the record set; hide them for
    /// category-centric views.
    pub include_transfers: bool,
    pub limit: Option<u64>,
}

impl Default for RecordListFilter {
    fn default() -> Self {
        Self {
            pocket_id: None,
            kind: None,
            include_transfers: true,
            limit: None,
        }
    }
}

impl Engine {
    /// Creates a money-movement record.
    ///
    /// The reserved categories are refused here: transfer and
    /// instrument-payment records exist only through their operators, so
    /// the derivations they feed cannot be forged by a plain insert.
    pub async fn add_record(&self, cmd: RecordNewCmd) -> ResultEngine<Uuid> {
        if cmd.category.is_reserved() {
            return Err(EngineError::InvalidRecord(format!(
                "category \"{}\" is reserved",
                cmd.category
            )));
        }
        let record = Record::new(
            cmd.owner_id,
            cmd.kind,
            cmd.amount,
            cmd.category,
            cmd.payment,
            cmd.pocket_id,
            normalize_optional_text(cmd.note.as_deref()),
            cmd.created_at,
        )?;

        records::ActiveModel::from(&record)
            .insert(&self.database)
            .await?;
        Ok(record.id)
    }

    /// Replaces a record in place.
    ///
    /// Transfer halves cannot be edited: the linked pair must stay
    /// symmetric, so callers delete the transfer and issue a new one.
    pub async fn update_record(&self, cmd: RecordUpdateCmd) -> ResultEngine<()> {
        if cmd.category.is_reserved() {
            return Err(EngineError::InvalidRecord(format!(
                "category \"{}\" is reserved",
                cmd.category
            )));
        }
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }

        let stored = self.require_record(&cmd.owner_id, cmd.record_id).await?;
        if stored.is_transfer_half() {
            return Err(EngineError::InvalidRecord(
                "transfer records cannot be edited; delete the transfer and issue a new one"
                    .to_string(),
            ));
        }

        let replacement = Record {
            id: stored.id,
            owner_id: stored.owner_id,
            kind: cmd.kind,
            amount: cmd.amount,
            category: cmd.category,
            payment: cmd.payment,
            pocket_id: cmd.pocket_id,
            linked_transfer_id: None,
            note: normalize_optional_text(cmd.note.as_deref()),
            created_at: cmd.created_at.unwrap_or(stored.created_at),
        };
        records::ActiveModel::from(&replacement)
            .update(&self.database)
            .await?;
        Ok(())
    }

    /// Deletes a record.
    ///
    /// Deleting one half of a transfer deletes both halves atomically; a
    /// half whose peer is missing is a broken pair and is reported as
    /// [`EngineError::PartialTransfer`] instead of silently removed.
    pub async fn delete_record(&self, owner_id: &str, record_id: Uuid) -> ResultEngine<()> {
        let stored = self.require_record(owner_id, record_id).await?;

        let Some(peer_id) = stored.linked_transfer_id else {
            records::Entity::delete_by_id(record_id.to_string())
                .exec(&self.database)
                .await?;
            return Ok(());
        };

        let peer = records::Entity::find_by_id(peer_id.to_string())
            .one(&self.database)
            .await?;
        if peer.is_none() {
            return Err(EngineError::PartialTransfer(format!(
                "transfer peer {peer_id} is missing; reconcile the record set manually"
            )));
        }

        with_tx!(self, |db_tx| {
            records::Entity::delete_by_id(record_id.to_string())
                .exec(&db_tx)
                .await?;
            records::Entity::delete_by_id(peer_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok::<(), EngineError>(())
        })
    }

    /// Lists the owner's records, newest first.
    pub async fn list_records(
        &self,
        owner_id: &str,
        filter: RecordListFilter,
    ) -> ResultEngine<Vec<Record>> {
        let mut query = records::Entity::find()
            .filter(records::Column::OwnerId.eq(owner_id))
            .order_by_desc(records::Column::CreatedAt);

        if let Some(pocket_id) = filter.pocket_id {
            query = query.filter(records::Column::PocketId.eq(pocket_id.to_string()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(records::Column::Kind.eq(kind.as_str()));
        }
        if !filter.include_transfers {
            query = query.filter(records::Column::LinkedTransferId.is_null());
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let models = query.all(&self.database).await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Record::try_from(model)?);
        }
        Ok(out)
    }

    /// Loads a record and checks ownership, hiding other users' records
    /// behind a not-found error.
    pub(crate) async fn require_record(
        &self,
        owner_id: &str,
        record_id: Uuid,
    ) -> ResultEngine<Record> {
        let model = records::Entity::find_by_id(record_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("record not exists".to_string()))?;
        if model.owner_id != owner_id {
            return Err(EngineError::KeyNotFound("record not exists".to_string()));
        }
        Record::try_from(model)
    }
}
