//! Pocket-to-pocket transfers.

use uuid::Uuid;

use sea_orm::ActiveModelTrait;

use crate::{
    Category, EngineError, PocketKind, Record, RecordKind, ResultEngine, TransferCmd, records,
    util::normalize_optional_text,
};

use super::{Engine, load_snapshot, with_tx};

impl Engine {
    /// Moves value between two pockets.
    ///
    /// Produces exactly two linked records (an expense in the source
    /// pocket, an income in the destination pocket) written as one atomic
    /// batch: both rows commit or neither does. `None` endpoints address
    /// the implicit general bucket.
    ///
    /// Preconditions checked inside the same transaction the write commits
    /// against:
    /// - endpoints differ, and neither is a `future` pocket (an income
    ///   record into a future pocket would be invisible to its planned-
    ///   spend rule and the transferred value would vanish);
    /// - amount is positive;
    /// - the source balance covers the amount.
    ///
    /// Returns `(expense_record_id, income_record_id)`.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<(Uuid, Uuid)> {
        if cmd.from_pocket_id == cmd.to_pocket_id {
            return Err(EngineError::InvalidPocket(
                "source and destination pockets must differ".to_string(),
            ));
        }
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        let note = normalize_optional_text(cmd.note.as_deref());

        with_tx!(self, |db_tx| {
            let snapshot = load_snapshot(&db_tx, &cmd.owner_id).await?;

            for endpoint in [cmd.from_pocket_id, cmd.to_pocket_id].into_iter().flatten() {
                let pocket = snapshot
                    .pockets
                    .get(&endpoint)
                    .ok_or_else(|| EngineError::KeyNotFound("pocket not exists".to_string()))?;
                if pocket.kind == PocketKind::Future {
                    return Err(EngineError::InvalidPocket(
                        "future pockets cannot take part in transfers".to_string(),
                    ));
                }
            }

            let available = snapshot.balance_of(cmd.from_pocket_id)?;
            if available < cmd.amount {
                return Err(EngineError::InsufficientFunds(
                    "insufficient funds in source pocket".to_string(),
                ));
            }

            let mut outgoing = Record::new(
                cmd.owner_id.clone(),
                RecordKind::Expense,
                cmd.amount,
                Category::Transfer,
                None,
                cmd.from_pocket_id,
                note.clone(),
                cmd.created_at,
            )?;
            let mut incoming = Record::new(
                cmd.owner_id.clone(),
                RecordKind::Income,
                cmd.amount,
                Category::Transfer,
                None,
                cmd.to_pocket_id,
                note.clone(),
                cmd.created_at,
            )?;
            outgoing.linked_transfer_id = Some(incoming.id);
            incoming.linked_transfer_id = Some(outgoing.id);

            records::ActiveModel::from(&outgoing).insert(&db_tx).await?;
            records::ActiveModel::from(&incoming).insert(&db_tx).await?;

            Ok::<(Uuid, Uuid), EngineError>((outgoing.id, incoming.id))
        })
    }
}
