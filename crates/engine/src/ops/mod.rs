use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::{Instrument, Pocket, Record, ResultEngine, Snapshot};

mod expenses;
mod instruments;
mod pockets;
mod records;
mod recurring;
mod rooms;
mod stats;
mod transfers;

pub use records::RecordListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The engine: every read is a full re-fold over the owner's records, every
/// write is an atomic batch against the store.
#[derive(Debug)]
pub struct Engine {
    pub(crate) database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Loads the owner's full data set as an immutable [`Snapshot`].
    pub async fn snapshot(&self, owner_id: &str) -> ResultEngine<Snapshot> {
        load_snapshot(&self.database, owner_id).await
    }
}

/// Loads one owner's records, pockets and instruments from `conn`.
///
/// Also callable on an open transaction so write preconditions fold over
/// the same view the write commits against.
pub(crate) async fn load_snapshot<C: ConnectionTrait>(
    conn: &C,
    owner_id: &str,
) -> ResultEngine<Snapshot> {
    let record_models = crate::records::Entity::find()
        .filter(crate::records::Column::OwnerId.eq(owner_id))
        .all(conn)
        .await?;
    let mut owned_records = Vec::with_capacity(record_models.len());
    for model in record_models {
        owned_records.push(Record::try_from(model)?);
    }

    let pocket_models = crate::pockets::Entity::find()
        .filter(crate::pockets::Column::OwnerId.eq(owner_id))
        .all(conn)
        .await?;
    let mut owned_pockets = Vec::with_capacity(pocket_models.len());
    for model in pocket_models {
        owned_pockets.push(Pocket::try_from(model)?);
    }

    let instrument_models = crate::instruments::Entity::find()
        .filter(crate::instruments::Column::OwnerId.eq(owner_id))
        .all(conn)
        .await?;
    let mut owned_instruments = Vec::with_capacity(instrument_models.len());
    for model in instrument_models {
        owned_instruments.push(Instrument::try_from(model)?);
    }

    Ok(Snapshot::new(
        owner_id.to_string(),
        owned_records,
        owned_pockets,
        owned_instruments,
    ))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
