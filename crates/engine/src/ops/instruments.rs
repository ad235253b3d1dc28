//! Instrument CRUD and credit payments.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    Category, EngineError, Instrument, InstrumentKind, InstrumentPending, Money,
    PayInstrumentCmd, PaymentMethod, Record, RecordKind, ResultEngine, instruments, records,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, load_snapshot, with_tx};

impl Engine {
    /// Registers a payment instrument.
    pub async fn new_instrument(
        &self,
        owner_id: &str,
        issuer: &str,
        kind: InstrumentKind,
        last4: &str,
        display_name: &str,
        credit_limit: Option<Money>,
    ) -> ResultEngine<Uuid> {
        let display_name = normalize_required_name(display_name, "instrument")?;
        let existing = instruments::Entity::find()
            .filter(instruments::Column::OwnerId.eq(owner_id))
            .filter(instruments::Column::DisplayName.eq(display_name.as_str()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(display_name));
        }

        let instrument = Instrument::new(
            owner_id.to_string(),
            issuer.trim().to_string(),
            kind,
            last4.to_string(),
            display_name,
            credit_limit,
        )?;
        instruments::ActiveModel::from(&instrument)
            .insert(&self.database)
            .await?;
        Ok(instrument.id)
    }

    /// Lists the owner's instruments, sorted by display name.
    pub async fn list_instruments(&self, owner_id: &str) -> ResultEngine<Vec<Instrument>> {
        let models = instruments::Entity::find()
            .filter(instruments::Column::OwnerId.eq(owner_id))
            .all(&self.database)
            .await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            out.push(Instrument::try_from(model)?);
        }
        out.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(out)
    }

    /// Renames an instrument and/or replaces its issuer.
    ///
    /// Kind, last4 and credit limit are fixed at creation; records already
    /// derive against the instrument's kind.
    pub async fn update_instrument(
        &self,
        owner_id: &str,
        instrument_id: Uuid,
        display_name: Option<&str>,
        issuer: Option<&str>,
    ) -> ResultEngine<()> {
        let stored = self.require_instrument(owner_id, instrument_id).await?;

        let display_name = match display_name {
            Some(value) => {
                let normalized = normalize_required_name(value, "instrument")?;
                if normalized != stored.display_name {
                    let clash = instruments::Entity::find()
                        .filter(instruments::Column::OwnerId.eq(owner_id))
                        .filter(instruments::Column::DisplayName.eq(normalized.as_str()))
                        .one(&self.database)
                        .await?;
                    if clash.is_some() {
                        return Err(EngineError::ExistingKey(normalized));
                    }
                }
                normalized
            }
            None => stored.display_name,
        };
        let issuer = match issuer {
            Some(value) => normalize_required_name(value, "issuer")?,
            None => stored.issuer,
        };

        let model = instruments::ActiveModel {
            id: sea_orm::ActiveValue::Set(instrument_id.to_string()),
            display_name: sea_orm::ActiveValue::Set(display_name),
            issuer: sea_orm::ActiveValue::Set(issuer),
            ..Default::default()
        };
        model.update(&self.database).await?;
        Ok(())
    }

    /// Deletes an instrument.
    ///
    /// Records tagged against it are left untouched: their references
    /// become unresolvable and the classification policy fails open, so
    /// the spending keeps counting against cash.
    pub async fn delete_instrument(&self, owner_id: &str, instrument_id: Uuid) -> ResultEngine<()> {
        self.require_instrument(owner_id, instrument_id).await?;
        instruments::Entity::delete_by_id(instrument_id.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Pays down a credit instrument.
    ///
    /// Writes one expense record with the instrument-payment category,
    /// tagged against the instrument and untargeted (the cash leaves the
    /// general bucket). The same record reduces the pending amount and
    /// counts against cash.
    pub async fn pay_instrument(&self, cmd: PayInstrumentCmd) -> ResultEngine<Uuid> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        let note = normalize_optional_text(cmd.note.as_deref());

        with_tx!(self, |db_tx| {
            let snapshot = load_snapshot(&db_tx, &cmd.owner_id).await?;
            let pending = snapshot.pending_of(cmd.instrument_id)?;
            if cmd.amount > pending.pending.clamp_display() {
                return Err(EngineError::InvalidAmount(
                    "payment exceeds the instrument's pending amount".to_string(),
                ));
            }

            let record = Record::new(
                cmd.owner_id.clone(),
                RecordKind::Expense,
                cmd.amount,
                Category::InstrumentPayment,
                Some(PaymentMethod::Credit(cmd.instrument_id)),
                None,
                note.clone(),
                cmd.created_at,
            )?;
            records::ActiveModel::from(&record).insert(&db_tx).await?;
            Ok::<Uuid, EngineError>(record.id)
        })
    }

    /// Derived pending amount of one credit instrument.
    pub async fn pending_of(
        &self,
        owner_id: &str,
        instrument_id: Uuid,
    ) -> ResultEngine<InstrumentPending> {
        let snapshot = self.snapshot(owner_id).await?;
        snapshot.pending_of(instrument_id)
    }

    pub(crate) async fn require_instrument(
        &self,
        owner_id: &str,
        instrument_id: Uuid,
    ) -> ResultEngine<Instrument> {
        let model = instruments::Entity::find_by_id(instrument_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("instrument not exists".to_string()))?;
        if model.owner_id != owner_id {
            return Err(EngineError::KeyNotFound("instrument not exists".to_string()));
        }
        Instrument::try_from(model)
    }
}
