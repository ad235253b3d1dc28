//! Derived balances over an owner's record set.
//!
//! A [`Snapshot`] is an immutable view of one owner's records, pockets and
//! instruments, loaded in full from the store. Every figure is recomputed
//! from scratch on each call: the folds are order-independent, so the
//! result depends only on the record multiset and can never drift from the
//! stored records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Instrument, Money, Pocket, PocketKind, Record, RecordKind, ResultEngine, classify,
};

/// Headline figures over all records, regardless of pocket assignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
    pub balance: Money,
}

/// Derived pending amount of a credit instrument.
///
/// `pending` is the raw signed derivation; it goes negative when recorded
/// payments exceed recorded purchases, in which case `overpaid` is set and
/// [`InstrumentPending::display`] clamps at zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentPending {
    pub instrument_id: Uuid,
    pub pending: Money,
    pub overpaid: bool,
}

impl InstrumentPending {
    /// The amount safe to show: never negative.
    #[must_use]
    pub fn display(&self) -> Money {
        self.pending.clamp_display()
    }
}

/// An immutable snapshot of one owner's data, indexed for derivation.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub owner_id: String,
    pub records: Vec<Record>,
    pub pockets: HashMap<Uuid, Pocket>,
    pub instruments: HashMap<Uuid, Instrument>,
}

impl Snapshot {
    #[must_use]
    pub fn new(
        owner_id: String,
        records: Vec<Record>,
        pockets: Vec<Pocket>,
        instruments: Vec<Instrument>,
    ) -> Self {
        Self {
            owner_id,
            records,
            pockets: pockets.into_iter().map(|p| (p.id, p)).collect(),
            instruments: instruments.into_iter().map(|i| (i.id, i)).collect(),
        }
    }

    /// Applies the classification policy against this snapshot's
    /// instruments.
    #[must_use]
    pub fn counts_against_cash(&self, record: &Record) -> bool {
        classify::counts_against_cash(record, |id| self.instruments.contains_key(&id))
    }

    /// Headline income/expense/balance over every record.
    #[must_use]
    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for record in &self.records {
            match record.kind {
                RecordKind::Income => totals.income += record.amount,
                RecordKind::Expense => {
                    if self.counts_against_cash(record) {
                        totals.expense += record.amount;
                    }
                }
            }
        }
        totals.balance = totals.income - totals.expense;
        totals
    }

    /// Derived amount of a stored pocket.
    ///
    /// `future` pockets accumulate planned spend: the sum of expense
    /// records targeting them, unfiltered by instrument. Every other kind
    /// is income minus cash-affecting expense.
    #[must_use]
    pub fn pocket_balance(&self, pocket: &Pocket) -> Money {
        let targeting = self
            .records
            .iter()
            .filter(|r| r.pocket_id == Some(pocket.id));

        if pocket.kind == PocketKind::Future {
            return targeting
                .filter(|r| r.kind == RecordKind::Expense)
                .fold(Money::ZERO, |acc, r| acc + r.amount);
        }

        targeting.fold(Money::ZERO, |acc, r| match r.kind {
            RecordKind::Income => acc + r.amount,
            RecordKind::Expense => {
                if self.counts_against_cash(r) {
                    acc - r.amount
                } else {
                    acc
                }
            }
        })
    }

    /// The implicit general bucket: records with no pocket reference, plus
    /// records whose pocket reference no longer resolves.
    #[must_use]
    pub fn unassigned_balance(&self) -> Money {
        self.records
            .iter()
            .filter(|r| match r.pocket_id {
                None => true,
                Some(id) => !self.pockets.contains_key(&id),
            })
            .fold(Money::ZERO, |acc, r| match r.kind {
                RecordKind::Income => acc + r.amount,
                RecordKind::Expense => {
                    if self.counts_against_cash(r) {
                        acc - r.amount
                    } else {
                        acc
                    }
                }
            })
    }

    /// Balance of a pocket by id; `None` addresses the implicit general
    /// bucket.
    pub fn balance_of(&self, pocket_id: Option<Uuid>) -> ResultEngine<Money> {
        match pocket_id {
            None => Ok(self.unassigned_balance()),
            Some(id) => {
                let pocket = self
                    .pockets
                    .get(&id)
                    .ok_or_else(|| EngineError::KeyNotFound("pocket not exists".to_string()))?;
                Ok(self.pocket_balance(pocket))
            }
        }
    }

    /// Per-pocket breakdown plus the unassigned bucket, for display.
    #[must_use]
    pub fn pocket_balances(&self) -> (Vec<(Uuid, Money)>, Money) {
        let mut balances: Vec<(Uuid, Money)> = self
            .pockets
            .values()
            .map(|pocket| (pocket.id, self.pocket_balance(pocket)))
            .collect();
        balances.sort_by_key(|(id, _)| *id);
        (balances, self.unassigned_balance())
    }

    /// Pending (unpaid) amount of a credit instrument.
    ///
    /// Defined only for credit instruments; purchases accrue, records with
    /// the instrument-payment category reduce.
    pub fn pending_of(&self, instrument_id: Uuid) -> ResultEngine<InstrumentPending> {
        let instrument = self
            .instruments
            .get(&instrument_id)
            .ok_or_else(|| EngineError::KeyNotFound("instrument not exists".to_string()))?;
        if !instrument.is_credit() {
            return Err(EngineError::InvalidInstrument(
                "pending amount is only defined for credit instruments".to_string(),
            ));
        }

        let mut pending = Money::ZERO;
        for record in &self.records {
            if record.kind != RecordKind::Expense {
                continue;
            }
            let Some(payment) = record.payment else {
                continue;
            };
            if !payment.is_credit() || payment.instrument_id() != Some(instrument_id) {
                continue;
            }
            if record.category.is_instrument_payment() {
                pending -= record.amount;
            } else {
                pending += record.amount;
            }
        }

        Ok(InstrumentPending {
            instrument_id,
            pending,
            overpaid: pending.is_negative(),
        })
    }

    /// Pending amounts for every credit instrument in the snapshot.
    #[must_use]
    pub fn credit_pendings(&self) -> Vec<InstrumentPending> {
        let mut pendings: Vec<InstrumentPending> = self
            .instruments
            .values()
            .filter(|i| i.is_credit())
            .filter_map(|i| self.pending_of(i.id).ok())
            .collect();
        pendings.sort_by_key(|p| p.instrument_id);
        pendings
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use std::collections::HashMap;

    use super::*;
    use crate::{Category, InstrumentKind, PaymentMethod};

    struct Builder {
        records: Vec<Record>,
        pockets: Vec<Pocket>,
        instruments: Vec<Instrument>,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                records: Vec::new(),
                pockets: Vec::new(),
                instruments: Vec::new(),
            }
        }

        fn pocket(&mut self, name: &str, kind: PocketKind) -> Uuid {
            let pocket =
                Pocket::new("alice".to_string(), name.to_string(), kind, None, None).unwrap();
            let id = pocket.id;
            self.pockets.push(pocket);
            id
        }

        fn credit_card(&mut self, name: &str) -> Uuid {
            let instrument = Instrument::new(
                "alice".to_string(),
                "Banco".to_string(),
                InstrumentKind::Credit,
                "4242".to_string(),
                name.to_string(),
                None,
            )
            .unwrap();
            let id = instrument.id;
            self.instruments.push(instrument);
            id
        }

        fn record(
            &mut self,
            kind: RecordKind,
            amount: i64,
            category: &str,
            payment: Option<PaymentMethod>,
            pocket_id: Option<Uuid>,
        ) {
            self.records.push(
                Record::new(
                    "alice".to_string(),
                    kind,
                    Money::new(amount),
                    Category::parse(category),
                    payment,
                    pocket_id,
                    None,
                    Utc::now(),
                )
                .unwrap(),
            );
        }

        fn snapshot(self) -> Snapshot {
            Snapshot::new("alice".to_string(), self.records, self.pockets, self.instruments)
        }
    }

    // Scenario: income then cash expense on the general bucket.
    #[test]
    fn general_bucket_income_minus_cash_expense() {
        let mut b = Builder::new();
        b.record(RecordKind::Income, 100_000, "Salario", Some(PaymentMethod::Cash), None);
        b.record(RecordKind::Expense, 30_000, "Mercado", Some(PaymentMethod::Cash), None);
        let snapshot = b.snapshot();

        assert_eq!(snapshot.unassigned_balance(), Money::new(70_000));
        assert_eq!(
            snapshot.totals(),
            Totals {
                income: Money::new(100_000),
                expense: Money::new(30_000),
                balance: Money::new(70_000),
            }
        );
    }

    // Pocket conservation: income minus classified expense, by construction.
    #[test]
    fn pocket_balance_is_income_minus_classified_expense() {
        let mut b = Builder::new();
        let savings = b.pocket("Ahorros", PocketKind::Savings);
        let card = b.credit_card("Visa");
        b.record(RecordKind::Income, 50_000, "Salario", None, Some(savings));
        b.record(RecordKind::Expense, 10_000, "Mercado", Some(PaymentMethod::Cash), Some(savings));
        // Deferred credit purchase: must not move the pocket.
        b.record(
            RecordKind::Expense,
            99_000,
            "Tecnologia",
            Some(PaymentMethod::Credit(card)),
            Some(savings),
        );
        let snapshot = b.snapshot();

        assert_eq!(snapshot.balance_of(Some(savings)).unwrap(), Money::new(40_000));
    }

    // Deferred purchase neutrality: pockets untouched, pending grows.
    #[test]
    fn credit_purchase_defers_and_accrues_pending() {
        let mut b = Builder::new();
        let card = b.credit_card("Visa");
        b.record(RecordKind::Income, 100_000, "Salario", Some(PaymentMethod::Cash), None);
        b.record(
            RecordKind::Expense,
            50_000,
            "Mercado",
            Some(PaymentMethod::Credit(card)),
            None,
        );
        let snapshot = b.snapshot();

        assert_eq!(snapshot.unassigned_balance(), Money::new(100_000));
        let pending = snapshot.pending_of(card).unwrap();
        assert_eq!(pending.pending, Money::new(50_000));
        assert!(!pending.overpaid);
    }

    // Instrument payment reduces pending and cash by the paid amount.
    #[test]
    fn instrument_payment_reduces_pending_and_cash() {
        let mut b = Builder::new();
        let card = b.credit_card("Visa");
        b.record(RecordKind::Income, 100_000, "Salario", Some(PaymentMethod::Cash), None);
        b.record(
            RecordKind::Expense,
            50_000,
            "Mercado",
            Some(PaymentMethod::Credit(card)),
            None,
        );
        b.record(
            RecordKind::Expense,
            20_000,
            crate::categories::INSTRUMENT_PAYMENT_LABEL,
            Some(PaymentMethod::Credit(card)),
            None,
        );
        let snapshot = b.snapshot();

        assert_eq!(snapshot.pending_of(card).unwrap().pending, Money::new(30_000));
        assert_eq!(snapshot.unassigned_balance(), Money::new(80_000));
    }

    #[test]
    fn overpayment_is_flagged_and_display_clamps() {
        let mut b = Builder::new();
        let card = b.credit_card("Visa");
        b.record(
            RecordKind::Expense,
            10_000,
            "Mercado",
            Some(PaymentMethod::Credit(card)),
            None,
        );
        b.record(
            RecordKind::Expense,
            15_000,
            crate::categories::INSTRUMENT_PAYMENT_LABEL,
            Some(PaymentMethod::Credit(card)),
            None,
        );
        let snapshot = b.snapshot();

        let pending = snapshot.pending_of(card).unwrap();
        assert_eq!(pending.pending, Money::new(-5_000));
        assert!(pending.overpaid);
        assert_eq!(pending.display(), Money::ZERO);
    }

    #[test]
    fn pending_is_rejected_for_debit_instruments() {
        let mut b = Builder::new();
        let instrument = Instrument::new(
            "alice".to_string(),
            "Banco".to_string(),
            InstrumentKind::Debit,
            "1111".to_string(),
            "Debito".to_string(),
            None,
        )
        .unwrap();
        let id = instrument.id;
        b.instruments.push(instrument);
        let snapshot = b.snapshot();

        assert_eq!(
            snapshot.pending_of(id).unwrap_err(),
            EngineError::InvalidInstrument(
                "pending amount is only defined for credit instruments".to_string()
            )
        );
    }

    // Future pockets accumulate planned spend from expenses only.
    #[test]
    fn future_pocket_sums_expenses_unfiltered() {
        let mut b = Builder::new();
        let trip = b.pocket("Viaje", PocketKind::Future);
        let card = b.credit_card("Visa");
        b.record(
            RecordKind::Expense,
            40_000,
            "Vuelos",
            Some(PaymentMethod::Credit(card)),
            Some(trip),
        );
        b.record(RecordKind::Expense, 10_000, "Hotel", Some(PaymentMethod::Cash), Some(trip));
        b.record(RecordKind::Income, 99_000, "Salario", None, Some(trip));
        let snapshot = b.snapshot();

        assert_eq!(snapshot.balance_of(Some(trip)).unwrap(), Money::new(50_000));
    }

    // Orphaned pocket references degrade into the unassigned bucket.
    #[test]
    fn orphaned_pocket_reference_counts_as_unassigned() {
        let mut b = Builder::new();
        b.record(RecordKind::Income, 5_000, "Salario", None, Some(Uuid::new_v4()));
        let snapshot = b.snapshot();

        assert_eq!(snapshot.unassigned_balance(), Money::new(5_000));
        assert!(snapshot.balance_of(Some(Uuid::new_v4())).is_err());
    }

    // Order independence: folds over a permuted record set agree.
    #[test]
    fn folds_are_order_independent() {
        let mut b = Builder::new();
        let savings = b.pocket("Ahorros", PocketKind::Savings);
        let card = b.credit_card("Visa");
        b.record(RecordKind::Income, 70_000, "Salario", None, Some(savings));
        b.record(RecordKind::Expense, 12_000, "Mercado", Some(PaymentMethod::Cash), Some(savings));
        b.record(
            RecordKind::Expense,
            8_000,
            "Mercado",
            Some(PaymentMethod::Credit(card)),
            Some(savings),
        );
        b.record(RecordKind::Income, 1_000, "Regalo", None, None);
        let snapshot = b.snapshot();

        let mut reversed = snapshot.clone();
        reversed.records.reverse();

        assert_eq!(snapshot.totals(), reversed.totals());
        assert_eq!(
            snapshot.balance_of(Some(savings)).unwrap(),
            reversed.balance_of(Some(savings)).unwrap()
        );
        assert_eq!(
            snapshot.pending_of(card).unwrap(),
            reversed.pending_of(card).unwrap()
        );
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let snapshot = Snapshot {
            owner_id: "alice".to_string(),
            records: Vec::new(),
            pockets: HashMap::new(),
            instruments: HashMap::new(),
        };
        assert_eq!(snapshot.totals(), Totals::default());
        assert_eq!(snapshot.unassigned_balance(), Money::ZERO);
        assert!(snapshot.pocket_balances().0.is_empty());
    }
}
