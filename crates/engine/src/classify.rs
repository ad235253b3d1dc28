//! Cash classification policy.
//!
//! Decides whether a record currently reduces available cash. The rule set
//! models deferred credit liability: an ordinary credit purchase does not
//! touch cash until a matching instrument-payment record exists, while cash
//! and debit spending is immediate.

use uuid::Uuid;

use crate::{PaymentMethod, Record, RecordKind};

/// Returns `true` if `record` counts against available cash.
///
/// `instrument_exists` answers whether an instrument id currently resolves;
/// a reference to a deleted instrument fails open (counts), so a deletion
/// can never silently hide spending.
///
/// Rules, in order:
/// 1. income always counts;
/// 2. no instrument, or cash, counts;
/// 3. debit counts (immediate cash-equivalent);
/// 4. credit counts only for instrument-payment records;
/// 5. an unresolvable instrument reference counts.
pub fn counts_against_cash<F>(record: &Record, instrument_exists: F) -> bool
where
    F: Fn(Uuid) -> bool,
{
    if record.kind == RecordKind::Income {
        return true;
    }
    match record.payment {
        None | Some(PaymentMethod::Cash) | Some(PaymentMethod::Debit(_)) => true,
        Some(PaymentMethod::Credit(id)) => {
            if !instrument_exists(id) {
                return true;
            }
            record.category.is_instrument_payment()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{Category, Money};

    fn record(kind: RecordKind, category: &str, payment: Option<PaymentMethod>) -> Record {
        Record::new(
            "alice".to_string(),
            kind,
            Money::new(1000),
            Category::parse(category),
            payment,
            None,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn income_always_counts() {
        let id = Uuid::new_v4();
        let income = record(
            RecordKind::Income,
            "Salario",
            Some(PaymentMethod::Credit(id)),
        );
        assert!(counts_against_cash(&income, |_| true));
    }

    #[test]
    fn cash_and_missing_instrument_count() {
        let cash = record(RecordKind::Expense, "Mercado", Some(PaymentMethod::Cash));
        let bare = record(RecordKind::Expense, "Mercado", None);
        assert!(counts_against_cash(&cash, |_| true));
        assert!(counts_against_cash(&bare, |_| true));
    }

    #[test]
    fn debit_counts_immediately() {
        let debit = record(
            RecordKind::Expense,
            "Mercado",
            Some(PaymentMethod::Debit(Uuid::new_v4())),
        );
        assert!(counts_against_cash(&debit, |_| true));
    }

    #[test]
    fn credit_purchase_is_deferred() {
        let purchase = record(
            RecordKind::Expense,
            "Mercado",
            Some(PaymentMethod::Credit(Uuid::new_v4())),
        );
        assert!(!counts_against_cash(&purchase, |_| true));
    }

    #[test]
    fn credit_instrument_payment_counts() {
        let payment = record(
            RecordKind::Expense,
            crate::categories::INSTRUMENT_PAYMENT_LABEL,
            Some(PaymentMethod::Credit(Uuid::new_v4())),
        );
        assert!(counts_against_cash(&payment, |_| true));
    }

    #[test]
    fn unresolvable_credit_reference_fails_open() {
        let purchase = record(
            RecordKind::Expense,
            "Mercado",
            Some(PaymentMethod::Credit(Uuid::new_v4())),
        );
        assert!(counts_against_cash(&purchase, |_| false));
    }
}
