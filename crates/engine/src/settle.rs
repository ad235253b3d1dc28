//! Split-expense settlement.
//!
//! Two independent derivations over a room's expense set:
//!
//! - [`net_positions`]: per-member credit/debit position. The payer of an
//!   expense is credited the full amount; every participant is debited
//!   `amount / total_shares * weight`. A member who is both payer and
//!   participant receives both effects.
//! - [`pairwise_debts`]: raw "who owes whom" amounts accumulated per
//!   ordered `(debtor, payer)` pair across all expenses. Opposite
//!   directions are **not** netted against each other and the set is not
//!   reduced to fewer payments; both A→B and B→A can appear.
//!
//! Share arithmetic runs on an i128 fixed-point scale so recomputation is
//! bit-stable; rounding to whole minor units happens only at the boundary,
//! never inside the accumulation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Money, RoomMember, SharedExpense};

/// Sub-minor-unit precision used while accumulating shares.
const SCALE: i128 = 1_000_000;

/// Debts at or below one minor unit (0.01 currency units) are noise from
/// division and are not emitted.
const EPSILON_SCALED: i128 = SCALE;

/// One accumulated pairwise debt: `from` owes `to`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub from: String,
    pub to: String,
    pub amount: Money,
}

fn round_to_minor(scaled: i128) -> Money {
    let half = SCALE / 2;
    let rounded = if scaled >= 0 {
        (scaled + half) / SCALE
    } else {
        (scaled - half) / SCALE
    };
    Money::new(rounded as i64)
}

/// Scaled amount each weight unit of `expense` is worth.
fn scaled_share(expense: &SharedExpense, weight: u32) -> i128 {
    let total_shares = i128::from(expense.total_shares());
    if total_shares == 0 {
        return 0;
    }
    i128::from(expense.amount.minor()) * i128::from(weight) * SCALE / total_shares
}

/// Per-member net position over the room's expenses.
///
/// Every member appears in the result, including members with a zero
/// position. Positive means the member is owed money.
#[must_use]
pub fn net_positions(
    members: &[RoomMember],
    expenses: &[SharedExpense],
) -> BTreeMap<String, Money> {
    let mut scaled: BTreeMap<String, i128> = members
        .iter()
        .map(|m| (m.user_id.clone(), 0i128))
        .collect();

    for expense in expenses {
        let credit = i128::from(expense.amount.minor()) * SCALE;
        *scaled.entry(expense.payer_id.clone()).or_insert(0) += credit;
        for (member_id, &weight) in &expense.shares {
            *scaled.entry(member_id.clone()).or_insert(0) -= scaled_share(expense, weight);
        }
    }

    scaled
        .into_iter()
        .map(|(member_id, value)| (member_id, round_to_minor(value)))
        .collect()
}

/// Raw pairwise debts over the room's expenses.
///
/// For every expense and every participant other than the payer, the
/// participant's share accrues toward the `(participant, payer)` pair.
/// Pairs whose accumulated amount is within the epsilon are dropped; the
/// rest are returned ordered by debtor then creditor.
#[must_use]
pub fn pairwise_debts(_members: &[RoomMember], expenses: &[SharedExpense]) -> Vec<Debt> {
    let mut scaled: BTreeMap<(String, String), i128> = BTreeMap::new();

    for expense in expenses {
        for (member_id, &weight) in &expense.shares {
            if *member_id == expense.payer_id {
                continue;
            }
            let key = (member_id.clone(), expense.payer_id.clone());
            *scaled.entry(key).or_insert(0) += scaled_share(expense, weight);
        }
    }

    scaled
        .into_iter()
        .filter(|(_, value)| *value > EPSILON_SCALED)
        .map(|((from, to), value)| Debt {
            from,
            to,
            amount: round_to_minor(value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn member(room_id: Uuid, user_id: &str) -> RoomMember {
        RoomMember {
            room_id,
            user_id: user_id.to_string(),
            display_name: user_id.to_uppercase(),
        }
    }

    fn expense(room_id: Uuid, amount: i64, payer: &str, shares: &[(&str, u32)]) -> SharedExpense {
        SharedExpense::new(
            room_id,
            Money::new(amount),
            payer.to_string(),
            shares.iter().map(|(id, w)| (id.to_string(), *w)).collect(),
            None,
            payer.to_string(),
            Utc::now(),
        )
        .unwrap()
    }

    fn debt(from: &str, to: &str, amount: i64) -> Debt {
        Debt {
            from: from.to_string(),
            to: to.to_string(),
            amount: Money::new(amount),
        }
    }

    // Even three-way split paid by one member.
    #[test]
    fn even_split_yields_two_debts_toward_payer() {
        let room_id = Uuid::new_v4();
        let members = [
            member(room_id, "a"),
            member(room_id, "b"),
            member(room_id, "c"),
        ];
        let expenses = [expense(room_id, 90_000, "a", &[("a", 1), ("b", 1), ("c", 1)])];

        let debts = pairwise_debts(&members, &expenses);
        assert_eq!(debts, vec![debt("b", "a", 30_000), debt("c", "a", 30_000)]);

        let net = net_positions(&members, &expenses);
        assert_eq!(net["a"], Money::new(60_000));
        assert_eq!(net["b"], Money::new(-30_000));
        assert_eq!(net["c"], Money::new(-30_000));
    }

    // Opposite directions survive: debts are not netted or reduced.
    #[test]
    fn opposite_directions_are_not_netted() {
        let room_id = Uuid::new_v4();
        let members = [
            member(room_id, "a"),
            member(room_id, "b"),
            member(room_id, "c"),
        ];
        let expenses = [
            expense(room_id, 90_000, "a", &[("a", 1), ("b", 1), ("c", 1)]),
            expense(room_id, 30_000, "b", &[("a", 1), ("b", 1)]),
        ];

        let debts = pairwise_debts(&members, &expenses);
        assert_eq!(
            debts,
            vec![
                debt("a", "b", 15_000),
                debt("b", "a", 30_000),
                debt("c", "a", 30_000),
            ]
        );
    }

    // Weighted shares: weight 2 pays twice the per-share amount.
    #[test]
    fn weighted_shares_scale_the_debt() {
        let room_id = Uuid::new_v4();
        let members = [member(room_id, "a"), member(room_id, "b")];
        let expenses = [expense(room_id, 30_000, "a", &[("a", 1), ("b", 2)])];

        let debts = pairwise_debts(&members, &expenses);
        assert_eq!(debts, vec![debt("b", "a", 20_000)]);
    }

    // Split conservation: participant shares sum back to the amount.
    #[test]
    fn shares_sum_to_amount_within_epsilon() {
        let room_id = Uuid::new_v4();
        let members = [
            member(room_id, "a"),
            member(room_id, "b"),
            member(room_id, "c"),
        ];
        // 100.00 split three ways does not divide evenly.
        let expenses = [expense(room_id, 10_000, "a", &[("a", 1), ("b", 1), ("c", 1)])];

        let net = net_positions(&members, &expenses);
        let sum: i64 = net.values().map(|m| m.minor()).sum();
        assert!(sum.abs() <= 1, "net positions leak {sum} minor units");
    }

    // Net positions cover every member, including bystanders.
    #[test]
    fn bystanders_have_zero_position() {
        let room_id = Uuid::new_v4();
        let members = [
            member(room_id, "a"),
            member(room_id, "b"),
            member(room_id, "d"),
        ];
        let expenses = [expense(room_id, 10_000, "a", &[("a", 1), ("b", 1)])];

        let net = net_positions(&members, &expenses);
        assert_eq!(net["d"], Money::ZERO);
    }

    // Payer-only expense: payer fronted money for themselves, no debts.
    #[test]
    fn self_paid_expense_creates_no_debt() {
        let room_id = Uuid::new_v4();
        let members = [member(room_id, "a"), member(room_id, "b")];
        let expenses = [expense(room_id, 10_000, "a", &[("a", 1)])];

        assert!(pairwise_debts(&members, &expenses).is_empty());
        let net = net_positions(&members, &expenses);
        assert_eq!(net["a"], Money::ZERO);
    }

    // Sub-epsilon residue is dropped instead of flickering.
    #[test]
    fn sub_epsilon_debts_are_dropped() {
        let room_id = Uuid::new_v4();
        let members = [member(room_id, "a"), member(room_id, "b"), member(room_id, "c")];
        // 0.01 split three ways leaves each non-payer owing a third of a
        // minor unit.
        let expenses = [expense(room_id, 1, "a", &[("a", 1), ("b", 1), ("c", 1)])];

        assert!(pairwise_debts(&members, &expenses).is_empty());
    }

    // Idempotence: the derivation has no hidden state.
    #[test]
    fn recomputation_is_identical() {
        let room_id = Uuid::new_v4();
        let members = [
            member(room_id, "a"),
            member(room_id, "b"),
            member(room_id, "c"),
        ];
        let expenses = [
            expense(room_id, 90_000, "a", &[("a", 1), ("b", 1), ("c", 1)]),
            expense(room_id, 10_000, "b", &[("a", 2), ("c", 3)]),
            expense(room_id, 333, "c", &[("a", 1), ("b", 1), ("c", 1)]),
        ];

        assert_eq!(
            pairwise_debts(&members, &expenses),
            pairwise_debts(&members, &expenses)
        );
        assert_eq!(
            net_positions(&members, &expenses),
            net_positions(&members, &expenses)
        );
    }
}
