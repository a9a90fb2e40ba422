use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{MemberId, ValueObject};
use splitledger_groups::Group;

/// Ledger figures between one ordered pair of members.
///
/// Restricted to the expenses and payments touching exactly this pair; no
/// multi-hop netting is performed, so a triangular debt across three members
/// is never collapsed. `balance` is antisymmetric:
/// `pair_figures(g, a, b).balance == -pair_figures(g, b, a).balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFigures {
    pub member: MemberId,
    pub other: MemberId,
    /// Shares of `other` on expenses `member` paid for.
    pub fronted_for_other: Decimal,
    /// Shares of `member` on expenses `other` paid for.
    pub fronted_by_other: Decimal,
    /// Payments `member` sent to `other`.
    pub sent_to_other: Decimal,
    /// Payments `member` received from `other`.
    pub received_from_other: Decimal,
    /// Net amount `other` owes `member` (negative: `member` owes `other`).
    pub balance: Decimal,
}

impl ValueObject for PairFigures {}

/// Fold the group's expenses and payments into the figures between `member`
/// and `other`.
///
/// Callers normally pass two distinct members; for equal ids every figure is
/// zero, since a member fronts nothing for themself.
pub fn pair_figures(group: &Group, member: MemberId, other: MemberId) -> PairFigures {
    if member == other {
        return PairFigures {
            member,
            other,
            fronted_for_other: Decimal::ZERO,
            fronted_by_other: Decimal::ZERO,
            sent_to_other: Decimal::ZERO,
            received_from_other: Decimal::ZERO,
            balance: Decimal::ZERO,
        };
    }

    let mut fronted_for_other = Decimal::ZERO;
    let mut fronted_by_other = Decimal::ZERO;

    for expense in group.expenses() {
        if expense.paid_by() == member {
            fronted_for_other += expense.share_of(other);
        } else if expense.paid_by() == other {
            fronted_by_other += expense.share_of(member);
        }
    }

    let mut sent_to_other = Decimal::ZERO;
    let mut received_from_other = Decimal::ZERO;
    for payment in group.payments() {
        if payment.from() == member && payment.to() == other {
            sent_to_other += payment.amount();
        } else if payment.from() == other && payment.to() == member {
            received_from_other += payment.amount();
        }
    }

    let balance =
        (fronted_for_other - received_from_other) - (fronted_by_other - sent_to_other);

    PairFigures {
        member,
        other,
        fronted_for_other,
        fronted_by_other,
        sent_to_other,
        received_from_other,
        balance,
    }
}

/// `member`'s relation to every other member of the group, in id order.
///
/// All-zero relations are included so settlement views see a stable row set.
pub fn relations_for(group: &Group, member: MemberId) -> Vec<PairFigures> {
    group
        .member_ids()
        .filter(|other| *other != member)
        .map(|other| pair_figures(group, member, other))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use splitledger_core::{ExpenseId, GroupId, PaymentId};
    use splitledger_groups::{Expense, Member};

    fn group_with_members(count: usize) -> (Group, Vec<MemberId>) {
        let mut ids: Vec<MemberId> = (0..count).map(|_| MemberId::new()).collect();
        ids.sort();
        let mut group = Group::new(GroupId::new(), "roadtrip").unwrap();
        for (i, id) in ids.iter().enumerate() {
            group
                .add_member(Member::new(*id, format!("member-{i}")).unwrap())
                .unwrap();
        }
        (group, ids)
    }

    fn add_even(group: &mut Group, amount: Decimal, paid_by: MemberId, members: &[MemberId]) {
        let expense = Expense::with_even_split(
            ExpenseId::new(),
            "expense",
            paid_by,
            Utc::now(),
            amount,
            members,
        )
        .unwrap();
        group.add_expense(expense).unwrap();
    }

    #[test]
    fn fronting_shows_up_in_the_pair() {
        let (mut group, ids) = group_with_members(3);
        add_even(&mut group, dec!(1500), ids[0], &ids);

        let ab = pair_figures(&group, ids[0], ids[1]);
        assert_eq!(ab.fronted_for_other, dec!(500));
        assert_eq!(ab.fronted_by_other, dec!(0));
        assert_eq!(ab.balance, dec!(500));

        let bc = pair_figures(&group, ids[1], ids[2]);
        assert_eq!(bc.balance, dec!(0));
    }

    #[test]
    fn payments_between_the_pair_settle_the_relation() {
        let (mut group, ids) = group_with_members(2);
        add_even(&mut group, dec!(100), ids[0], &ids);
        group
            .record_payment(PaymentId::new(), ids[1], ids[0], dec!(50), Utc::now())
            .unwrap();

        let ab = pair_figures(&group, ids[0], ids[1]);
        assert_eq!(ab.received_from_other, dec!(50));
        assert_eq!(ab.balance, dec!(0));
    }

    #[test]
    fn self_pair_is_all_zero() {
        let (mut group, ids) = group_with_members(2);
        add_even(&mut group, dec!(100), ids[0], &ids);

        let aa = pair_figures(&group, ids[0], ids[0]);
        assert_eq!(aa.fronted_for_other, dec!(0));
        assert_eq!(aa.fronted_by_other, dec!(0));
        assert_eq!(aa.balance, dec!(0));
    }

    #[test]
    fn triangular_debt_is_not_collapsed() {
        // A fronts for B, B fronts for C. The A-C relation stays empty even
        // though netting across the triangle could cancel it.
        let (mut group, ids) = group_with_members(3);
        add_even(&mut group, dec!(100), ids[0], &ids[..2]);
        add_even(&mut group, dec!(100), ids[1], &ids[1..]);

        let ac = pair_figures(&group, ids[0], ids[2]);
        assert_eq!(ac.fronted_for_other, dec!(0));
        assert_eq!(ac.fronted_by_other, dec!(0));
        assert_eq!(ac.balance, dec!(0));
    }

    #[test]
    fn relations_for_covers_every_other_member() {
        let (mut group, ids) = group_with_members(4);
        add_even(&mut group, dec!(400), ids[0], &ids);

        let relations = relations_for(&group, ids[0]);
        assert_eq!(relations.len(), 3);
        for relation in &relations {
            assert_eq!(relation.member, ids[0]);
            assert_eq!(relation.balance, dec!(100));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: the pairwise balance is antisymmetric for every ordered
        /// pair, whatever mix of expenses and payments the group holds.
        #[test]
        fn pairwise_balance_is_antisymmetric(
            expenses in prop::collection::vec(
                (1i64..1_000_000i64, 0usize..4usize, 1u8..16u8),
                0..10,
            ),
            payments in prop::collection::vec(
                (1i64..100_000i64, 0usize..4usize, 0usize..3usize),
                0..6,
            ),
        ) {
            let (mut group, ids) = group_with_members(4);

            for (cents, payer, mask) in expenses {
                let participants: Vec<MemberId> = ids
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, id)| *id)
                    .collect();
                add_even(&mut group, Decimal::new(cents, 2), ids[payer], &participants);
            }

            for (cents, from, to_offset) in payments {
                let to = (from + 1 + to_offset) % 4;
                group
                    .record_payment(
                        PaymentId::new(),
                        ids[from],
                        ids[to],
                        Decimal::new(cents, 2),
                        Utc::now(),
                    )
                    .unwrap();
            }

            for a in &ids {
                for b in &ids {
                    let ab = pair_figures(&group, *a, *b);
                    let ba = pair_figures(&group, *b, *a);
                    prop_assert_eq!(ab.balance, -ba.balance);
                }
            }
        }
    }
}
