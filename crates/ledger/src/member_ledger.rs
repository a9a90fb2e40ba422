use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{MemberId, ValueObject};
use splitledger_groups::Group;

/// Per-member ledger figures, derived from a group snapshot.
///
/// Sign convention for `balance`: positive means the group net-owes the
/// member, negative means the member net-owes the group. Across a whole
/// group the balances sum to zero, since every payment debits one member's
/// owed-by figure and credits another's owed-to figure symmetrically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFigures {
    /// Sum of the member's shares across all expenses they participate in.
    pub attributed_expense_amount: Decimal,
    /// Sum of the amounts of expenses the member paid for.
    pub paid_expense_amount: Decimal,
    /// Portion of the member's paid expenses allocated to other participants.
    pub fronted_for_others: Decimal,
    /// Sum of payments the member received.
    pub received_payments: Decimal,
    /// Sum of payments the member sent.
    pub sent_payments: Decimal,
    /// What the group still owes the member: fronted minus received back.
    pub amount_owed_to_member: Decimal,
    /// What the member still owes the group: shares fronted by others minus
    /// payments the member sent.
    pub amount_owed_by_member: Decimal,
    /// `amount_owed_to_member - amount_owed_by_member`.
    pub balance: Decimal,
}

impl ValueObject for MemberFigures {}

/// Fold the group's expenses and payments into `member`'s ledger figures.
///
/// Safe to call repeatedly and in any order; nothing is mutated or cached.
/// Members who paid an expense without participating in it front the entire
/// amount. Members absent from an expense's participant set are attributed
/// nothing for it.
pub fn member_figures(group: &Group, member: MemberId) -> MemberFigures {
    let mut attributed = Decimal::ZERO;
    let mut paid = Decimal::ZERO;
    // Share the member covers on expenses they personally paid for.
    let mut self_covered = Decimal::ZERO;

    for expense in group.expenses() {
        let share = expense.share_of(member);
        attributed += share;
        if expense.paid_by() == member {
            paid += expense.amount();
            self_covered += share;
        }
    }

    let mut received = Decimal::ZERO;
    let mut sent = Decimal::ZERO;
    for payment in group.payments() {
        if payment.to() == member {
            received += payment.amount();
        }
        if payment.from() == member {
            sent += payment.amount();
        }
    }

    let fronted_for_others = paid - self_covered;
    let amount_owed_to_member = fronted_for_others - received;
    // Shares of the member's spending that somebody else fronted.
    let amount_owed_by_member = (attributed - self_covered) - sent;

    MemberFigures {
        attributed_expense_amount: attributed,
        paid_expense_amount: paid,
        fronted_for_others,
        received_payments: received,
        sent_payments: sent,
        amount_owed_to_member,
        amount_owed_by_member,
        balance: amount_owed_to_member - amount_owed_by_member,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use splitledger_core::{ExpenseId, GroupId, PaymentId};
    use splitledger_groups::{Expense, Member};
    use std::collections::BTreeMap;

    fn group_with_members(count: usize) -> (Group, Vec<MemberId>) {
        let mut ids: Vec<MemberId> = (0..count).map(|_| MemberId::new()).collect();
        ids.sort();
        let mut group = Group::new(GroupId::new(), "holiday").unwrap();
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

    fn balances(group: &Group, ids: &[MemberId]) -> Vec<Decimal> {
        ids.iter().map(|id| member_figures(group, *id).balance).collect()
    }

    #[test]
    fn even_split_paid_by_one_member() {
        // Spec scenario: 1500 split evenly across A, B, C, paid by A.
        let (mut group, ids) = group_with_members(3);
        add_even(&mut group, dec!(1500), ids[0], &ids);

        for id in &ids {
            assert_eq!(
                member_figures(&group, *id).attributed_expense_amount,
                dec!(500)
            );
        }

        let a = member_figures(&group, ids[0]);
        assert_eq!(a.paid_expense_amount, dec!(1500));
        assert_eq!(a.fronted_for_others, dec!(1000));
        assert_eq!(a.balance, dec!(1000));

        assert_eq!(member_figures(&group, ids[1]).balance, dec!(-500));
        assert_eq!(member_figures(&group, ids[2]).balance, dec!(-500));
    }

    #[test]
    fn percentual_split_half_and_half() {
        let (mut group, ids) = group_with_members(2);
        let shares = BTreeMap::from([(ids[0], 50u32), (ids[1], 50u32)]);
        let expense = Expense::with_percentual_split(
            ExpenseId::new(),
            "rent",
            ids[0],
            Utc::now(),
            dec!(1000),
            shares,
        )
        .unwrap();
        group.add_expense(expense).unwrap();

        assert_eq!(member_figures(&group, ids[0]).balance, dec!(500));
        assert_eq!(member_figures(&group, ids[1]).balance, dec!(-500));
    }

    #[test]
    fn exact_split_uneven_shares() {
        let (mut group, ids) = group_with_members(2);
        let shares = BTreeMap::from([(ids[0], dec!(100)), (ids[1], dec!(900))]);
        let expense = Expense::with_exact_split(
            ExpenseId::new(),
            "concert",
            ids[0],
            Utc::now(),
            dec!(1000),
            shares,
        )
        .unwrap();
        group.add_expense(expense).unwrap();

        assert_eq!(member_figures(&group, ids[0]).balance, dec!(900));
        assert_eq!(member_figures(&group, ids[1]).balance, dec!(-900));
    }

    #[test]
    fn payment_settles_balances_exactly() {
        // 100 split evenly between A and B, paid by A, then B pays A 50.
        let (mut group, ids) = group_with_members(2);
        add_even(&mut group, dec!(100), ids[0], &ids);
        group
            .record_payment(PaymentId::new(), ids[1], ids[0], dec!(50), Utc::now())
            .unwrap();

        assert_eq!(member_figures(&group, ids[0]).balance, dec!(0));
        assert_eq!(member_figures(&group, ids[1]).balance, dec!(0));
    }

    #[test]
    fn overpayment_flips_the_balance() {
        let (mut group, ids) = group_with_members(2);
        add_even(&mut group, dec!(100), ids[0], &ids);
        group
            .record_payment(PaymentId::new(), ids[1], ids[0], dec!(75), Utc::now())
            .unwrap();

        assert_eq!(member_figures(&group, ids[0]).balance, dec!(-25));
        assert_eq!(member_figures(&group, ids[1]).balance, dec!(25));
    }

    #[test]
    fn payer_outside_participant_set_fronts_everything() {
        let (mut group, ids) = group_with_members(3);
        // ids[2] pays but only ids[0] and ids[1] participate.
        add_even(&mut group, dec!(100), ids[2], &ids[..2]);

        let payer = member_figures(&group, ids[2]);
        assert_eq!(payer.attributed_expense_amount, dec!(0));
        assert_eq!(payer.fronted_for_others, dec!(100));
        assert_eq!(payer.balance, dec!(100));

        assert_eq!(member_figures(&group, ids[0]).balance, dec!(-50));
        assert_eq!(member_figures(&group, ids[1]).balance, dec!(-50));
    }

    #[test]
    fn balances_sum_to_zero_across_mixed_policies() {
        let (mut group, ids) = group_with_members(3);
        add_even(&mut group, dec!(100), ids[0], &ids);
        let percents = BTreeMap::from([(ids[0], 20u32), (ids[1], 80u32)]);
        group
            .add_expense(
                Expense::with_percentual_split(
                    ExpenseId::new(),
                    "rent",
                    ids[1],
                    Utc::now(),
                    dec!(340),
                    percents,
                )
                .unwrap(),
            )
            .unwrap();
        let exact = BTreeMap::from([(ids[1], dec!(12.34)), (ids[2], dec!(87.66))]);
        group
            .add_expense(
                Expense::with_exact_split(
                    ExpenseId::new(),
                    "tickets",
                    ids[2],
                    Utc::now(),
                    dec!(100),
                    exact,
                )
                .unwrap(),
            )
            .unwrap();
        group
            .record_payment(PaymentId::new(), ids[2], ids[0], dec!(17.50), Utc::now())
            .unwrap();

        let sum: Decimal = balances(&group, &ids).into_iter().sum();
        assert_eq!(sum, dec!(0));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no money is created or destroyed — for any combination
        /// of even-split expenses and payments, member balances sum to zero.
        #[test]
        fn balances_always_sum_to_zero(
            expenses in prop::collection::vec(
                (1i64..1_000_000i64, 0usize..4usize, 1u8..16u8),
                0..12,
            ),
            payments in prop::collection::vec(
                (1i64..100_000i64, 0usize..4usize, 0usize..3usize),
                0..8,
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
                // Pick a receiver different from the sender.
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

            let sum: Decimal = balances(&group, &ids).into_iter().sum();
            prop_assert_eq!(sum, Decimal::ZERO);
        }
    }
}
