use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{ExpenseId, GroupId, MemberId, PaymentId};
use splitledger_groups::{Group, Split, SplitPolicy};
use splitledger_ledger::{member_figures, relations_for, MemberFigures, PairFigures};

/// Group-level monetary totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub total_expense_amount: Decimal,
    pub total_payment_amount: Decimal,
    /// `total_expense_amount - total_payment_amount`: the portion of group
    /// spending not yet settled by payments.
    pub total_amount_due: Decimal,
}

/// A member enriched with their ledger figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub id: MemberId,
    pub name: String,
    #[serde(flatten)]
    pub figures: MemberFigures,
    /// Pairwise relations to every other member, present only when the
    /// projection was asked for them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<PairFigures>>,
}

/// One participant of an expense with their resolved share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub member_id: MemberId,
    /// The concrete amount allocated to this participant.
    pub amount: Decimal,
    /// Raw percent input, present under the percentual policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u32>,
    /// Raw exact-share input, present under the exact-amount policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_share: Option<Decimal>,
}

/// An expense with its per-participant amounts resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseView {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Decimal,
    pub paid_by: MemberId,
    pub occurred_at: DateTime<Utc>,
    pub policy: SplitPolicy,
    pub participants: Vec<ParticipantView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// The externally consumed read model of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub id: GroupId,
    pub name: String,
    pub totals: GroupTotals,
    pub members: Vec<MemberView>,
    pub expenses: Vec<ExpenseView>,
    pub payments: Vec<PaymentView>,
}

impl GroupView {
    /// Project the group into its read model.
    pub fn project(group: &Group) -> Self {
        Self::build(group, false)
    }

    /// Project the group including each member's pairwise relations.
    pub fn project_with_relations(group: &Group) -> Self {
        Self::build(group, true)
    }

    fn build(group: &Group, with_relations: bool) -> Self {
        tracing::debug!(group = %group.id_typed(), with_relations, "projecting group view");

        let members = group
            .members()
            .map(|member| {
                let id = member.id_typed();
                MemberView {
                    id,
                    name: member.name().to_string(),
                    figures: member_figures(group, id),
                    relations: with_relations.then(|| relations_for(group, id)),
                }
            })
            .collect();

        let expenses = group.expenses().iter().map(expense_view).collect();

        let payments = group
            .payments()
            .iter()
            .map(|payment| PaymentView {
                id: payment.id_typed(),
                from: payment.from(),
                to: payment.to(),
                amount: payment.amount(),
                occurred_at: payment.occurred_at(),
            })
            .collect();

        Self {
            id: group.id_typed(),
            name: group.name().to_string(),
            totals: GroupTotals {
                total_expense_amount: group.total_expense_amount(),
                total_payment_amount: group.total_payment_amount(),
                total_amount_due: group.total_amount_due(),
            },
            members,
            expenses,
            payments,
        }
    }
}

fn expense_view(expense: &splitledger_groups::Expense) -> ExpenseView {
    let shares = expense.participant_shares();
    let participants = shares
        .iter()
        .map(|(member_id, amount)| {
            let (percent, exact_share) = match expense.split() {
                Split::Evenly { .. } => (None, None),
                Split::Percentual { shares } => (shares.get(member_id).copied(), None),
                Split::ExactAmount { shares } => (None, shares.get(member_id).copied()),
            };
            ParticipantView {
                member_id: *member_id,
                amount: *amount,
                percent,
                exact_share,
            }
        })
        .collect();

    ExpenseView {
        id: expense.id_typed(),
        description: expense.description().to_string(),
        amount: expense.amount(),
        paid_by: expense.paid_by(),
        occurred_at: expense.occurred_at(),
        policy: expense.policy(),
        participants,
    }
}
