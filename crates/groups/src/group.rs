use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{
    DomainError, DomainResult, Entity, ExpenseId, GroupId, MemberId, PaymentId,
};

use crate::expense::Expense;
use crate::member::Member;
use crate::payment::Payment;

/// Aggregate root: a shared-expense group.
///
/// Holds id-keyed membership plus the expense and payment collections the
/// ledger folds over. Expenses and payments reference members by id only;
/// whether those ids belong to the group is the calling layer's concern, the
/// engine assumes referential integrity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    members: BTreeMap<MemberId, Member>,
    expenses: Vec<Expense>,
    payments: Vec<Payment>,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("group name must not be empty"));
        }
        Ok(Self {
            id,
            name,
            members: BTreeMap::new(),
            expenses: Vec::new(),
            payments: Vec::new(),
        })
    }

    pub fn id_typed(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.keys().copied()
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn is_member(&self, id: MemberId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id_typed() == id)
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn payment(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id_typed() == id)
    }

    /// Add a member to the group's membership set.
    pub fn add_member(&mut self, member: Member) -> DomainResult<()> {
        let id = member.id_typed();
        if self.members.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "member {id} already belongs to the group"
            )));
        }
        self.members.insert(id, member);
        Ok(())
    }

    /// Add an already-validated expense to the group.
    pub fn add_expense(&mut self, expense: Expense) -> DomainResult<()> {
        let id = expense.id_typed();
        if self.expense(id).is_some() {
            return Err(DomainError::conflict(format!(
                "expense {id} already exists in the group"
            )));
        }
        tracing::debug!(group = %self.id, expense = %id, amount = %expense.amount(), "expense added");
        self.expenses.push(expense);
        Ok(())
    }

    /// Remove an expense, returning it.
    pub fn remove_expense(&mut self, id: ExpenseId) -> DomainResult<Expense> {
        let index = self
            .expenses
            .iter()
            .position(|e| e.id_typed() == id)
            .ok_or_else(DomainError::not_found)?;
        Ok(self.expenses.remove(index))
    }

    /// Record a direct reimbursement between two members.
    pub fn record_payment(
        &mut self,
        id: PaymentId,
        from: MemberId,
        to: MemberId,
        amount: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let payment = Payment::new(id, from, to, amount, occurred_at)?;
        self.add_payment(payment)
    }

    /// Add an already-validated payment to the group.
    pub fn add_payment(&mut self, payment: Payment) -> DomainResult<()> {
        let id = payment.id_typed();
        if self.payment(id).is_some() {
            return Err(DomainError::conflict(format!(
                "payment {id} already exists in the group"
            )));
        }
        tracing::debug!(group = %self.id, payment = %id, amount = %payment.amount(), "payment recorded");
        self.payments.push(payment);
        Ok(())
    }

    /// Remove a payment, returning it.
    pub fn remove_payment(&mut self, id: PaymentId) -> DomainResult<Payment> {
        let index = self
            .payments
            .iter()
            .position(|p| p.id_typed() == id)
            .ok_or_else(DomainError::not_found)?;
        Ok(self.payments.remove(index))
    }

    /// Re-split an existing expense evenly.
    pub fn set_even_split(
        &mut self,
        expense_id: ExpenseId,
        amount: Decimal,
        member_ids: &[MemberId],
    ) -> DomainResult<()> {
        let expense = self.expense_mut(expense_id)?;
        expense.set_even_split(amount, member_ids)?;
        tracing::debug!(group = %self.id, expense = %expense_id, %amount, "even split assigned");
        Ok(())
    }

    /// Re-split an existing expense by percentages.
    pub fn set_percentual_split(
        &mut self,
        expense_id: ExpenseId,
        amount: Decimal,
        shares: BTreeMap<MemberId, u32>,
    ) -> DomainResult<()> {
        let expense = self.expense_mut(expense_id)?;
        expense.set_percentual_split(amount, shares)?;
        tracing::debug!(group = %self.id, expense = %expense_id, %amount, "percentual split assigned");
        Ok(())
    }

    /// Re-split an existing expense by exact amounts.
    pub fn set_exact_split(
        &mut self,
        expense_id: ExpenseId,
        amount: Decimal,
        shares: BTreeMap<MemberId, Decimal>,
    ) -> DomainResult<()> {
        let expense = self.expense_mut(expense_id)?;
        expense.set_exact_split(amount, shares)?;
        tracing::debug!(group = %self.id, expense = %expense_id, %amount, "exact split assigned");
        Ok(())
    }

    /// Sum of all expense amounts in the group.
    pub fn total_expense_amount(&self) -> Decimal {
        self.expenses.iter().map(Expense::amount).sum()
    }

    /// Sum of all payment amounts in the group.
    pub fn total_payment_amount(&self) -> Decimal {
        self.payments.iter().map(Payment::amount).sum()
    }

    /// The portion of group spending not yet settled by payments.
    pub fn total_amount_due(&self) -> Decimal {
        self.total_expense_amount() - self.total_payment_amount()
    }

    fn expense_mut(&mut self, id: ExpenseId) -> DomainResult<&mut Expense> {
        self.expenses
            .iter_mut()
            .find(|e| e.id_typed() == id)
            .ok_or_else(DomainError::not_found)
    }
}

impl Entity for Group {
    type Id = GroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
