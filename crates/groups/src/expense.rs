use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, Entity, ExpenseId, MemberId};

/// Fractional digits shares are carried at when an even division does not
/// terminate. Matches the persisted column precision of the read side.
pub const SHARE_SCALE: u32 = 6;

/// Split policy tag, used by read models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    Evenly,
    Percentual,
    ExactAmount,
}

/// How an expense's amount is divided among its participants.
///
/// The variant carries exactly the share inputs its policy needs, so there is
/// no "field only valid under this policy" state to guard at runtime. The
/// participant set is never empty: every constructor validates before the
/// variant is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Split {
    /// Every participant covers `amount / n`.
    Evenly { members: BTreeSet<MemberId> },
    /// Each participant covers an integer percentage of the amount; the
    /// percentages sum to exactly 100.
    Percentual { shares: BTreeMap<MemberId, u32> },
    /// Each participant covers a fixed amount; the shares sum to exactly the
    /// expense amount.
    ExactAmount { shares: BTreeMap<MemberId, Decimal> },
}

impl Split {
    pub fn policy(&self) -> SplitPolicy {
        match self {
            Split::Evenly { .. } => SplitPolicy::Evenly,
            Split::Percentual { .. } => SplitPolicy::Percentual,
            Split::ExactAmount { .. } => SplitPolicy::ExactAmount,
        }
    }

    /// Ids of the participating members, in id order.
    pub fn participants(&self) -> impl Iterator<Item = MemberId> + '_ {
        let ids: Vec<MemberId> = match self {
            Split::Evenly { members } => members.iter().copied().collect(),
            Split::Percentual { shares } => shares.keys().copied().collect(),
            Split::ExactAmount { shares } => shares.keys().copied().collect(),
        };
        ids.into_iter()
    }

    pub fn is_participant(&self, member: MemberId) -> bool {
        match self {
            Split::Evenly { members } => members.contains(&member),
            Split::Percentual { shares } => shares.contains_key(&member),
            Split::ExactAmount { shares } => shares.contains_key(&member),
        }
    }
}

/// An expense paid by one member and split across a set of participants.
///
/// Amount, policy, and participants always change together through one of the
/// three "set split" operations; each validates fully before any field is
/// touched, so an expense that exists always satisfies
/// `sum(participant shares) == amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    description: String,
    amount: Decimal,
    paid_by: MemberId,
    occurred_at: DateTime<Utc>,
    split: Split,
}

impl Expense {
    /// Create an expense split evenly across `member_ids`.
    pub fn with_even_split(
        id: ExpenseId,
        description: impl Into<String>,
        paid_by: MemberId,
        occurred_at: DateTime<Utc>,
        amount: Decimal,
        member_ids: &[MemberId],
    ) -> DomainResult<Self> {
        let members = validate_even(amount, member_ids)?;
        Ok(Self {
            id,
            description: description.into(),
            amount,
            paid_by,
            occurred_at,
            split: Split::Evenly { members },
        })
    }

    /// Create an expense split by integer percentages summing to 100.
    pub fn with_percentual_split(
        id: ExpenseId,
        description: impl Into<String>,
        paid_by: MemberId,
        occurred_at: DateTime<Utc>,
        amount: Decimal,
        shares: BTreeMap<MemberId, u32>,
    ) -> DomainResult<Self> {
        validate_percentual(amount, &shares)?;
        Ok(Self {
            id,
            description: description.into(),
            amount,
            paid_by,
            occurred_at,
            split: Split::Percentual { shares },
        })
    }

    /// Create an expense split by exact per-participant amounts summing to
    /// the total.
    pub fn with_exact_split(
        id: ExpenseId,
        description: impl Into<String>,
        paid_by: MemberId,
        occurred_at: DateTime<Utc>,
        amount: Decimal,
        shares: BTreeMap<MemberId, Decimal>,
    ) -> DomainResult<Self> {
        validate_exact(amount, &shares)?;
        Ok(Self {
            id,
            description: description.into(),
            amount,
            paid_by,
            occurred_at,
            split: Split::ExactAmount { shares },
        })
    }

    /// Replace amount, policy, and participants with an even split.
    ///
    /// Validates before mutating; on error the expense keeps its prior state.
    pub fn set_even_split(&mut self, amount: Decimal, member_ids: &[MemberId]) -> DomainResult<()> {
        let members = validate_even(amount, member_ids)?;
        self.amount = amount;
        self.split = Split::Evenly { members };
        Ok(())
    }

    /// Replace amount, policy, and participants with a percentual split.
    pub fn set_percentual_split(
        &mut self,
        amount: Decimal,
        shares: BTreeMap<MemberId, u32>,
    ) -> DomainResult<()> {
        validate_percentual(amount, &shares)?;
        self.amount = amount;
        self.split = Split::Percentual { shares };
        Ok(())
    }

    /// Replace amount, policy, and participants with an exact-amount split.
    pub fn set_exact_split(
        &mut self,
        amount: Decimal,
        shares: BTreeMap<MemberId, Decimal>,
    ) -> DomainResult<()> {
        validate_exact(amount, &shares)?;
        self.amount = amount;
        self.split = Split::ExactAmount { shares };
        Ok(())
    }

    pub fn id_typed(&self) -> ExpenseId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid_by(&self) -> MemberId {
        self.paid_by
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn split(&self) -> &Split {
        &self.split
    }

    pub fn policy(&self) -> SplitPolicy {
        self.split.policy()
    }

    /// Resolve every participant's concrete share of the amount.
    ///
    /// Computed at read time from the stored split inputs. For every policy
    /// the returned shares sum to the expense amount exactly.
    pub fn participant_shares(&self) -> BTreeMap<MemberId, Decimal> {
        match &self.split {
            Split::Evenly { members } => allocate_even(self.amount, members),
            Split::Percentual { shares } => shares
                .iter()
                .map(|(member, percent)| {
                    (
                        *member,
                        self.amount * Decimal::from(*percent) / Decimal::ONE_HUNDRED,
                    )
                })
                .collect(),
            Split::ExactAmount { shares } => shares.clone(),
        }
    }

    /// The share allocated to `member`, or zero if they do not participate.
    pub fn share_of(&self, member: MemberId) -> Decimal {
        if !self.split.is_participant(member) {
            return Decimal::ZERO;
        }
        self.participant_shares()
            .get(&member)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Divide `amount` evenly across `members`.
///
/// The raw decimal quotient is rounded to fit the 96-bit mantissa, so
/// `quotient * count` can land back on `amount` even when the division does
/// not terminate — the multiplied-back product is never trusted as an
/// exactness test. Shares are always truncated to [`SHARE_SCALE`] digits
/// and the measured remainder `amount - base * count` is handed to the
/// participant with the smallest member id, keeping the share sum exactly
/// equal to the amount.
fn allocate_even(amount: Decimal, members: &BTreeSet<MemberId>) -> BTreeMap<MemberId, Decimal> {
    let count = Decimal::from(members.len() as u64);
    let base = (amount / count).trunc_with_scale(SHARE_SCALE);
    let remainder = amount - base * count;
    let mut shares: BTreeMap<MemberId, Decimal> =
        members.iter().map(|member| (*member, base)).collect();
    if !remainder.is_zero() {
        if let Some((_, first)) = shares.iter_mut().next() {
            *first += remainder;
        }
    }
    shares
}

fn validate_amount(amount: Decimal) -> DomainResult<()> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("expense amount must be positive"));
    }
    Ok(())
}

fn validate_even(amount: Decimal, member_ids: &[MemberId]) -> DomainResult<BTreeSet<MemberId>> {
    validate_amount(amount)?;
    if member_ids.is_empty() {
        return Err(DomainError::validation(
            "even split requires at least one participant",
        ));
    }
    let mut members = BTreeSet::new();
    for id in member_ids {
        if !members.insert(*id) {
            return Err(DomainError::validation(format!(
                "duplicate participant {id} in even split"
            )));
        }
    }
    Ok(members)
}

fn validate_percentual(amount: Decimal, shares: &BTreeMap<MemberId, u32>) -> DomainResult<()> {
    validate_amount(amount)?;
    if shares.is_empty() {
        return Err(DomainError::validation(
            "percentual split requires at least one participant",
        ));
    }
    let mut sum: u64 = 0;
    for (member, percent) in shares {
        if *percent == 0 {
            return Err(DomainError::validation(format!(
                "percentual share for {member} must be positive"
            )));
        }
        sum += u64::from(*percent);
    }
    if sum != 100 {
        return Err(DomainError::validation(format!(
            "percentual shares must sum to 100, got {sum}"
        )));
    }
    Ok(())
}

fn validate_exact(amount: Decimal, shares: &BTreeMap<MemberId, Decimal>) -> DomainResult<()> {
    validate_amount(amount)?;
    if shares.is_empty() {
        return Err(DomainError::validation(
            "exact split requires at least one participant",
        ));
    }
    for (member, share) in shares {
        if *share <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "exact share for {member} must be positive"
            )));
        }
    }
    let sum: Decimal = shares.values().copied().sum();
    if sum != amount {
        return Err(DomainError::validation(format!(
            "exact shares must sum to the expense amount {amount}, got {sum}"
        )));
    }
    Ok(())
}
