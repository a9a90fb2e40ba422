use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, Entity, MemberId, PaymentId};

/// A direct reimbursement from one member to another.
///
/// Payments are not tied to any expense; they settle balances that expenses
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    from: MemberId,
    to: MemberId,
    amount: Decimal,
    occurred_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        id: PaymentId,
        from: MemberId,
        to: MemberId,
        amount: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if from == to {
            return Err(DomainError::validation(
                "payment sender and receiver must differ",
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        Ok(Self {
            id,
            from,
            to,
            amount,
            occurred_at,
        })
    }

    pub fn id_typed(&self) -> PaymentId {
        self.id
    }

    /// The sending member.
    pub fn from(&self) -> MemberId {
        self.from
    }

    /// The receiving member.
    pub fn to(&self) -> MemberId {
        self.to
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
