//! Read-only projection of a group aggregate.
//!
//! Composes the domain model and the ledger builders into the read model
//! handed to external callers. Everything is computed from the snapshot on
//! every call; there is no cached or stale state.

pub mod group_view;

pub use group_view::{
    ExpenseView, GroupTotals, GroupView, MemberView, ParticipantView, PaymentView,
};
