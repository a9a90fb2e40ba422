//! Shared-expense groups domain module.
//!
//! This crate contains the group aggregate (members, expenses, payments) and
//! the split allocator, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod expense;
pub mod group;
pub mod member;
pub mod payment;

pub use expense::{Expense, Split, SplitPolicy, SHARE_SCALE};
pub use group::Group;
pub use member::Member;
pub use payment::Payment;
