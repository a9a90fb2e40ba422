//! Balance aggregation over a group snapshot.
//!
//! Pure functions only: every figure is recomputed from the group's expense
//! and payment collections on each call, O(expenses + payments), with no
//! cached state to invalidate.

pub mod member_ledger;
pub mod pairwise;

pub use member_ledger::{member_figures, MemberFigures};
pub use pairwise::{pair_figures, relations_for, PairFigures};
