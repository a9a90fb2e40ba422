//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two value
/// objects with the same attribute values are equal. The derived ledger
/// figures are the canonical example here: a balance has no identity, only
/// a value, and is recomputed from the group snapshot on every read.
///
/// The trait requires `Clone + PartialEq + Debug` so values can be copied,
/// compared in assertions, and logged.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
