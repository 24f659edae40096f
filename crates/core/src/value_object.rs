//! Value object trait: equality by value, not identity.
//!
//! Selections, price quotes and axis-value entries have **no identity** of their own.
//! Two selection maps with the same pairs are the same selection.

/// Marker trait for value objects.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: No identity (an `AxisValueEntry` for `color=red` equals any other one)
/// - **Entity**: Has identity (a `VariantAxis` row is addressed by its `AxisId`)
///
/// Value objects are treated as immutable: to "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
