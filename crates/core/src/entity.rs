//! Entity and value-object marker traits.

/// Entity marker + minimal interface: identity + continuity across state changes.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value, not identity:
/// `Money { 100 }` equals `Money { 100 }` regardless of where either came
/// from, while two `Account`s with the same balance are still distinct
/// entities. To "modify" a value object, construct a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
