//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Pickup points, receptions and products are entities: two values with the
/// same id denote the same row even if other fields were read at different
/// times.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Returns `true` when both values denote the same entity.
    fn same_entity(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}
