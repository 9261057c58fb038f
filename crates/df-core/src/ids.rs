use core::fmt;
use core::num::NonZeroU32;
use core::sync::atomic::{AtomicU32, Ordering};

/// Scope 0 is reserved for ids built by hand with [`Id::from_index`].
static NEXT_SCOPE: AtomicU32 = AtomicU32::new(1);

/// Allocate a scope no other live graph uses.
pub fn next_scope() -> u32 {
    loop {
        let scope = NEXT_SCOPE.fetch_add(1, Ordering::Relaxed);
        if scope != 0 {
            return scope;
        }
    }
}

/// Compact, stable identifier handed out by the graph builder.
///
/// - `scope` names the graph the id belongs to, so ids from another graph
///   never resolve locally
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id {
    scope: u32,
    index: NonZeroU32,
}

impl Id {
    /// Create an Id in `scope` from a 0-based index by storing index+1.
    ///
    /// Returns `None` when the index is `u32::MAX` (no room for the +1).
    pub fn try_scoped(scope: u32, index: u32) -> Option<Self> {
        let index = index.checked_add(1).and_then(NonZeroU32::new)?;
        Some(Self { scope, index })
    }

    /// Unscoped variant of [`Id::try_scoped`].
    pub fn try_from_index(index: u32) -> Option<Self> {
        Self::try_scoped(0, index)
    }

    /// Create an unscoped Id from a 0-based index.
    ///
    /// # Panics
    /// Panics if `index == u32::MAX`.
    pub fn from_index(index: u32) -> Self {
        Self::try_from_index(index).expect("index+1 is nonzero")
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.index.get() - 1
    }

    /// Index as `usize`, for slice access.
    pub fn slot(self) -> usize {
        self.index() as usize
    }

    /// The graph this id was issued by (0 when built by hand).
    pub fn scope(self) -> u32 {
        self.scope
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope == 0 {
            write!(f, "Id({})", self.index())
        } else {
            write!(f, "Id({}@{})", self.index(), self.scope)
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Domain-specific ID aliases for clarity (no runtime cost).
pub type NodeId = Id;
pub type PortId = Id;
pub type LinkId = Id;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }

    #[test]
    fn max_index_has_no_id() {
        assert!(Id::try_from_index(u32::MAX).is_none());
        assert_eq!(Id::try_from_index(u32::MAX - 1).map(Id::index), Some(u32::MAX - 1));
    }

    #[test]
    fn scopes_keep_ids_apart() {
        let a = next_scope();
        let b = next_scope();
        assert_ne!(a, b);
        assert_ne!(a, 0);
        let x = Id::try_scoped(a, 3).unwrap();
        let y = Id::try_scoped(b, 3).unwrap();
        assert_ne!(x, y);
        assert_eq!(x.slot(), y.slot());
        assert_eq!(x.scope(), a);
        assert_eq!(Id::from_index(3).scope(), 0);
    }

    #[test]
    fn display_shows_index() {
        assert_eq!(Id::from_index(7).to_string(), "7");
        assert_eq!(format!("{:?}", Id::from_index(7)), "Id(7)");
    }

    proptest! {
        #[test]
        fn index_survives_id(i in 0_u32..u32::MAX) {
            prop_assert_eq!(Id::from_index(i).index(), i);
            prop_assert_eq!(Id::from_index(i).slot(), i as usize);
        }
    }
}
