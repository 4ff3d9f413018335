//! Type-erased cancellation identities.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An opaque, hashable identity scoping a family of in-flight effects.
///
/// Any `Hash + Eq + Debug + Send + Sync + 'static` value can serve as an id.
/// Two ids are equal only when they wrap the same concrete type *and* the
/// wrapped values compare equal, so unrelated features can use plain strings
/// or unit structs without colliding with each other's integers.
///
/// Per-instance identities are built from tuples:
///
/// ```rust
/// use reflux::cancellation::CancelId;
///
/// #[derive(Debug, Hash, PartialEq, Eq)]
/// struct DebounceId;
///
/// let row_a = CancelId::new((DebounceId, 1));
/// let row_b = CancelId::new((DebounceId, 2));
/// assert_ne!(row_a, row_b);
/// ```
#[derive(Clone)]
pub struct CancelId(Arc<dyn ErasedKey>);

impl CancelId {
    /// Wrap a value as a cancellation id.
    ///
    /// Wrapping an existing `CancelId` returns it unchanged.
    pub fn new<K>(key: K) -> Self
    where
        K: Hash + Eq + fmt::Debug + Send + Sync + 'static,
    {
        if let Some(id) = (&key as &dyn Any).downcast_ref::<CancelId>() {
            return id.clone();
        }
        CancelId(Arc::new(key))
    }

    /// Borrow the wrapped value if it has type `K`.
    pub fn downcast_ref<K: 'static>(&self) -> Option<&K> {
        self.0.as_any().downcast_ref::<K>()
    }
}

impl PartialEq for CancelId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_key(other.0.as_ref())
    }
}

impl Eq for CancelId {}

impl Hash for CancelId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash_key(state);
    }
}

impl fmt::Debug for CancelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CancelId(")?;
        self.0.fmt_key(f)?;
        f.write_str(")")
    }
}

trait ErasedKey: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn eq_key(&self, other: &dyn ErasedKey) -> bool;
    fn hash_key(&self, state: &mut dyn Hasher);
    fn fmt_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<K> ErasedKey for K
where
    K: Hash + Eq + fmt::Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_key(&self, other: &dyn ErasedKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .is_some_and(|other| other == self)
    }

    fn hash_key(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<K>().hash(&mut state);
        self.hash(&mut state);
    }

    fn fmt_key(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
