use ahash::AHashMap;
use smallvec::SmallVec;
use std::any::Any;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    #[inline]
    fn next() -> Self {
        Self(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Key for a value published to a subtree.
///
/// The slot itself holds no published state, only its identity and a default.
/// Published values live in [`Scopes`], which the caller threads through the
/// subtree explicitly.
pub struct AmbientSlot<T: Any + Send + Sync> {
    id: SlotId,
    default: Option<Arc<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> AmbientSlot<T> {
    pub fn new(default: Option<Arc<T>>) -> Self {
        Self {
            id: SlotId::next(),
            default,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn id(&self) -> SlotId {
        self.id
    }

    #[inline]
    pub fn default_value(&self) -> Option<Arc<T>> {
        self.default.clone()
    }

    /// Makes `value` visible to everything `subtree` reads through `scopes`.
    pub fn publish<R>(
        &self,
        scopes: &mut Scopes,
        value: Arc<T>,
        subtree: impl FnOnce(&mut Scopes) -> R,
    ) -> R {
        let mut guard = ScopeGuard::enter(scopes, self.id, value);
        subtree(&mut *guard)
    }

    /// Nearest published value, else the slot default.
    pub fn read(&self, scopes: &Scopes) -> Option<Arc<T>> {
        scopes
            .top(self.id)
            .and_then(|v| v.downcast::<T>().ok())
            .or_else(|| self.default.clone())
    }
}

impl<T: Any + Send + Sync> Clone for AmbientSlot<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            default: self.default.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Any + Send + Sync> std::fmt::Debug for AmbientSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientSlot")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

type Published = Arc<dyn Any + Send + Sync>;

/// Publication stacks of one render pass, keyed by slot.
#[derive(Default)]
pub struct Scopes {
    stacks: AHashMap<SlotId, SmallVec<[Published; 4]>>,
}

impl Scopes {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn enter(&mut self, slot: SlotId, value: Published) {
        self.stacks.entry(slot).or_default().push(value);
    }

    #[inline]
    pub(crate) fn exit(&mut self, slot: SlotId) {
        if let Some(stack) = self.stacks.get_mut(&slot) {
            stack.pop();
            if stack.is_empty() {
                self.stacks.remove(&slot);
            }
        }
    }

    #[inline]
    fn top(&self, slot: SlotId) -> Option<Published> {
        self.stacks.get(&slot).and_then(|s| s.last().cloned())
    }

    /// Returns whether `slot` has any active publication.
    #[inline]
    pub fn is_published(&self, slot: SlotId) -> bool {
        self.stacks.contains_key(&slot)
    }

    /// Number of active publications for `slot`.
    #[inline]
    pub fn depth(&self, slot: SlotId) -> usize {
        self.stacks.get(&slot).map_or(0, SmallVec::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

/// Pops its publication on drop, unwinding included.
struct ScopeGuard<'a> {
    scopes: &'a mut Scopes,
    slot: SlotId,
}

impl<'a> ScopeGuard<'a> {
    #[inline]
    fn enter(scopes: &'a mut Scopes, slot: SlotId, value: Published) -> Self {
        scopes.enter(slot, value);
        Self { scopes, slot }
    }
}

impl std::ops::Deref for ScopeGuard<'_> {
    type Target = Scopes;

    #[inline]
    fn deref(&self) -> &Scopes {
        self.scopes
    }
}

impl std::ops::DerefMut for ScopeGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Scopes {
        self.scopes
    }
}

impl Drop for ScopeGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.scopes.exit(self.slot);
    }
}
