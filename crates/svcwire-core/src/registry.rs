use ahash::AHashMap;
use std::any::Any;
use std::sync::Arc;

use crate::error::{WireError, WireResult};

/// Shared handle to a published service.
pub type ServiceRef = Arc<dyn Any + Send + Sync>;

/// Named service storage published to a subtree.
///
/// Notes:
/// - values are stored as `Arc<dyn Any + Send + Sync>` keyed by name;
/// - for trait objects (e.g. `Arc<dyn Clock>`), wrap them in a dedicated struct
///   so the downcast target is a sized type.
#[derive(Default, Clone)]
pub struct Registry {
    map: AHashMap<String, ServiceRef>,
}

impl Registry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[inline]
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, service: Arc<T>) -> Self {
        self.insert(name, service);
        self
    }

    /// Inserts or replaces; returns the previous service under that name.
    #[inline]
    pub fn insert<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        service: Arc<T>,
    ) -> Option<ServiceRef> {
        self.map.insert(name.into(), service)
    }

    #[inline]
    pub fn insert_ref(
        &mut self,
        name: impl Into<String>,
        service: ServiceRef,
    ) -> Option<ServiceRef> {
        self.map.insert(name.into(), service)
    }

    pub fn try_insert<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        service: Arc<T>,
    ) -> WireResult<()> {
        let name = name.into();
        if self.map.contains_key(&name) {
            return Err(WireError::Duplicate(name));
        }
        self.map.insert(name, service);
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ServiceRef> {
        self.map.get(name)
    }

    #[inline]
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.map.get(name).and_then(|v| v.clone().downcast::<T>().ok())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<ServiceRef> {
        self.map.remove(name)
    }

    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("services", &names).finish()
    }
}
