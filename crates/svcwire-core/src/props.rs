use smallvec::SmallVec;
use std::any::Any;
use std::sync::Arc;

use crate::error::{WireError, WireResult};
use crate::registry::ServiceRef;

/// Named inputs of a component.
///
/// Keeps insertion order and unique names. A name mapped to `None` is an
/// explicit absent entry: it was asked for (or passed) but carries no value.
#[derive(Clone, Default)]
pub struct Props {
    entries: SmallVec<[(String, Option<ServiceRef>); 4]>,
}

impl Props {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(cap),
        }
    }

    /// Builder-style [`Props::set`].
    #[inline]
    pub fn with<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.set(name, value);
        self
    }

    #[inline]
    pub fn set<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.set_ref(name, Some(Arc::new(value)));
    }

    /// Builder-style [`Props::set_service`].
    #[inline]
    pub fn with_service<T: Any + Send + Sync>(
        mut self,
        name: impl Into<String>,
        service: Arc<T>,
    ) -> Self {
        self.set_service(name, service);
        self
    }

    /// Stores an existing service handle as is, so it reads back as `T`
    /// exactly like a registry entry.
    #[inline]
    pub fn set_service<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: Arc<T>) {
        self.set_ref(name, Some(service));
    }

    /// Overwrites in place when the name is already present.
    pub fn set_ref(&mut self, name: impl Into<String>, value: Option<ServiceRef>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[inline]
    pub fn set_absent(&mut self, name: impl Into<String>) {
        self.set_ref(name, None);
    }

    /// True if the name is present, even when mapped to absent.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    #[inline]
    pub fn is_absent(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, v)| n == name && v.is_none())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&ServiceRef> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    #[inline]
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(|v| v.clone().downcast::<T>().ok())
    }

    /// Strict typed accessor for components that cannot work without an input.
    pub fn require<T: Any + Send + Sync>(&self, name: &str) -> WireResult<Arc<T>> {
        let value = self.get(name).ok_or_else(|| WireError::Missing {
            name: name.to_string(),
        })?;
        value
            .clone()
            .downcast::<T>()
            .map_err(|_| WireError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    #[inline]
    pub fn absent_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(n, _)| n.as_str())
    }

    /// Applies `overrides` on top of `self`; on a name collision the override wins.
    pub fn merged(mut self, overrides: &Props) -> Props {
        for (name, value) in &overrides.entries {
            self.set_ref(name.clone(), value.clone());
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Same names, each bound to the same allocation (or both absent). Order is ignored.
impl PartialEq for Props {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.entries.iter().all(|(name, value)| {
            other
                .entries
                .iter()
                .find(|(n, _)| n == name)
                .is_some_and(|(_, v)| same_value(value, v))
        })
    }
}

fn same_value(a: &Option<ServiceRef>, b: &Option<ServiceRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
        }
        _ => false,
    }
}

impl std::fmt::Debug for Props {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.entries {
            map.entry(name, &if value.is_some() { "<service>" } else { "<absent>" });
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_in_place() {
        let mut props = Props::new().with("a", 1u32).with("b", 2u32);
        props.set("a", 3u32);

        assert_eq!(props.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(props.get_as::<u32>("a").map(|v| *v), Some(3));
    }

    #[test]
    fn merged_lets_overrides_win() {
        let injected = Props::new()
            .with("a", String::from("service"))
            .with("b", String::from("other"));
        let external = Props::new().with("a", String::from("explicit"));

        let merged = injected.merged(&external);
        assert_eq!(merged.get_as::<String>("a").as_deref().map(String::as_str), Some("explicit"));
        assert_eq!(merged.get_as::<String>("b").as_deref().map(String::as_str), Some("other"));
    }

    #[test]
    fn service_handles_are_stored_without_rewrapping() {
        let svc = Arc::new(String::from("shared"));
        let props = Props::new().with_service("svc", svc.clone());

        assert!(Arc::ptr_eq(&props.require::<String>("svc").unwrap(), &svc));
    }

    #[test]
    fn absent_entries_are_present_but_empty() {
        let mut props = Props::new();
        props.set_absent("clock");

        assert!(props.contains("clock"));
        assert!(props.is_absent("clock"));
        assert!(props.get("clock").is_none());
        assert_eq!(props.absent_names().collect::<Vec<_>>(), vec!["clock"]);
    }

    #[test]
    fn require_reports_missing_and_mismatch() {
        let mut props = Props::new().with("n", 7i64);
        props.set_absent("gone");

        assert_eq!(*props.require::<i64>("n").unwrap(), 7);
        assert!(matches!(props.require::<i64>("gone"), Err(WireError::Missing { .. })));
        assert!(matches!(props.require::<i64>("never"), Err(WireError::Missing { .. })));
        assert!(matches!(
            props.require::<String>("n"),
            Err(WireError::TypeMismatch { .. })
        ));
    }
}
