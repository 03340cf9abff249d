use smallvec::SmallVec;

use crate::props::Props;
use crate::registry::Registry;

/// Ordered service names a consumer declares. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    names: SmallVec<[String; 4]>,
}

impl Dependencies {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    #[inline]
    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Dependencies {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for Dependencies {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().collect()
    }
}

impl From<&[&str]> for Dependencies {
    fn from(names: &[&str]) -> Self {
        names.iter().copied().collect()
    }
}

impl From<Vec<String>> for Dependencies {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

/// Picks the requested services out of `services`.
///
/// Every requested name ends up in the result: names the registry lacks are
/// mapped to absent. A missing registry behaves like an empty one.
pub fn find<S: AsRef<str>>(dependencies: &[S], services: Option<&Registry>) -> Props {
    dependencies
        .iter()
        .fold(Props::with_capacity(dependencies.len()), |mut result, dependency| {
            let name = dependency.as_ref();
            result.set_ref(name, services.and_then(|s| s.get(name)).cloned());
            result
        })
}
