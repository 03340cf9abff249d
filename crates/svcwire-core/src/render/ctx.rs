use std::any::Any;
use std::sync::Arc;

use crate::ambient::{AmbientSlot, Scopes, SlotId};
use crate::config::RenderOptions;
use crate::error::{WireError, WireResult};

use super::{Element, Rendered};

/// Context passed to components during a render pass.
///
/// This is the only way a component reaches ambient values.
pub struct RenderCx<'a> {
    scopes: &'a mut Scopes,
    options: &'a RenderOptions,
    depth: usize,
}

impl<'a> RenderCx<'a> {
    #[inline]
    pub fn new(scopes: &'a mut Scopes, options: &'a RenderOptions) -> Self {
        Self {
            scopes,
            options,
            depth: 0,
        }
    }

    #[inline]
    pub fn read<T: Any + Send + Sync>(&self, slot: &AmbientSlot<T>) -> Option<Arc<T>> {
        slot.read(&*self.scopes)
    }

    /// Runs `f` with `value` published on `slot`.
    pub fn provide<T, R>(
        &mut self,
        slot: &AmbientSlot<T>,
        value: Arc<T>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R
    where
        T: Any + Send + Sync,
    {
        self.scopes.enter(slot.id(), value);
        let mut guard = ProvideGuard {
            cx: self,
            slot: slot.id(),
        };
        f(&mut *guard)
    }

    #[inline]
    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    /// Number of components currently being rendered above this point.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn render(&mut self, element: &Element) -> WireResult<Rendered> {
        match element {
            Element::Empty => Ok(Rendered::Empty),
            Element::Text(t) => Ok(Rendered::Text(t.clone())),
            Element::List(items) => items
                .iter()
                .map(|e| self.render(e))
                .collect::<WireResult<Vec<_>>>()
                .map(Rendered::List),
            Element::Component { component, props } => {
                if self.depth >= self.options.max_depth {
                    return Err(WireError::DepthExceeded {
                        component: component.name().to_string(),
                        limit: self.options.max_depth,
                    });
                }

                self.depth += 1;
                log::trace!("render {} (depth {})", component.name(), self.depth);
                let out = component
                    .render(self, props)
                    .and_then(|next| self.render(&next));
                self.depth -= 1;
                out
            }
            Element::Provide {
                slot,
                services,
                child,
            } => self.provide(slot, services.clone(), |cx| cx.render(child)),
        }
    }
}

/// Pops the publication made by [`RenderCx::provide`] on drop, unwinding included.
struct ProvideGuard<'g, 'a> {
    cx: &'g mut RenderCx<'a>,
    slot: SlotId,
}

impl<'a> std::ops::Deref for ProvideGuard<'_, 'a> {
    type Target = RenderCx<'a>;

    #[inline]
    fn deref(&self) -> &RenderCx<'a> {
        self.cx
    }
}

impl<'a> std::ops::DerefMut for ProvideGuard<'_, 'a> {
    #[inline]
    fn deref_mut(&mut self) -> &mut RenderCx<'a> {
        self.cx
    }
}

impl Drop for ProvideGuard<'_, '_> {
    #[inline]
    fn drop(&mut self) {
        self.cx.scopes.exit(self.slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Props;
    use crate::registry::Registry;
    use crate::render::component;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn panicking_component_leaves_no_publication_behind() {
        let slot = AmbientSlot::<Registry>::new(None);
        let exploding = component("Exploding", |_cx, _props| -> WireResult<Element> {
            panic!("render failed")
        });
        let tree = Element::Provide {
            slot: slot.clone(),
            services: Arc::new(Registry::new()),
            child: Box::new(Element::component(exploding, Props::new())),
        };

        let mut scopes = Scopes::new();
        let options = RenderOptions::default();
        let mut cx = RenderCx::new(&mut scopes, &options);

        let res = catch_unwind(AssertUnwindSafe(|| cx.render(&tree)));
        assert!(res.is_err());
        assert!(cx.read(&slot).is_none());

        drop(cx);
        assert!(scopes.is_empty());
    }
}
