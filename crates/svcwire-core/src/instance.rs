use std::sync::{Arc, OnceLock};

use crate::ambient::AmbientSlot;
use crate::error::WireResult;
use crate::filter::Dependencies;
use crate::props::Props;
use crate::registry::Registry;
use crate::render::{Component, Element, RenderCx};
use crate::wire::{WireRender, Wired};

/// An independent wiring namespace.
///
/// Each instance owns its own ambient slot: registries provided through one
/// instance are invisible to components wired through another. Reading with
/// no provider above yields an empty registry.
#[derive(Clone, Debug)]
pub struct Instance {
    slot: AmbientSlot<Registry>,
}

impl Instance {
    pub fn new() -> Self {
        Self {
            slot: AmbientSlot::new(Some(Arc::new(Registry::new()))),
        }
    }

    /// Process-wide instance behind the free functions of this crate.
    pub fn shared() -> &'static Instance {
        static SHARED: OnceLock<Instance> = OnceLock::new();
        SHARED.get_or_init(Instance::new)
    }

    #[inline]
    pub fn slot(&self) -> &AmbientSlot<Registry> {
        &self.slot
    }

    /// Registry visible at the current point of the render pass.
    #[inline]
    pub fn services(&self, cx: &RenderCx<'_>) -> Option<Arc<Registry>> {
        cx.read(&self.slot)
    }

    pub fn provider(&self, services: Arc<Registry>, child: Element) -> Element {
        Element::Provide {
            slot: self.slot.clone(),
            services,
            child: Box::new(child),
        }
    }

    pub fn wire(
        &self,
        dependencies: impl Into<Dependencies>,
        component: Arc<dyn Component>,
    ) -> Arc<dyn Component> {
        Arc::new(Wired::new(self.slot.clone(), dependencies.into(), component))
    }

    pub fn wire_render<F>(
        &self,
        dependencies: impl Into<Dependencies>,
        render: F,
    ) -> Arc<dyn Component>
    where
        F: Fn(&Props) -> WireResult<Element> + Send + Sync + 'static,
    {
        Arc::new(WireRender::new(self.slot.clone(), dependencies.into(), render))
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Instance::provider`] on the shared instance.
#[inline]
pub fn provider(services: Arc<Registry>, child: Element) -> Element {
    Instance::shared().provider(services, child)
}

/// [`Instance::wire`] on the shared instance.
#[inline]
pub fn wire(
    dependencies: impl Into<Dependencies>,
    component: Arc<dyn Component>,
) -> Arc<dyn Component> {
    Instance::shared().wire(dependencies, component)
}

/// [`Instance::wire_render`] on the shared instance.
#[inline]
pub fn wire_render<F>(dependencies: impl Into<Dependencies>, render: F) -> Arc<dyn Component>
where
    F: Fn(&Props) -> WireResult<Element> + Send + Sync + 'static,
{
    Instance::shared().wire_render(dependencies, render)
}
