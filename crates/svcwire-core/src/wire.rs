use std::sync::Arc;

use crate::ambient::AmbientSlot;
use crate::error::WireResult;
use crate::filter::{find, Dependencies};
use crate::props::Props;
use crate::registry::Registry;
use crate::render::{Component, Element, RenderCx};

/// Injects declared services into a wrapped component.
///
/// Injected services go in first, the caller's props second, so an explicit
/// prop shadows a service of the same name.
pub struct Wired {
    name: String,
    slot: AmbientSlot<Registry>,
    dependencies: Dependencies,
    inner: Arc<dyn Component>,
}

impl Wired {
    pub fn new(
        slot: AmbientSlot<Registry>,
        dependencies: Dependencies,
        inner: Arc<dyn Component>,
    ) -> Self {
        Self {
            name: format!("wire({})", inner.name()),
            slot,
            dependencies,
            inner,
        }
    }

    #[inline]
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }
}

impl Component for Wired {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, cx: &mut RenderCx<'_>, props: &Props) -> WireResult<Element> {
        let injected = inject(cx, &self.slot, &self.dependencies, &self.name);
        Ok(Element::component(self.inner.clone(), injected.merged(props)))
    }
}

/// Render-prop form: hands the filtered services to a callback and renders its result.
///
/// The callback sees only the declared services; props passed to this
/// component are not forwarded.
pub struct WireRender<F> {
    slot: AmbientSlot<Registry>,
    dependencies: Dependencies,
    render: F,
}

impl<F> WireRender<F> {
    pub fn new(slot: AmbientSlot<Registry>, dependencies: Dependencies, render: F) -> Self {
        Self {
            slot,
            dependencies,
            render,
        }
    }
}

impl<F> Component for WireRender<F>
where
    F: Fn(&Props) -> WireResult<Element> + Send + Sync,
{
    #[inline]
    fn name(&self) -> &str {
        "Wire"
    }

    fn render(&self, cx: &mut RenderCx<'_>, _props: &Props) -> WireResult<Element> {
        let injected = inject(cx, &self.slot, &self.dependencies, "Wire");
        (self.render)(&injected)
    }
}

fn inject(
    cx: &RenderCx<'_>,
    slot: &AmbientSlot<Registry>,
    deps: &Dependencies,
    who: &str,
) -> Props {
    let services = cx.read(slot);
    let injected = find(deps.as_slice(), services.as_deref());

    if cx.options().log_missing {
        for name in injected.absent_names() {
            log::debug!("{who}: dependency '{name}' is not provided");
        }
    }

    injected
}
