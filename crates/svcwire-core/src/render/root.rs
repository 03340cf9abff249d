use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ambient::Scopes;
use crate::config::RenderOptions;
use crate::error::WireResult;
use crate::instance::Instance;
use crate::notifier::{ChangeNotifier, Observable};
use crate::registry::Registry;

use super::{Element, RenderCx, Rendered};

/// Re-render request handle.
///
/// Clone it into service change listeners; any thread may call it.
#[derive(Clone, Debug)]
pub struct Invalidator {
    dirty: Arc<AtomicBool>,
}

impl Invalidator {
    #[inline]
    fn new(dirty: bool) -> Self {
        Self {
            dirty: Arc::new(AtomicBool::new(dirty)),
        }
    }

    #[inline]
    pub fn invalidate(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    #[inline]
    fn clear(&self) {
        self.dirty.store(false, Ordering::Release);
    }
}

/// Top of a component tree: owns the root registry and re-evaluates the tree.
///
/// The root registry is published on the instance slot for the whole app.
/// Nested [`Element::Provide`] nodes override it for their subtree.
pub struct Root {
    instance: Instance,
    app: Element,
    services: Arc<Registry>,
    options: RenderOptions,

    notifier: ChangeNotifier,
    invalidator: Invalidator,
    revision: u64,

    last: Option<Rendered>,
}

impl Root {
    /// Root bound to the shared instance.
    #[inline]
    pub fn new(services: Arc<Registry>, app: Element) -> Self {
        Self::with_instance(Instance::shared(), services, app)
    }

    pub fn with_instance(instance: &Instance, services: Arc<Registry>, app: Element) -> Self {
        Self {
            instance: instance.clone(),
            app,
            services,
            options: RenderOptions::default(),
            notifier: ChangeNotifier::new(),
            invalidator: Invalidator::new(true),
            revision: 0,
            last: None,
        }
    }

    #[inline]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the root registry.
    ///
    /// Only a different `Arc` counts as a change: it bumps the revision, marks
    /// the tree dirty and runs the root change listeners. Returns whether it changed.
    pub fn publish(&mut self, services: Arc<Registry>) -> bool {
        if Arc::ptr_eq(&self.services, &services) {
            return false;
        }

        self.services = services;
        self.revision += 1;
        self.invalidator.invalidate();

        log::info!(
            "root registry republished: revision={} services={}",
            self.revision,
            self.services.len()
        );

        self.notifier.run_change_listeners();
        true
    }

    /// Replaces the app element (new external props); marks the tree dirty.
    #[inline]
    pub fn set_app(&mut self, app: Element) {
        self.app = app;
        self.invalidator.invalidate();
    }

    pub fn render(&mut self) -> WireResult<&Rendered> {
        // Cleared up front: invalidations raised while rendering survive the pass.
        self.invalidator.clear();

        let mut scopes = Scopes::new();
        let out = {
            let mut cx = RenderCx::new(&mut scopes, &self.options);
            let app = &self.app;
            cx.provide(self.instance.slot(), self.services.clone(), |cx| cx.render(app))
        };

        let out = match out {
            Ok(out) => out,
            Err(e) => {
                self.invalidator.invalidate();
                log::warn!("render failed: {e}");
                return Err(e);
            }
        };

        log::trace!("rendered revision {}", self.revision);
        Ok(self.last.insert(out))
    }

    /// Renders only when something invalidated the tree since the last pass.
    pub fn render_if_dirty(&mut self) -> WireResult<Option<&Rendered>> {
        if !self.invalidator.is_dirty() {
            return Ok(None);
        }
        self.render().map(Some)
    }

    #[inline]
    pub fn invalidator(&self) -> Invalidator {
        self.invalidator.clone()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.invalidator.is_dirty()
    }

    #[inline]
    pub fn services(&self) -> &Arc<Registry> {
        &self.services
    }

    /// Number of effective republications so far.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn last_rendered(&self) -> Option<&Rendered> {
        self.last.as_ref()
    }
}

impl Observable for Root {
    #[inline]
    fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
