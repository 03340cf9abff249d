use std::sync::Arc;

use crate::ambient::AmbientSlot;
use crate::error::WireResult;
use crate::props::Props;
use crate::registry::Registry;

use super::RenderCx;

/// A unit of the component tree.
///
/// Components never reach for their parents: everything they need arrives
/// either as props or through the ambient values readable from `cx`.
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    fn render(&self, cx: &mut RenderCx<'_>, props: &Props) -> WireResult<Element>;
}

/// Closure-backed component, see [`component`].
pub struct FnComponent<F> {
    name: String,
    f: F,
}

impl<F> Component for FnComponent<F>
where
    F: Fn(&mut RenderCx<'_>, &Props) -> WireResult<Element> + Send + Sync,
{
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn render(&self, cx: &mut RenderCx<'_>, props: &Props) -> WireResult<Element> {
        (self.f)(cx, props)
    }
}

pub fn component<F>(name: impl Into<String>, f: F) -> Arc<dyn Component>
where
    F: Fn(&mut RenderCx<'_>, &Props) -> WireResult<Element> + Send + Sync + 'static,
{
    Arc::new(FnComponent {
        name: name.into(),
        f,
    })
}

/// Description of what to render. Cheap to clone: components and registries are shared.
#[derive(Clone, Default)]
pub enum Element {
    #[default]
    Empty,
    Text(String),
    List(Vec<Element>),
    Component {
        component: Arc<dyn Component>,
        props: Props,
    },
    /// Publishes `services` on `slot` for `child` and its descendants.
    Provide {
        slot: AmbientSlot<Registry>,
        services: Arc<Registry>,
        child: Box<Element>,
    },
}

impl Element {
    #[inline]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    #[inline]
    pub fn list(items: impl IntoIterator<Item = Element>) -> Self {
        Self::List(items.into_iter().collect())
    }

    #[inline]
    pub fn component(component: Arc<dyn Component>, props: Props) -> Self {
        Self::Component { component, props }
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Empty => f.write_str("Empty"),
            Element::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Element::List(items) => f.debug_list().entries(items).finish(),
            Element::Component { component, props } => f
                .debug_struct("Component")
                .field("name", &component.name())
                .field("props", props)
                .finish(),
            Element::Provide { services, child, .. } => f
                .debug_struct("Provide")
                .field("services", services)
                .field("child", child)
                .finish(),
        }
    }
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Rendered {
    #[default]
    Empty,
    Text(String),
    List(Vec<Rendered>),
}

impl Rendered {
    /// All text leaves, depth-first.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Rendered::Empty => {}
            Rendered::Text(t) => out.push(t),
            Rendered::List(items) => items.iter().for_each(|i| i.collect_texts(out)),
        }
    }
}

impl std::fmt::Display for Rendered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.texts().join("\n"))
    }
}
