mod ctx;
mod element;
mod root;

pub use ctx::RenderCx;
pub use element::{component, Component, Element, FnComponent, Rendered};
pub use root::{Invalidator, Root};
