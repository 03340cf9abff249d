#![forbid(unsafe_op_in_unsafe_fn)]

pub mod ambient;
pub mod config;
pub mod error;
pub mod filter;
pub mod instance;
pub mod logging;
pub mod notifier;
pub mod props;
pub mod registry;
pub mod render;
pub mod wire;

pub use crate::ambient::{AmbientSlot, Scopes, SlotId};
pub use crate::config::{RenderOptions, WireConfig};
pub use crate::error::{WireError, WireResult};
pub use crate::filter::{find, Dependencies};
pub use crate::instance::{provider, wire, wire_render, Instance};
pub use crate::notifier::{ChangeListener, ChangeNotifier, Observable, Unsubscribe};
pub use crate::props::Props;
pub use crate::registry::{Registry, ServiceRef};
pub use crate::render::{component, Component, Element, Invalidator, RenderCx, Rendered, Root};
