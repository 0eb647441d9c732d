// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plugin host.
//!
//! A plugin is created per container by a [`PluginFactory`] and receives
//! lifecycle hooks for that container and its nodes. Every hook has an empty
//! default.
//!
//! | Hook | When |
//! |---|---|
//! | [`Plugin::setup`] | once, at registration; may replace handler slots |
//! | [`Plugin::tear_down`] | once, when the container is unregistered or re-registered |
//! | [`Plugin::setup_node`] | a node became enabled |
//! | [`Plugin::tear_down_node`] | a node stopped being enabled |
//! | [`Plugin::tear_down_node_remap`] | every remap, for each previously enabled node |
//! | [`Plugin::setup_node_remap`] | every remap, for each enabled node |
//! | [`Plugin::remap_finished`] | after every consistent remap |
//!
//! Plugins run in configuration order.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_sortable::memory::{ElementId, MemoryHost};
//! use understory_sortable::plugin::{HookContext, Plugin, PluginFactory};
//!
//! #[derive(Debug)]
//! struct CountRemaps(Rc<Cell<u32>>);
//!
//! impl Plugin<MemoryHost<u8>> for CountRemaps {
//!     fn remap_finished(&mut self, _ctx: &mut HookContext<'_, MemoryHost<u8>>) {
//!         self.0.set(self.0.get() + 1);
//!     }
//! }
//!
//! let count = Rc::new(Cell::new(0));
//! let factory: PluginFactory<MemoryHost<u8>> = {
//!     let count = count.clone();
//!     Rc::new(move |_parent: ElementId| -> Box<dyn Plugin<MemoryHost<u8>>> {
//!         Box::new(CountRemaps(count.clone()))
//!     })
//! };
//! assert_eq!(Rc::strong_count(&count), 2);
//! drop(factory);
//! assert_eq!(Rc::strong_count(&count), 1);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use crate::config::ParentConfig;
use crate::handlers::Handlers;
use crate::host::Host;
use crate::plugins::insert::InsertRanges;
use crate::registry::{NodeRecord, Registry};

/// Creates a plugin instance for a container.
pub type PluginFactory<H> = Rc<dyn Fn(<H as Host>::Element) -> Box<dyn Plugin<H>>>;

/// Context handed to [`Plugin::setup`].
pub struct SetupContext<'a, H: Host> {
    /// The container being registered.
    pub parent: H::Element,
    /// The host.
    pub host: &'a mut H,
    /// The container's configuration.
    pub config: &'a ParentConfig<H>,
    /// Handler slots resolved so far. Replace slots to override behavior.
    pub handlers: &'a mut Handlers<H>,
}

impl<H: Host> fmt::Debug for SetupContext<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupContext")
            .field("parent", &self.parent)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Context handed to every hook but [`Plugin::setup`].
pub struct HookContext<'a, H: Host> {
    /// The container the hook runs for.
    pub parent: H::Element,
    /// The host.
    pub host: &'a mut H,
    pub(crate) registry: &'a mut Registry<H>,
}

impl<H: Host> fmt::Debug for HookContext<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

impl<'a, H: Host> HookContext<'a, H> {
    pub(crate) fn new(parent: H::Element, host: &'a mut H, registry: &'a mut Registry<H>) -> Self {
        Self {
            parent,
            host,
            registry,
        }
    }

    /// The container's enabled nodes, in order.
    #[must_use]
    pub fn nodes(&self) -> &[H::Element] {
        self.registry
            .parent(self.parent)
            .map_or(&[], |p| p.data.nodes.as_slice())
    }

    /// Looks up a node record.
    #[must_use]
    pub fn node(&self, element: H::Element) -> Option<&NodeRecord<H::Element, H::Value>> {
        self.registry.node(element)
    }

    /// Caches insertion geometry on a node record.
    pub fn set_insert_ranges(&mut self, element: H::Element, ranges: Option<InsertRanges>) {
        if let Some(node) = self.registry.node_mut(element) {
            node.data.insert_ranges = ranges;
        }
    }
}

/// Lifecycle hooks of a per-container extension.
pub trait Plugin<H: Host> {
    /// Runs once at registration. Replace slots in `ctx.handlers` to override behavior.
    fn setup(&mut self, ctx: &mut SetupContext<'_, H>) {
        let _ = ctx;
    }

    /// Runs once when the container is torn down.
    fn tear_down(&mut self, ctx: &mut HookContext<'_, H>) {
        let _ = ctx;
    }

    /// A node became enabled.
    fn setup_node(&mut self, ctx: &mut HookContext<'_, H>, node: H::Element) {
        let _ = (ctx, node);
    }

    /// A node stopped being enabled.
    fn tear_down_node(&mut self, ctx: &mut HookContext<'_, H>, node: H::Element) {
        let _ = (ctx, node);
    }

    /// Runs on every remap for each enabled node, after reconciliation.
    fn setup_node_remap(&mut self, ctx: &mut HookContext<'_, H>, node: H::Element) {
        let _ = (ctx, node);
    }

    /// Runs on every remap for each node that was enabled before it.
    fn tear_down_node_remap(&mut self, ctx: &mut HookContext<'_, H>, node: H::Element) {
        let _ = (ctx, node);
    }

    /// Runs after a consistent remap.
    fn remap_finished(&mut self, ctx: &mut HookContext<'_, H>) {
        let _ = ctx;
    }
}
