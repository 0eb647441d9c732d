// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swap instead of shift.
//!
//! Within one container, hovering a node exchanges it with the grabbed node;
//! everything in between stays put. Hovering another container falls through
//! to whatever node-over handler was installed before this plugin, so
//! transfers keep working.
//!
//! ```
//! use understory_sortable::memory::MemoryHost;
//! use understory_sortable::plugins::swap::{SwapContext, swap, swap_with};
//! use understory_sortable::ParentConfig;
//!
//! type Host = MemoryHost<char>;
//!
//! let always = ParentConfig::<Host>::default().with_plugin(swap());
//! let lowercase_only = ParentConfig::<Host>::default().with_plugin(swap_with(
//!     |ctx: &SwapContext<'_, Host>| ctx.state.primary().value.is_ascii_lowercase(),
//! ));
//! assert_eq!(always.plugins.len(), 1);
//! assert_eq!(lowercase_only.plugins.len(), 1);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use tracing::trace;

use crate::engine::DragEngine;
use crate::handlers::{NodeOver, NodeOverHandler};
use crate::host::Host;
use crate::plugin::{Plugin, PluginFactory, SetupContext};
use crate::state::DragState;

/// What a [`ShouldSwap`] predicate gets to look at.
#[derive(Debug)]
pub struct SwapContext<'a, H: Host> {
    /// The host.
    pub host: &'a H,
    /// The container both nodes live in.
    pub parent: H::Element,
    /// The live drag state.
    pub state: &'a DragState<H::Element, H::Value>,
    /// The hovered node.
    pub target_node: H::Element,
}

/// Decides whether a hover should swap. Returning `false` falls back to the previous handler.
pub type ShouldSwap<H> = Rc<dyn Fn(&SwapContext<'_, H>) -> bool>;

/// Swap plugin that always swaps within a container.
pub fn swap<H: Host>() -> PluginFactory<H> {
    swap_with(|_: &SwapContext<'_, H>| true)
}

/// Swap plugin gated by `should_swap`.
pub fn swap_with<H: Host>(
    should_swap: impl Fn(&SwapContext<'_, H>) -> bool + 'static,
) -> PluginFactory<H> {
    let should_swap: ShouldSwap<H> = Rc::new(should_swap);
    Rc::new(move |_parent: H::Element| -> Box<dyn Plugin<H>> {
        Box::new(Swap {
            should_swap: should_swap.clone(),
        })
    })
}

struct Swap<H: Host> {
    should_swap: ShouldSwap<H>,
}

impl<H: Host> fmt::Debug for Swap<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Swap").finish_non_exhaustive()
    }
}

impl<H: Host> Plugin<H> for Swap<H> {
    fn setup(&mut self, ctx: &mut SetupContext<'_, H>) {
        let fallback = ctx.handlers.handle_node_over.clone();
        let should_swap = self.should_swap.clone();
        ctx.handlers.handle_node_over = Rc::new(
            move |engine: &mut DragEngine<H>, over: &NodeOver<H::Element>| {
                swap_over(engine, over, &*should_swap, &*fallback);
            },
        );
    }
}

fn swap_over<H: Host>(
    engine: &mut DragEngine<H>,
    over: &NodeOver<H::Element>,
    should_swap: &dyn Fn(&SwapContext<'_, H>) -> bool,
    fallback: &dyn NodeOverHandler<H>,
) {
    let Some(state) = engine.drag_state() else {
        return;
    };
    let allowed = over.parent == state.current_parent
        && should_swap(&SwapContext {
            host: engine.host(),
            parent: over.parent,
            state,
            target_node: over.node,
        });
    if !allowed {
        fallback.handle_node_over(engine, over);
        return;
    }
    if !engine.validate_sort(over) {
        return;
    }
    let Some((target, to)) = engine
        .lookup_node(over.node)
        .map(|n| (n.data.value.clone(), n.data.index))
    else {
        return;
    };
    let Some(state) = engine.drag_state() else {
        return;
    };
    let from = state.primary().index;
    let mut values = engine.values(over.parent);
    if values.get(from) != Some(&state.primary().value) || values.get(to) != Some(&target) {
        trace!(node = ?over.node, "swap partner not found in values");
        return;
    }
    let positions: Vec<usize> = state
        .dragged
        .iter()
        .enumerate()
        .map(|(i, d)| if i == state.primary { to } else { d.index })
        .collect();
    values.swap(from, to);
    engine.commit_sort(over.parent, values, &positions, Some(over.node));
}
