// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position animations after a remap.

use alloc::boxed::Box;
use alloc::rc::Rc;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::host::Host;
use crate::plugin::{HookContext, Plugin, PluginFactory};

/// Default animation duration, in milliseconds.
pub const DEFAULT_DURATION: u64 = 150;

/// Animations plugin: every node whose rectangle changed between two finished
/// remaps is handed to [`Host::animate`].
pub fn animations<H: Host>(duration: u64) -> PluginFactory<H> {
    Rc::new(move |_parent: H::Element| -> Box<dyn Plugin<H>> {
        Box::new(Animations::<H> {
            duration,
            rects: HashMap::new(),
        })
    })
}

struct Animations<H: Host> {
    duration: u64,
    rects: HashMap<H::Element, Rect>,
}

impl<H: Host> core::fmt::Debug for Animations<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Animations")
            .field("duration", &self.duration)
            .field("tracked", &self.rects.len())
            .finish()
    }
}

impl<H: Host> Plugin<H> for Animations<H> {
    fn tear_down_node(&mut self, _ctx: &mut HookContext<'_, H>, node: H::Element) {
        self.rects.remove(&node);
    }

    fn tear_down(&mut self, _ctx: &mut HookContext<'_, H>) {
        self.rects.clear();
    }

    fn remap_finished(&mut self, ctx: &mut HookContext<'_, H>) {
        let nodes = ctx.nodes().to_vec();
        for node in nodes {
            let to = ctx.host.rect(node);
            if let Some(from) = self.rects.insert(node, to)
                && from != to
            {
                ctx.host.animate(node, from, to, self.duration);
            }
        }
    }
}
