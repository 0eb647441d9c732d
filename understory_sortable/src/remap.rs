// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation of a container's children with its values.
//!
//! A remap pairs the container's enabled children, in order, with the values
//! from its getter. Records survive for as long as their element stays an
//! enabled child of the same container, so a remap with nothing changed
//! creates and destroys nothing.

use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::bus::LifecycleEvent;
use crate::engine::DragEngine;
use crate::host::{Host, ListenerRole};
use crate::plugin::{HookContext, Plugin};
use crate::registry::{NodeData, NodeRecord};
use crate::state::DragMode;

impl<H: Host> DragEngine<H> {
    /// Re-reads the children and values of `parent` and reconciles node records.
    ///
    /// Disconnected containers are unregistered. When the number of enabled
    /// children and values disagree, nodes are paired up to the shorter of the
    /// two and plugins and subscribers are not told the remap finished, which
    /// keeps sorting blocked until a consistent remap arrives. A dragged value
    /// vanishing from the drag's container outside of an engine commit ends the
    /// drag as cancelled.
    pub fn remap(&mut self, parent: H::Element) {
        let Some(record) = self.registry.parent(parent) else {
            return;
        };
        if !self.host.is_connected(parent) {
            debug!(?parent, "container disconnected, unregistering");
            self.unregister(parent);
            return;
        }

        let draggable = record.data.config.draggable.clone();
        let values = (record.data.values)(&self.host, parent);
        let previous = record.data.nodes.clone();
        let image = match self.drag_state().map(|s| &s.mode) {
            Some(DragMode::Synthetic { image, .. }) => *image,
            _ => None,
        };
        let enabled: Vec<H::Element> = self
            .host
            .children(parent)
            .into_iter()
            .filter(|el| Some(*el) != image)
            .filter(|el| draggable.as_ref().is_none_or(|f| f(&self.host, *el)))
            .collect();
        let consistent = enabled.len() == values.len();
        if !consistent {
            warn!(
                ?parent,
                nodes = enabled.len(),
                values = values.len(),
                "enabled children and values disagree"
            );
        }
        let pairs: Vec<(H::Element, H::Value)> = enabled.into_iter().zip(values).collect();

        // Nodes that moved here from another container are forgotten there first.
        for (el, _) in &pairs {
            if let Some(owner) = self.registry.node(*el).map(|n| n.data.parent)
                && owner != parent
            {
                self.forget_node(owner, *el);
            }
        }

        self.run_plugins(parent, |plugin, ctx| {
            for node in &previous {
                plugin.tear_down_node_remap(ctx, *node);
            }
        });

        let removed: Vec<H::Element> = previous
            .iter()
            .copied()
            .filter(|el| !pairs.iter().any(|(p, _)| p == el))
            .collect();
        if !removed.is_empty() {
            self.run_plugins(parent, |plugin, ctx| {
                for node in &removed {
                    plugin.tear_down_node(ctx, *node);
                }
            });
            for node in &removed {
                self.drop_node(parent, *node);
            }
        }

        let mut added = Vec::new();
        for (index, (el, value)) in pairs.iter().enumerate() {
            if let Some(node) = self.registry.node_mut(*el) {
                node.data.index = index;
                node.data.value = value.clone();
                continue;
            }
            let id = self.registry.next_id();
            let handle = self.host.attach(*el, ListenerRole::Node);
            let mut handles = SmallVec::new();
            handles.push(handle);
            self.registry.insert_node(NodeRecord {
                element: *el,
                data: NodeData {
                    parent,
                    index,
                    value: value.clone(),
                    private_classes: Vec::new(),
                    handles,
                    id,
                    insert_ranges: None,
                },
            });
            added.push(*el);
        }
        let nodes: Vec<H::Element> = pairs.iter().map(|(el, _)| *el).collect();
        let present: Vec<H::Value> = pairs.into_iter().map(|(_, v)| v).collect();
        if let Some(record) = self.registry.parent_mut(parent) {
            record.data.nodes = nodes.clone();
            record.data.selection.retain_present(&present);
        }

        self.run_plugins(parent, |plugin, ctx| {
            for node in &added {
                plugin.setup_node(ctx, *node);
            }
            for node in &nodes {
                plugin.setup_node_remap(ctx, *node);
            }
        });
        self.sync_selection_classes(parent);

        let desync = self.repoint_drag(parent);
        trace!(
            ?parent,
            nodes = nodes.len(),
            added = added.len(),
            removed = removed.len(),
            "remapped"
        );

        if desync {
            warn!(?parent, "drag lost track of its nodes, ending it");
            self.end_drag(true, false);
        } else if consistent {
            self.run_plugins(parent, |plugin, ctx| plugin.remap_finished(ctx));
            self.emit(parent, &LifecycleEvent::RemapFinished { parent });
            if let Some(state) = self.drag_state_mut() {
                state.remap_done(parent);
            }
        }
    }

    /// Points the dragged nodes at the current elements holding their values.
    ///
    /// During an engine commit the recorded positions are authoritative; outside
    /// of one the dragged elements are, since the host may have inserted or
    /// removed rows around them. Equal values are told apart by position, and
    /// no node is claimed twice. Returns `true` if a dragged value went missing
    /// outside of an engine commit.
    fn repoint_drag(&mut self, parent: H::Element) -> bool {
        let Some(state) = self.drag_state() else {
            return false;
        };
        if state.current_parent != parent {
            return false;
        }
        let committing = state.committing;
        let class = state.phase_class().map(String::from);
        let nodes = self
            .registry
            .parent(parent)
            .map(|r| r.data.nodes.clone())
            .unwrap_or_default();
        let previous = state.dragged_elements();

        let mut located: Vec<Option<usize>> = Vec::with_capacity(state.dragged.len());
        for dragged in &state.dragged {
            let fits = |at: usize| {
                !located.contains(&Some(at))
                    && nodes.get(at).is_some_and(|el| {
                        self.registry
                            .node(*el)
                            .is_some_and(|n| n.data.value == dragged.value)
                    })
            };
            let by_index = fits(dragged.index).then_some(dragged.index);
            let by_element = nodes
                .iter()
                .position(|el| *el == dragged.element)
                .filter(|at| fits(*at));
            let preferred = if committing {
                by_index.or(by_element)
            } else {
                by_element.or(by_index)
            };
            let found = preferred.or_else(|| (0..nodes.len()).find(|at| fits(*at)));
            located.push(found);
        }
        let missing = located.iter().any(Option::is_none);

        if let Some(state) = self.drag_state_mut() {
            for (dragged, at) in state.dragged.iter_mut().zip(&located) {
                if let Some(at) = *at {
                    dragged.index = at;
                    dragged.element = nodes[at];
                }
            }
        }
        if let Some(class) = class {
            let current: Vec<H::Element> = located.iter().flatten().map(|at| nodes[*at]).collect();
            for element in previous.iter().filter(|el| !current.contains(el)) {
                self.remove_private_class(*element, &class);
            }
            for element in &current {
                self.add_private_class(*element, &class);
            }
        }
        missing && !committing
    }

    /// Removes `node` from `owner` after it was adopted by another container.
    fn forget_node(&mut self, owner: H::Element, node: H::Element) {
        trace!(?owner, ?node, "node changed containers");
        self.run_plugins(owner, |plugin, ctx| plugin.tear_down_node(ctx, node));
        self.drop_node(owner, node);
        if let Some(record) = self.registry.parent_mut(owner) {
            record.data.nodes.retain(|el| *el != node);
        }
    }

    /// Detaches a node's listeners, strips its classes and removes its record.
    pub(crate) fn drop_node(&mut self, parent: H::Element, node: H::Element) {
        if self
            .registry
            .node(node)
            .is_none_or(|record| record.data.parent != parent)
        {
            return;
        }
        let Some(record) = self.registry.remove_node(node) else {
            return;
        };
        for handle in &record.data.handles {
            self.host.detach(*handle);
        }
        for class in &record.data.private_classes {
            self.host.remove_class(node, class);
        }
    }

    /// Runs `f` over every plugin of `parent`, with the plugins taken out of the record.
    pub(crate) fn run_plugins(
        &mut self,
        parent: H::Element,
        mut f: impl FnMut(&mut dyn Plugin<H>, &mut HookContext<'_, H>),
    ) {
        let Some(record) = self.registry.parent_mut(parent) else {
            return;
        };
        if record.data.plugins.is_empty() {
            return;
        }
        let mut plugins = mem::take(&mut record.data.plugins);
        {
            let mut ctx = HookContext::new(parent, &mut self.host, &mut self.registry);
            for plugin in &mut plugins {
                f(plugin.as_mut(), &mut ctx);
            }
        }
        if let Some(record) = self.registry.parent_mut(parent) {
            record.data.plugins = plugins;
        }
    }
}
