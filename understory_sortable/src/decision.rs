// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sort and transfer decisions.
//!
//! Validation is split from execution: the over handlers ask
//! [`DragEngine::validate_sort`] or [`DragEngine::validate_transfer`] and then
//! dispatch to the container's strategy slot, whose default lands in
//! [`DragEngine::sort_values`] or [`DragEngine::commit_transfer`].

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use tracing::{debug, trace};

use crate::bus::LifecycleEvent;
use crate::config::{Threshold, TransferCheck};
use crate::engine::DragEngine;
use crate::handlers::{NodeOver, SortRequest, TransferRequest};
use crate::host::Host;
use crate::payload::{SortEvent, TransferEvent};
use crate::state::{Edge, SortDirection};

fn magnitude(v: f64) -> f64 {
    if v < 0.0 { -v } else { v }
}

/// The edge of `target` that `dragged` approaches from, by the dominant axis of their offset.
fn incoming_edge(dragged: Rect, target: Rect) -> Edge {
    let delta = target.origin() - dragged.origin();
    if magnitude(delta.y) >= magnitude(delta.x) {
        if delta.y > 0.0 { Edge::Above } else { Edge::Below }
    } else if delta.x > 0.0 {
        Edge::Left
    } else {
        Edge::Right
    }
}

/// Returns `true` once `pos` is past the threshold line of `target` for `edge`.
fn crossed(edge: Edge, target: Rect, pos: Point, threshold: Threshold) -> bool {
    let dx = target.width() * threshold.horizontal;
    let dy = target.height() * threshold.vertical;
    match edge {
        Edge::Above => pos.y > target.y0 + dy,
        Edge::Below => pos.y < target.y1 - dy,
        Edge::Left => pos.x > target.x0 + dx,
        Edge::Right => pos.x < target.x1 - dx,
    }
}

/// Insertion index implied by `pos` among nodes with the given centers.
///
/// The nearest center wins, the lowest index on ties, and the index moves past
/// that node when the pointer lies beyond its center along the dominant axis.
fn nearest_boundary(centers: &[Point], pos: Point) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (index, center) in centers.iter().enumerate() {
        let distance = (*center - pos).hypot2();
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    let Some((index, _)) = best else {
        return 0;
    };
    let offset = pos - centers[index];
    let past = if magnitude(offset.x) > magnitude(offset.y) {
        offset.x > 0.0
    } else {
        offset.y > 0.0
    };
    if past { index + 1 } else { index }
}

impl<H: Host> DragEngine<H> {
    /// Decides whether hovering `over` should re-sort the current container.
    ///
    /// Hovering one of the dragged nodes forgets the last sort target, so the
    /// same node can trigger a sort again after the pointer comes back.
    pub fn validate_sort(&mut self, over: &NodeOver<H::Element>) -> bool {
        let Some(state) = self.drag_state() else {
            return false;
        };
        if state.prevent_enter {
            trace!(node = ?over.node, "sort blocked until remap completes");
            return false;
        }
        if over.parent != state.current_parent {
            return false;
        }
        let Some(record) = self.registry.parent(over.parent) else {
            return false;
        };
        if !record.data.config.sortable || record.data.config.disabled {
            return false;
        }
        if state.is_dragged(over.node) {
            if let Some(state) = self.drag_state_mut() {
                state.current_target = None;
            }
            return false;
        }
        let Some(target_value) = self.registry.node(over.node).map(|n| &n.data.value) else {
            return false;
        };
        if state.current_target.as_ref() == Some(target_value) {
            return false;
        }

        let threshold = record.data.config.threshold;
        let target = self.host.rect(over.node);
        let dragged = self.host.rect(state.primary().element);
        let edge = incoming_edge(dragged, target);
        if !crossed(edge, target, over.position, threshold) {
            trace!(node = ?over.node, ?edge, "threshold not crossed");
            return false;
        }
        if let Some(state) = self.drag_state_mut() {
            state.incoming = Some(edge);
        }
        true
    }

    /// Decides whether the dragged nodes may move into `target`.
    ///
    /// Both the drag's initial container and `target` must share the same
    /// non-empty group, and `target`'s `accepts` gate, if any, must agree.
    pub fn validate_transfer(&self, target: H::Element, node: Option<H::Element>) -> bool {
        let Some(state) = self.drag_state() else {
            return false;
        };
        if state.prevent_enter || target == state.current_parent {
            return false;
        }
        let Some(record) = self.registry.parent(target) else {
            return false;
        };
        let config = &record.data.config;
        if config.disabled {
            return false;
        }
        let initial_group = self
            .registry
            .parent(state.initial_parent)
            .and_then(|r| r.data.config.group.as_deref());
        match (config.group.as_deref(), initial_group) {
            (Some(group), Some(initial)) if !group.is_empty() && group == initial => {}
            _ => {
                trace!(?target, "transfer rejected: group mismatch");
                return false;
            }
        }
        if node.is_some_and(|n| state.is_dragged(n)) {
            return false;
        }
        if let Some(accepts) = &config.accepts {
            let accepted = accepts(&TransferCheck {
                host: &self.host,
                target_parent: target,
                initial_parent: state.initial_parent,
                current_parent: state.current_parent,
                state,
            });
            if !accepted {
                trace!(?target, "transfer rejected by accepts");
                return false;
            }
        }
        true
    }

    /// Where transferred values land in `target`.
    pub fn transfer_index(
        &self,
        target: H::Element,
        node: Option<H::Element>,
        position: Point,
    ) -> usize {
        let Some(record) = self.registry.parent(target) else {
            return 0;
        };
        let nodes = record.nodes();
        if !record.data.config.sortable {
            return match self.drag_state() {
                Some(state) if state.initial_parent == target => state.initial_index.min(nodes.len()),
                _ => nodes.len(),
            };
        }
        if let Some(index) = node.and_then(|n| self.registry.node(n)).map(|n| n.data.index) {
            return index;
        }
        let centers: Vec<Point> = nodes
            .iter()
            .map(|el| self.host.rect(*el).center())
            .collect();
        nearest_boundary(&centers, position)
    }

    /// Splices the dragged values out of `request.parent` and back in at `request.index`.
    pub fn sort_values(&mut self, request: &SortRequest<H::Element>) -> bool {
        let Some(state) = self.drag_state() else {
            return false;
        };
        let Some(mut values) = state.without_dragged(&self.values(request.parent)) else {
            trace!(parent = ?request.parent, "dragged positions are stale");
            return false;
        };
        let dragged = state.dragged_values();
        let index = request.index.min(values.len());
        let positions: Vec<usize> = (index..index + dragged.len()).collect();
        values.splice(index..index, dragged);
        self.commit_sort(request.parent, values, &positions, request.target_node)
    }

    /// Commits a new order for the drag's container and reports it.
    ///
    /// `positions` holds the new index of each dragged node, in drag order.
    /// Returns `false` without side effects when the order is unchanged.
    pub fn commit_sort(
        &mut self,
        parent: H::Element,
        values: Vec<H::Value>,
        positions: &[usize],
        target_node: Option<H::Element>,
    ) -> bool {
        let Some(state) = self.drag_state() else {
            return false;
        };
        let previous_values = self.values(parent);
        if previous_values == values || positions.len() != state.dragged.len() {
            return false;
        }
        let previous_position = state.primary().index;
        let position = positions[state.primary];
        let previous_nodes = self
            .registry
            .parent(parent)
            .map(|r| r.data.nodes.clone())
            .unwrap_or_default();
        let target_value = target_node
            .and_then(|n| self.registry.node(n))
            .map(|n| n.data.value.clone());

        if let Some(state) = self.drag_state_mut() {
            for (dragged, at) in state.dragged.iter_mut().zip(positions) {
                dragged.index = *at;
            }
        }
        self.commit_values(parent, values.clone());

        let Some(state) = self.drag_state_mut() else {
            return true;
        };
        if position != previous_position {
            state.direction = Some(if position > previous_position {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            });
        }
        state.current_target = target_value;
        let dragged_node = state.primary().element;
        let dragged_nodes = state.dragged_elements();
        let nodes = self
            .registry
            .parent(parent)
            .map(|r| r.data.nodes.clone())
            .unwrap_or_default();

        debug!(?parent, from = previous_position, to = position, "sorted");
        if let Some(on_sort) = self
            .registry
            .parent(parent)
            .and_then(|r| r.data.config.on_sort.clone())
        {
            on_sort(&SortEvent {
                parent,
                previous_values,
                values,
                previous_nodes,
                nodes,
                dragged_node,
                dragged_nodes,
                previous_position,
                position,
                target_node,
            });
        }
        self.emit(parent, &LifecycleEvent::Sorted { parent });
        true
    }

    /// Moves the dragged values from `request.source` into `request.target`.
    pub fn commit_transfer(&mut self, request: &TransferRequest<H::Element>) -> bool {
        let Some(state) = self.drag_state() else {
            return false;
        };
        let dragged_values = state.dragged_values();
        let dragged_nodes = state.dragged_elements();
        let initial_parent = state.initial_parent;
        if request.source != state.current_parent {
            trace!(source = ?request.source, "transfer source is not the drag's container");
            return false;
        }
        let Some(source_values) = state.without_dragged(&self.values(request.source)) else {
            trace!(source = ?request.source, "dragged positions are stale");
            return false;
        };
        let mut target_values = self.values(request.target);
        let target_nodes = match request.target_node {
            Some(node) => vec![node],
            None => self
                .registry
                .parent(request.target)
                .map(|r| r.data.nodes.clone())
                .unwrap_or_default(),
        };
        let index = request.index.min(target_values.len());
        target_values.splice(index..index, dragged_values.iter().cloned());

        if let Some(state) = self.drag_state_mut() {
            state.last_parent = request.source;
            state.current_parent = request.target;
            state.transferred = true;
            state.current_target = None;
            for (offset, dragged) in state.dragged.iter_mut().enumerate() {
                dragged.index = index + offset;
            }
            state.await_remap(request.source);
            state.await_remap(request.target);
        }
        self.commit_values(request.source, source_values);
        self.commit_values(request.target, target_values);

        debug!(source = ?request.source, target = ?request.target, index, "transferred");
        let event = TransferEvent {
            source_parent: request.source,
            target_parent: request.target,
            initial_parent,
            dragged_nodes,
            dragged_values,
            target_index: index,
            target_nodes,
        };
        for parent in [request.target, request.source] {
            if let Some(on_transfer) = self
                .registry
                .parent(parent)
                .and_then(|r| r.data.config.on_transfer.clone())
            {
                on_transfer(&event);
            }
        }
        let lifecycle = LifecycleEvent::Transferred {
            source: request.source,
            target: request.target,
        };
        self.bus.emit(&lifecycle);
        for parent in [request.target, request.source] {
            if let Some(record) = self.registry.parent(parent) {
                record.data.emitter.emit(&lifecycle);
            }
        }
        true
    }
}
