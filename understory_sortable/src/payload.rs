// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Payloads handed to container callbacks.

use alloc::vec::Vec;

use kurbo::{Point, Vec2};

/// A drag started. Fired on the container the drag started in.
#[derive(Clone, Debug, PartialEq)]
pub struct DragStartEvent<E, V> {
    /// The container the drag started in.
    pub parent: E,
    /// The container's values at drag start.
    pub values: Vec<V>,
    /// The node the pointer grabbed.
    pub dragged_node: E,
    /// Every dragged node, in container order.
    pub dragged_nodes: Vec<E>,
    /// Pointer position at drag start.
    pub position: Point,
    /// `true` for pointer-emulated drags.
    pub synthetic: bool,
}

/// A drag ended. Fired on the container the dragged nodes ended up in.
#[derive(Clone, Debug, PartialEq)]
pub struct DragEndEvent<E, V> {
    /// The container the dragged nodes live in now.
    pub parent: E,
    /// The container the drag started in.
    pub initial_parent: E,
    /// The container's values after the drag.
    pub values: Vec<V>,
    /// The grabbed node, if it is still attached.
    pub dragged_node: Option<E>,
    /// Every dragged node that is still attached.
    pub dragged_nodes: Vec<E>,
    /// Pointer movement from the drag start to the last processed position.
    pub offset: Vec2,
    /// `true` if the drag was cancelled rather than dropped.
    pub cancelled: bool,
}

/// A container was re-sorted.
#[derive(Clone, Debug, PartialEq)]
pub struct SortEvent<E, V> {
    /// The sorted container.
    pub parent: E,
    /// Values before the sort.
    pub previous_values: Vec<V>,
    /// Values after the sort.
    pub values: Vec<V>,
    /// Enabled nodes before the sort.
    pub previous_nodes: Vec<E>,
    /// Enabled nodes after the sort.
    pub nodes: Vec<E>,
    /// The grabbed node.
    pub dragged_node: E,
    /// Every dragged node.
    pub dragged_nodes: Vec<E>,
    /// Index of the grabbed node before the sort.
    pub previous_position: usize,
    /// Index of the grabbed node after the sort.
    pub position: usize,
    /// The node the pointer was over, if any.
    pub target_node: Option<E>,
}

/// Nodes moved between containers. Fired on both the target and the source.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferEvent<E, V> {
    /// The container the nodes left.
    pub source_parent: E,
    /// The container the nodes entered.
    pub target_parent: E,
    /// The container the drag started in.
    pub initial_parent: E,
    /// The dragged nodes as they were in the source.
    pub dragged_nodes: Vec<E>,
    /// The values that moved.
    pub dragged_values: Vec<V>,
    /// Where the values were inserted in the target.
    pub target_index: usize,
    /// The target node under the pointer, or every target node when dropped on the container.
    pub target_nodes: Vec<E>,
}
