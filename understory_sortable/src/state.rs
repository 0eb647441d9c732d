// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag state.
//!
//! A [`DragState`] exists only while a drag is in progress. The engine owns it
//! exclusively; handlers and plugins read it through
//! [`DragEngine::drag_state`](crate::DragEngine::drag_state) and change it only
//! through engine operations such as [`DragEngine::commit_sort`](crate::DragEngine::commit_sort).

use alloc::vec::Vec;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::config::DragClasses;
use crate::gesture::PointerTrack;

/// Interaction phase of the engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing is happening.
    #[default]
    Idle,
    /// A pointer is down on a node; a drag may follow.
    Pressed,
    /// A pointer is down on a node and waiting for the long-press deadline.
    LongPressPending,
    /// A native drag is in progress.
    NativeDragging,
    /// A synthetic (pointer-emulated) drag is in progress.
    SyntheticDragging,
}

impl Phase {
    /// Returns `true` for the dragging phases.
    #[must_use]
    pub fn is_dragging(self) -> bool {
        matches!(self, Self::NativeDragging | Self::SyntheticDragging)
    }
}

/// The side of a target node the dragged node approaches from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Coming from above.
    Above,
    /// Coming from below.
    Below,
    /// Coming from the left.
    Left,
    /// Coming from the right.
    Right,
}

/// Direction of the last sort, relative to the grabbed node's index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// The grabbed node moved to a higher index.
    Ascending,
    /// The grabbed node moved to a lower index.
    Descending,
}

/// How the drag is being driven.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DragMode<E> {
    /// The host's native drag and drop.
    Native,
    /// Pointer-emulated drag with an optional host-created drag image.
    Synthetic {
        /// The floating visual, if the host created one.
        image: Option<E>,
        /// Offset from the image's top-left corner to the pointer.
        offset: Vec2,
    },
}

impl<E> DragMode<E> {
    /// Returns `true` for [`DragMode::Synthetic`].
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }
}

/// One dragged node and its value.
#[derive(Clone, Debug, PartialEq)]
pub struct DraggedNode<E, V> {
    /// The node element. Re-pointed after every remap.
    pub element: E,
    /// The node's value.
    pub value: V,
    /// Position among the current container's values. Re-pointed after every remap.
    pub index: usize,
    /// Position among the initial container's values when the drag started.
    pub initial_index: usize,
}

/// Where the insert plugin will commit on drop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InsertTarget<E> {
    /// The container to insert into.
    pub parent: E,
    /// Boundary index among the container's current values, dragged values included.
    pub index: usize,
}

/// The live state of one drag.
#[derive(Clone, Debug)]
pub struct DragState<E, V> {
    /// Native or synthetic.
    pub mode: DragMode<E>,
    /// Every dragged node, in container order.
    pub dragged: SmallVec<[DraggedNode<E, V>; 1]>,
    /// Index into `dragged` of the node the pointer grabbed.
    pub primary: usize,
    /// The container the drag started in. Never changes.
    pub initial_parent: E,
    /// The grabbed node's index at drag start.
    pub initial_index: usize,
    /// The container the dragged nodes live in now.
    pub current_parent: E,
    /// The container the dragged nodes lived in before the last transfer.
    pub last_parent: E,
    /// The edge of the last sort target the dragged node approached from.
    pub incoming: Option<Edge>,
    /// Direction of the last sort.
    pub direction: Option<SortDirection>,
    /// Where the pointer started and the latest processed position.
    pub pointer: PointerTrack,
    /// Set while a value change awaits its remap; blocks further sorts and transfers.
    pub prevent_enter: bool,
    /// Value of the last sort target, to avoid oscillating over the same node.
    pub current_target: Option<V>,
    /// `true` once the dragged nodes moved to another container.
    pub transferred: bool,
    /// `true` once a drop was processed.
    pub dropped: bool,
    /// Where the insert plugin will commit on drop.
    pub insert_target: Option<InsertTarget<E>>,
    pub(crate) pending_remaps: SmallVec<[E; 2]>,
    pub(crate) snapshots: Vec<(E, Vec<V>)>,
    pub(crate) classes: DragClasses,
    pub(crate) over_seen: bool,
    pub(crate) committing: bool,
}

impl<E: Copy + PartialEq, V: Clone + PartialEq> DragState<E, V> {
    pub(crate) fn new(
        mode: DragMode<E>,
        dragged: SmallVec<[DraggedNode<E, V>; 1]>,
        primary: usize,
        parent: E,
        index: usize,
        position: Point,
        classes: DragClasses,
    ) -> Self {
        Self {
            mode,
            dragged,
            primary,
            initial_parent: parent,
            initial_index: index,
            current_parent: parent,
            last_parent: parent,
            incoming: None,
            direction: None,
            pointer: PointerTrack::new(position),
            prevent_enter: false,
            current_target: None,
            transferred: false,
            dropped: false,
            insert_target: None,
            pending_remaps: SmallVec::new(),
            snapshots: Vec::new(),
            classes,
            over_seen: false,
            committing: false,
        }
    }

    /// The node the pointer grabbed.
    #[must_use]
    pub fn primary(&self) -> &DraggedNode<E, V> {
        &self.dragged[self.primary]
    }

    /// Returns `true` if `element` is one of the dragged nodes.
    #[must_use]
    pub fn is_dragged(&self, element: E) -> bool {
        self.dragged.iter().any(|d| d.element == element)
    }

    /// The dragged elements, in container order.
    #[must_use]
    pub fn dragged_elements(&self) -> Vec<E> {
        self.dragged.iter().map(|d| d.element).collect()
    }

    /// The dragged values, in container order.
    #[must_use]
    pub fn dragged_values(&self) -> Vec<V> {
        self.dragged.iter().map(|d| d.value.clone()).collect()
    }

    /// Removes the dragged entries from `values` by position.
    ///
    /// Returns `None` if a recorded position no longer holds its value, which
    /// means `values` is not the current container's.
    #[must_use]
    pub fn without_dragged(&self, values: &[V]) -> Option<Vec<V>> {
        if self.dragged.iter().any(|d| values.get(d.index) != Some(&d.value)) {
            return None;
        }
        let kept = values
            .iter()
            .enumerate()
            .filter(|(at, _)| !self.dragged.iter().any(|d| d.index == *at))
            .map(|(_, v)| v.clone())
            .collect();
        Some(kept)
    }

    /// Returns `true` if the pre-drag values of `parent` were recorded.
    pub(crate) fn has_snapshot(&self, parent: E) -> bool {
        self.snapshots.iter().any(|(p, _)| *p == parent)
    }

    /// Records the values of `parent` before its first change in this drag.
    pub(crate) fn snapshot(&mut self, parent: E, values: Vec<V>) {
        if !self.has_snapshot(parent) {
            self.snapshots.push((parent, values));
        }
    }

    /// The class marking dragged nodes in the current phase.
    pub(crate) fn phase_class(&self) -> Option<&str> {
        match self.mode {
            DragMode::Native if self.over_seen => self.classes.drop_zone.as_deref(),
            DragMode::Native => self.classes.dragging.as_deref(),
            DragMode::Synthetic { .. } => self.classes.synth_drop_zone.as_deref(),
        }
    }

    /// Marks `parent` as awaiting a remap and blocks sorting until it arrives.
    pub(crate) fn await_remap(&mut self, parent: E) {
        if !self.pending_remaps.contains(&parent) {
            self.pending_remaps.push(parent);
        }
        self.prevent_enter = true;
    }

    /// Records a completed remap of `parent`.
    pub(crate) fn remap_done(&mut self, parent: E) {
        self.pending_remaps.retain(|p| *p != parent);
        if self.pending_remaps.is_empty() {
            self.prevent_enter = false;
        }
    }
}
