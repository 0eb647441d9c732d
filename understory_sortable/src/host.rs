// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element host: everything the engine needs to know about the element tree.
//!
//! The engine never owns elements. It refers to them by a small copyable handle
//! ([`Host::Element`]) and asks the host for structure (children, parents),
//! geometry (bounding rectangles, hit testing, scroll metrics) and a handful of
//! side effects (classes, listeners, drag images, insertion indicators).
//!
//! A browser binding implements this on top of the DOM; [`MemoryHost`](crate::memory::MemoryHost)
//! is an in-memory implementation used by tests and headless consumers.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::{Point, Rect, Vec2};

/// Opaque handle for a set of listeners the host attached on behalf of the engine.
///
/// Handles are minted by [`Host::attach`] and handed back through [`Host::detach`]
/// exactly once, when the record that owns them is torn down.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// The kind of listener set the engine asks the host to attach.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenerRole {
    /// Drag and pointer listeners on a container.
    Parent,
    /// Child-list mutation observation on a container.
    Mutations,
    /// Drag and pointer listeners on a draggable node.
    Node,
}

/// Scroll geometry of a scrollable element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// The visible region of the element, in the same space as [`Host::rect`].
    pub viewport: Rect,
    /// Current scroll offset.
    pub offset: Vec2,
    /// Maximum scroll offset along each axis.
    pub max_offset: Vec2,
}

impl ScrollMetrics {
    /// Returns `true` if the element can scroll by `delta` without clamping to zero movement.
    #[must_use]
    pub fn can_scroll(&self, delta: Vec2) -> bool {
        (delta.x < 0.0 && self.offset.x > 0.0)
            || (delta.x > 0.0 && self.offset.x < self.max_offset.x)
            || (delta.y < 0.0 && self.offset.y > 0.0)
            || (delta.y > 0.0 && self.offset.y < self.max_offset.y)
    }
}

/// The element tree the engine operates on.
///
/// Only the structural and geometric queries are required; every side effect has
/// a no-op default so minimal hosts stay small.
pub trait Host: 'static {
    /// Element identity. Must be cheap to copy and stable for the element's lifetime.
    type Element: Copy + Eq + Hash + Debug + 'static;
    /// The caller's value type, one per enabled node. Equal values may repeat.
    type Value: Clone + PartialEq + Debug + 'static;

    /// Returns the children of `parent` in document order.
    fn children(&self, parent: Self::Element) -> Vec<Self::Element>;

    /// Returns the parent of `element`, if it has one.
    fn parent_of(&self, element: Self::Element) -> Option<Self::Element>;

    /// Returns `true` while `element` is attached to the tree.
    fn is_connected(&self, element: Self::Element) -> bool;

    /// Returns the bounding rectangle of `element`.
    fn rect(&self, element: Self::Element) -> Rect;

    /// Returns the topmost element under `point`, ignoring drag images.
    fn element_at(&self, point: Point) -> Option<Self::Element>;

    /// Adds a class to `element`.
    fn add_class(&mut self, element: Self::Element, class: &str) {
        let _ = (element, class);
    }

    /// Removes a class from `element`.
    fn remove_class(&mut self, element: Self::Element, class: &str) {
        let _ = (element, class);
    }

    /// Attaches a listener set to `element` and returns a handle for later removal.
    fn attach(&mut self, element: Self::Element, role: ListenerRole) -> ListenerHandle {
        let _ = (element, role);
        ListenerHandle(0)
    }

    /// Removes a listener set previously returned from [`Host::attach`].
    fn detach(&mut self, handle: ListenerHandle) {
        let _ = handle;
    }

    /// Returns scroll metrics if `element` is a scroll container.
    fn scroll_metrics(&self, element: Self::Element) -> Option<ScrollMetrics> {
        let _ = element;
        None
    }

    /// Scrolls `element` by `delta`, clamping to its scroll range.
    fn scroll_by(&mut self, element: Self::Element, delta: Vec2) {
        let _ = (element, delta);
    }

    /// Creates a floating visual that represents `sources` during a synthetic drag.
    ///
    /// `bounds` is the union of the source rectangles. Returning `None` runs the
    /// drag without a visual.
    fn create_drag_image(
        &mut self,
        sources: &[Self::Element],
        bounds: Rect,
    ) -> Option<Self::Element> {
        let _ = (sources, bounds);
        None
    }

    /// Moves the drag image so its top-left corner sits at `origin`.
    fn move_drag_image(&mut self, image: Self::Element, origin: Point) {
        let _ = (image, origin);
    }

    /// Removes a drag image created by [`Host::create_drag_image`].
    fn remove_drag_image(&mut self, image: Self::Element) {
        let _ = image;
    }

    /// Shows (`Some`) or hides (`None`) the insertion indicator of `parent`.
    fn set_insert_indicator(&mut self, parent: Self::Element, indicator: Option<Rect>) {
        let _ = (parent, indicator);
    }

    /// Animates `element` from `from` to its current position `to`.
    fn animate(&mut self, element: Self::Element, from: Rect, to: Rect, duration: u64) {
        let _ = (element, from, to, duration);
    }
}

/// Returns `true` if `element` is `ancestor` or one of its descendants.
pub(crate) fn is_within<H: Host>(host: &H, element: H::Element, ancestor: H::Element) -> bool {
    let mut cursor = Some(element);
    while let Some(el) = cursor {
        if el == ancestor {
            return true;
        }
        cursor = host.parent_of(el);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_scroll_respects_bounds() {
        let metrics = ScrollMetrics {
            viewport: Rect::new(0.0, 0.0, 100.0, 100.0),
            offset: Vec2::new(0.0, 50.0),
            max_offset: Vec2::new(0.0, 200.0),
        };
        assert!(metrics.can_scroll(Vec2::new(0.0, 4.0)));
        assert!(metrics.can_scroll(Vec2::new(0.0, -4.0)));
        assert!(!metrics.can_scroll(Vec2::new(4.0, 0.0)));
        assert!(!metrics.can_scroll(Vec2::new(-4.0, 0.0)));
    }
}
