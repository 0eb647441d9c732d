// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Host`] with a tiny stacking layout.
//!
//! [`MemoryHost`] models just enough of an element tree to drive the engine
//! without a browser:
//!
//! - Containers have fixed bounds and lay their children out back to back along
//!   one [`Axis`], each child taking `extent` units.
//! - [`MemoryHost::render`] performs a keyed re-render: item elements are reused
//!   by value, one element per rendered value. An element its container dropped
//!   is adopted by the next container that renders its value.
//! - Any element can be made scrollable; scroll offsets shift descendants.
//! - Classes, listener handles, drag images, insertion indicators and animation
//!   requests are recorded so tests can assert on them.
//!
//! ```
//! use kurbo::Rect;
//! use understory_sortable::memory::{Axis, MemoryHost};
//! use understory_sortable::Host;
//!
//! let mut host = MemoryHost::new();
//! let list = host.add_container(Rect::new(0.0, 0.0, 100.0, 300.0), Axis::Vertical, 10.0);
//! host.render(list, &["a", "b"]);
//!
//! let children = host.children(list);
//! assert_eq!(children.len(), 2);
//! assert_eq!(host.rect(children[1]), Rect::new(0.0, 10.0, 100.0, 20.0));
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Rect, Vec2};

use crate::host::{Host, ListenerHandle, ListenerRole, ScrollMetrics};
use crate::registry::Registration;

/// Handle of an element in a [`MemoryHost`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

/// Layout direction of a container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Axis {
    /// Children stack top to bottom.
    #[default]
    Vertical,
    /// Children stack left to right.
    Horizontal,
}

#[derive(Clone, Debug)]
enum Kind<V> {
    Container {
        bounds: Rect,
        axis: Axis,
        extent: f64,
        values: Vec<V>,
    },
    Item,
    Plain,
    DragImage {
        rect: Rect,
    },
}

#[derive(Clone, Debug)]
struct Node<V> {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    connected: bool,
    scroll: Option<(Vec2, Vec2)>,
    kind: Kind<V>,
}

impl<V> Node<V> {
    fn new(parent: Option<ElementId>, kind: Kind<V>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            classes: Vec::new(),
            connected: true,
            scroll: None,
            kind,
        }
    }
}

/// In-memory element tree implementing [`Host`].
#[derive(Clone, Debug)]
pub struct MemoryHost<V> {
    nodes: Vec<Node<V>>,
    keyed: Vec<(V, ElementId)>,
    next_listener: u64,
    listeners: Vec<(ListenerHandle, ElementId, ListenerRole)>,
    indicators: Vec<(ElementId, Rect)>,
    animations: Vec<(ElementId, Rect, Rect)>,
}

impl<V> Default for MemoryHost<V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            keyed: Vec::new(),
            next_listener: 1,
            listeners: Vec::new(),
            indicators: Vec::new(),
            animations: Vec::new(),
        }
    }
}

impl<V> MemoryHost<V>
where
    V: Clone + PartialEq + Debug + 'static,
{
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node<V>) -> ElementId {
        let id = ElementId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        if let Some(parent) = node.parent {
            self.nodes[parent.0 as usize].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    fn node(&self, el: ElementId) -> &Node<V> {
        &self.nodes[el.0 as usize]
    }

    fn node_mut(&mut self, el: ElementId) -> &mut Node<V> {
        &mut self.nodes[el.0 as usize]
    }

    /// Adds a top-level container.
    pub fn add_container(&mut self, bounds: Rect, axis: Axis, extent: f64) -> ElementId {
        self.push(Node::new(
            None,
            Kind::Container {
                bounds,
                axis,
                extent,
                values: Vec::new(),
            },
        ))
    }

    /// Adds a container nested inside `ancestor` (for example a scroll area).
    ///
    /// `bounds` are expressed in unscrolled coordinates.
    pub fn add_container_in(
        &mut self,
        ancestor: ElementId,
        bounds: Rect,
        axis: Axis,
        extent: f64,
    ) -> ElementId {
        self.push(Node::new(
            Some(ancestor),
            Kind::Container {
                bounds,
                axis,
                extent,
                values: Vec::new(),
            },
        ))
    }

    /// Adds a child that is not backed by a value (a header, a handle, a spacer).
    ///
    /// Inside a container the child takes a layout slot like any item; inside an
    /// item it covers the item's rectangle.
    pub fn add_plain_child(&mut self, parent: ElementId) -> ElementId {
        self.push(Node::new(Some(parent), Kind::Plain))
    }

    /// Makes `el` scrollable up to `max_offset`.
    pub fn set_scrollable(&mut self, el: ElementId, max_offset: Vec2) {
        self.node_mut(el).scroll = Some((Vec2::ZERO, max_offset));
    }

    /// Returns the current scroll offset of `el`.
    #[must_use]
    pub fn scroll_offset(&self, el: ElementId) -> Vec2 {
        self.node(el).scroll.map_or(Vec2::ZERO, |(offset, _)| offset)
    }

    /// Returns the values last rendered into `container`.
    #[must_use]
    pub fn values(&self, container: ElementId) -> &[V] {
        match &self.node(container).kind {
            Kind::Container { values, .. } => values,
            _ => &[],
        }
    }

    /// Returns the item element that renders `value`, if one was ever created.
    #[must_use]
    pub fn element_for(&self, value: &V) -> Option<ElementId> {
        self.keyed
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, el)| *el)
    }

    /// Re-renders `container` with `values`, reusing each value's element.
    ///
    /// Equal values get one element each. An element already in `container`
    /// is preferred over a detached one; elements shown by other containers are
    /// left alone.
    pub fn render(&mut self, container: ElementId, values: &[V]) {
        let mut items: Vec<ElementId> = Vec::with_capacity(values.len());
        for value in values {
            let rank = |el: ElementId| match self.node(el).parent {
                Some(parent) if parent == container => Some(0),
                None => Some(1),
                Some(_) => None,
            };
            let reused = self
                .keyed
                .iter()
                .filter(|(v, el)| v == value && !items.contains(el))
                .filter_map(|(_, el)| Some((rank(*el)?, *el)))
                .min_by_key(|(rank, _)| *rank)
                .map(|(_, el)| el);
            let el = match reused {
                Some(el) => el,
                None => {
                    let el = self.push(Node::new(None, Kind::Item));
                    self.keyed.push((value.clone(), el));
                    el
                }
            };
            if let Some(previous) = self.node(el).parent
                && previous != container
            {
                self.node_mut(previous).children.retain(|c| *c != el);
            }
            let node = self.node_mut(el);
            node.parent = Some(container);
            node.connected = true;
            items.push(el);
        }

        let old = core::mem::take(&mut self.node_mut(container).children);
        let mut children = Vec::with_capacity(old.len().max(items.len()));
        for child in old {
            if matches!(self.node(child).kind, Kind::Item) {
                if !items.contains(&child) {
                    let node = self.node_mut(child);
                    node.parent = None;
                    node.connected = false;
                }
            } else {
                children.push(child);
            }
        }
        children.extend(items);

        let node = self.node_mut(container);
        node.children = children;
        if let Kind::Container { values: stored, .. } = &mut node.kind {
            stored.clear();
            stored.extend_from_slice(values);
        }
    }

    /// Detaches `el` (and therefore its subtree) from the tree.
    pub fn remove(&mut self, el: ElementId) {
        if let Some(parent) = self.node(el).parent {
            self.node_mut(parent).children.retain(|c| *c != el);
        }
        let node = self.node_mut(el);
        node.parent = None;
        node.connected = false;
    }

    /// Returns the classes currently applied to `el`.
    #[must_use]
    pub fn classes(&self, el: ElementId) -> &[String] {
        &self.node(el).classes
    }

    /// Returns `true` if `el` carries `class`.
    #[must_use]
    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.node(el).classes.iter().any(|c| c == class)
    }

    /// Returns the number of listener sets attached to `el`.
    #[must_use]
    pub fn listener_count(&self, el: ElementId) -> usize {
        self.listeners.iter().filter(|(_, e, _)| *e == el).count()
    }

    /// Returns the total number of attached listener sets.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Returns the insertion indicator currently shown for `parent`.
    #[must_use]
    pub fn indicator(&self, parent: ElementId) -> Option<Rect> {
        self.indicators
            .iter()
            .find(|(p, _)| *p == parent)
            .map(|(_, r)| *r)
    }

    /// Returns every animation request received so far.
    #[must_use]
    pub fn animations(&self) -> &[(ElementId, Rect, Rect)] {
        &self.animations
    }

    /// Returns the live drag images.
    pub fn drag_images(&self) -> impl Iterator<Item = (ElementId, Rect)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, node)| {
            match (&node.kind, node.connected) {
                (Kind::DragImage { rect }, true) => {
                    Some((ElementId(u32::try_from(i).unwrap_or(u32::MAX)), *rect))
                }
                _ => None,
            }
        })
    }

    /// Returns a [`Registration`] wired to this host's [`values`](Self::values)
    /// and [`render`](Self::render).
    pub fn registration(container: ElementId) -> Registration<Self> {
        Registration::new(container)
            .values(|host: &Self, parent| host.values(parent).to_vec())
            .set_values(|host: &mut Self, parent, values| host.render(parent, &values))
    }

    fn scroll_shift(&self, el: ElementId) -> Vec2 {
        let mut shift = Vec2::ZERO;
        let mut cursor = self.node(el).parent;
        while let Some(ancestor) = cursor {
            let node = self.node(ancestor);
            if let Some((offset, _)) = node.scroll {
                shift += offset;
            }
            cursor = node.parent;
        }
        shift
    }

    fn local_rect(&self, el: ElementId) -> Rect {
        let node = self.node(el);
        match &node.kind {
            Kind::Container { bounds, .. } => *bounds,
            Kind::DragImage { rect } => *rect,
            Kind::Item | Kind::Plain => {
                let Some(parent) = node.parent else {
                    return Rect::ZERO;
                };
                match &self.node(parent).kind {
                    Kind::Container {
                        bounds,
                        axis,
                        extent,
                        ..
                    } => {
                        let slot = self
                            .node(parent)
                            .children
                            .iter()
                            .position(|c| *c == el)
                            .unwrap_or(0);
                        let start = slot as f64 * extent;
                        match axis {
                            Axis::Vertical => Rect::new(
                                bounds.x0,
                                bounds.y0 + start,
                                bounds.x1,
                                bounds.y0 + start + extent,
                            ),
                            Axis::Horizontal => Rect::new(
                                bounds.x0 + start,
                                bounds.y0,
                                bounds.x0 + start + extent,
                                bounds.y1,
                            ),
                        }
                    }
                    _ => self.local_rect(parent),
                }
            }
        }
    }

    fn depth(&self, el: ElementId) -> usize {
        let mut depth = 0;
        let mut cursor = self.node(el).parent;
        while let Some(p) = cursor {
            depth += 1;
            cursor = self.node(p).parent;
        }
        depth
    }
}

impl<V> Host for MemoryHost<V>
where
    V: Clone + PartialEq + Debug + 'static,
{
    type Element = ElementId;
    type Value = V;

    fn children(&self, parent: ElementId) -> Vec<ElementId> {
        self.node(parent).children.clone()
    }

    fn parent_of(&self, element: ElementId) -> Option<ElementId> {
        self.node(element).parent
    }

    fn is_connected(&self, element: ElementId) -> bool {
        let mut cursor = Some(element);
        while let Some(el) = cursor {
            let node = self.node(el);
            if !node.connected {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    fn rect(&self, element: ElementId) -> Rect {
        self.local_rect(element) - self.scroll_shift(element)
    }

    fn element_at(&self, point: Point) -> Option<ElementId> {
        let mut best: Option<(usize, ElementId)> = None;
        for i in 0..self.nodes.len() {
            let el = ElementId(u32::try_from(i).unwrap_or(u32::MAX));
            if matches!(self.node(el).kind, Kind::DragImage { .. }) || !self.is_connected(el) {
                continue;
            }
            if !self.rect(el).contains(point) {
                continue;
            }
            let depth = self.depth(el);
            if best.is_none_or(|(d, _)| depth >= d) {
                best = Some((depth, el));
            }
        }
        best.map(|(_, el)| el)
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        let classes = &mut self.node_mut(element).classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        self.node_mut(element).classes.retain(|c| c != class);
    }

    fn attach(&mut self, element: ElementId, role: ListenerRole) -> ListenerHandle {
        let handle = ListenerHandle(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((handle, element, role));
        handle
    }

    fn detach(&mut self, handle: ListenerHandle) {
        self.listeners.retain(|(h, _, _)| *h != handle);
    }

    fn scroll_metrics(&self, element: ElementId) -> Option<ScrollMetrics> {
        let (offset, max_offset) = self.node(element).scroll?;
        Some(ScrollMetrics {
            viewport: self.rect(element),
            offset,
            max_offset,
        })
    }

    fn scroll_by(&mut self, element: ElementId, delta: Vec2) {
        if let Some((offset, max)) = &mut self.node_mut(element).scroll {
            offset.x = (offset.x + delta.x).clamp(0.0, max.x);
            offset.y = (offset.y + delta.y).clamp(0.0, max.y);
        }
    }

    fn create_drag_image(&mut self, sources: &[ElementId], bounds: Rect) -> Option<ElementId> {
        let _ = sources;
        Some(self.push(Node::new(None, Kind::DragImage { rect: bounds })))
    }

    fn move_drag_image(&mut self, image: ElementId, origin: Point) {
        if let Kind::DragImage { rect } = &mut self.node_mut(image).kind {
            *rect = rect.with_origin(origin);
        }
    }

    fn remove_drag_image(&mut self, image: ElementId) {
        self.node_mut(image).connected = false;
    }

    fn set_insert_indicator(&mut self, parent: ElementId, indicator: Option<Rect>) {
        self.indicators.retain(|(p, _)| *p != parent);
        if let Some(rect) = indicator {
            self.indicators.push((parent, rect));
        }
    }

    fn animate(&mut self, element: ElementId, from: Rect, to: Rect, duration: u64) {
        let _ = duration;
        self.animations.push((element, from, to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> (MemoryHost<&'static str>, ElementId) {
        let mut host = MemoryHost::new();
        let list = host.add_container(Rect::new(0.0, 0.0, 100.0, 100.0), Axis::Vertical, 10.0);
        host.render(list, &["a", "b", "c"]);
        (host, list)
    }

    #[test]
    fn render_reuses_elements_by_value() {
        let (mut host, list) = list();
        let before = host.children(list);
        host.render(list, &["c", "a", "b"]);
        let after = host.children(list);
        assert_eq!(after, [before[2], before[0], before[1]]);
    }

    #[test]
    fn equal_values_get_their_own_elements() {
        let (mut host, list) = list();
        let other = host.add_container(Rect::new(200.0, 0.0, 300.0, 100.0), Axis::Vertical, 10.0);
        host.render(other, &["a"]);
        let theirs = host.children(other);
        assert_ne!(theirs[0], host.element_for(&"a").unwrap());

        host.render(list, &["a", "b", "a"]);
        let ours = host.children(list);
        assert_eq!(ours.len(), 3);
        assert_ne!(ours[0], ours[2]);
        assert!(!ours.contains(&theirs[0]));
        assert_eq!(host.children(other), theirs);

        // A dropped element is adopted by the next container rendering its value.
        host.render(list, &["b", "a"]);
        host.render(other, &["a", "a"]);
        assert!(host.children(other).contains(&ours[2]));
    }

    #[test]
    fn render_disconnects_dropped_items() {
        let (mut host, list) = list();
        let c = host.element_for(&"c").unwrap();
        host.render(list, &["a", "b"]);
        assert!(!host.is_connected(c));
        assert_eq!(host.children(list).len(), 2);
    }

    #[test]
    fn element_at_prefers_deepest() {
        let (host, list) = list();
        let b = host.element_for(&"b").unwrap();
        assert_eq!(host.element_at(Point::new(5.0, 15.0)), Some(b));
        assert_eq!(host.element_at(Point::new(5.0, 95.0)), Some(list));
        assert_eq!(host.element_at(Point::new(500.0, 5.0)), None);
    }

    #[test]
    fn scrolling_shifts_descendants() {
        let mut host = MemoryHost::new();
        let scroller = host.add_container(Rect::new(0.0, 0.0, 100.0, 50.0), Axis::Vertical, 10.0);
        host.set_scrollable(scroller, Vec2::new(0.0, 100.0));
        let list = host.add_container_in(
            scroller,
            Rect::new(0.0, 0.0, 100.0, 150.0),
            Axis::Vertical,
            10.0,
        );
        host.render(list, &[1, 2, 3]);
        host.scroll_by(scroller, Vec2::new(0.0, 500.0));
        assert_eq!(host.scroll_offset(scroller), Vec2::new(0.0, 100.0));
        let first = host.element_for(&1).unwrap();
        assert_eq!(host.rect(first), Rect::new(0.0, -100.0, 100.0, -90.0));
    }
}
