// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container and node records.
//!
//! The registry is an identity-keyed map from elements to runtime data. It holds
//! no ownership over elements: records are created by registration and remap
//! and removed by explicit teardown, never by the element going away.
//!
//! [`Registration`] is the caller-facing builder; [`ParentRecord`] and
//! [`NodeRecord`] are what [`DragEngine::lookup_parent`](crate::DragEngine::lookup_parent)
//! and [`DragEngine::lookup_node`](crate::DragEngine::lookup_node) return.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::bus::Emitter;
use crate::config::ParentConfig;
use crate::handlers::Handlers;
use crate::host::{Host, ListenerHandle};
use crate::plugin::Plugin;
use crate::plugins::insert::InsertRanges;
use crate::selection::Selection;

/// Reads the current values of a container.
pub type ValuesFn<H> = Rc<dyn Fn(&H, <H as Host>::Element) -> Vec<<H as Host>::Value>>;

/// Replaces the values of a container. Hosts are expected to re-render before returning.
pub type SetValuesFn<H> = Rc<dyn Fn(&mut H, <H as Host>::Element, Vec<<H as Host>::Value>)>;

/// Everything needed to register a container.
///
/// ```
/// use kurbo::Rect;
/// use understory_sortable::memory::{Axis, MemoryHost};
/// use understory_sortable::{DragEngine, ParentConfig, Registration};
///
/// let mut host = MemoryHost::new();
/// let list = host.add_container(Rect::new(0.0, 0.0, 100.0, 100.0), Axis::Vertical, 10.0);
/// host.render(list, &[1, 2, 3]);
///
/// let mut engine = DragEngine::new(host);
/// let registration = Registration::new(list)
///     .values(|host: &MemoryHost<i32>, el| host.values(el).to_vec())
///     .set_values(|host: &mut MemoryHost<i32>, el, values| host.render(el, &values))
///     .config(ParentConfig::default().with_group("numbers"));
/// engine.register(registration).unwrap();
/// assert_eq!(engine.lookup_parent(list).unwrap().nodes().len(), 3);
/// ```
pub struct Registration<H: Host> {
    pub(crate) element: H::Element,
    pub(crate) values: Option<ValuesFn<H>>,
    pub(crate) set_values: Option<SetValuesFn<H>>,
    pub(crate) config: ParentConfig<H>,
}

impl<H: Host> Registration<H> {
    /// Starts a registration for `element` with the default configuration.
    pub fn new(element: H::Element) -> Self {
        Self {
            element,
            values: None,
            set_values: None,
            config: ParentConfig::default(),
        }
    }

    /// Sets the value getter.
    #[must_use]
    pub fn values(mut self, values: impl Fn(&H, H::Element) -> Vec<H::Value> + 'static) -> Self {
        self.values = Some(Rc::new(values));
        self
    }

    /// Sets the value setter.
    #[must_use]
    pub fn set_values(
        mut self,
        set_values: impl Fn(&mut H, H::Element, Vec<H::Value>) + 'static,
    ) -> Self {
        self.set_values = Some(Rc::new(set_values));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: ParentConfig<H>) -> Self {
        self.config = config;
        self
    }

    /// The element being registered.
    pub fn element(&self) -> H::Element {
        self.element
    }
}

impl<H: Host> fmt::Debug for Registration<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("element", &self.element)
            .field("values", &self.values.is_some())
            .field("set_values", &self.set_values.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Stable identity of a node record.
///
/// A record keeps its id across remaps for as long as its element stays an
/// enabled child of the same container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub(crate) u64);

impl RecordId {
    /// The raw id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Runtime data of an enabled node.
#[derive(Clone, Debug)]
pub struct NodeData<E, V> {
    /// The container the node belongs to.
    pub parent: E,
    /// Index among the container's enabled nodes.
    pub index: usize,
    /// The value paired with the node.
    pub value: V,
    /// Classes the engine applied to the node.
    pub private_classes: Vec<String>,
    /// Listener sets attached on behalf of this node.
    pub handles: SmallVec<[ListenerHandle; 1]>,
    /// Stable record identity.
    pub id: RecordId,
    /// Geometry cached by the insert plugin.
    pub insert_ranges: Option<InsertRanges>,
}

/// A registered node.
#[derive(Clone, Debug)]
pub struct NodeRecord<E, V> {
    /// The node element.
    pub element: E,
    /// Its runtime data.
    pub data: NodeData<E, V>,
}

/// Runtime data of a registered container.
pub struct ParentData<H: Host> {
    pub(crate) values: ValuesFn<H>,
    pub(crate) set_values: SetValuesFn<H>,
    pub(crate) config: ParentConfig<H>,
    pub(crate) handlers: Handlers<H>,
    pub(crate) nodes: Vec<H::Element>,
    pub(crate) handles: SmallVec<[ListenerHandle; 2]>,
    pub(crate) private_classes: Vec<String>,
    pub(crate) emitter: Emitter<H::Element>,
    pub(crate) plugins: Vec<Box<dyn Plugin<H>>>,
    pub(crate) ancestor: Option<H::Element>,
    pub(crate) selection: Selection<H::Value>,
}

impl<H: Host> ParentData<H> {
    /// The container's configuration.
    #[must_use]
    pub fn config(&self) -> &ParentConfig<H> {
        &self.config
    }

    /// The resolved handler slots.
    #[must_use]
    pub fn handlers(&self) -> &Handlers<H> {
        &self.handlers
    }

    /// The enabled nodes, in order.
    #[must_use]
    pub fn nodes(&self) -> &[H::Element] {
        &self.nodes
    }

    /// Listener sets attached to the container.
    #[must_use]
    pub fn handles(&self) -> &[ListenerHandle] {
        &self.handles
    }

    /// Classes the engine applied to the container.
    #[must_use]
    pub fn private_classes(&self) -> &[String] {
        &self.private_classes
    }

    /// The nearest registered ancestor container, for nested containers.
    #[must_use]
    pub fn ancestor(&self) -> Option<H::Element> {
        self.ancestor
    }

    /// The multi-drag selection.
    #[must_use]
    pub fn selection(&self) -> &Selection<H::Value> {
        &self.selection
    }

    /// The number of instantiated plugins.
    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub(crate) fn values_fn(&self) -> ValuesFn<H> {
        self.values.clone()
    }

    pub(crate) fn set_values_fn(&self) -> SetValuesFn<H> {
        self.set_values.clone()
    }
}

impl<H: Host> fmt::Debug for ParentData<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentData")
            .field("config", &self.config)
            .field("nodes", &self.nodes)
            .field("handles", &self.handles)
            .field("private_classes", &self.private_classes)
            .field("emitter", &self.emitter)
            .field("plugins", &self.plugins.len())
            .field("ancestor", &self.ancestor)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

/// A registered container.
pub struct ParentRecord<H: Host> {
    /// The container element.
    pub element: H::Element,
    /// Its runtime data.
    pub data: ParentData<H>,
}

impl<H: Host> fmt::Debug for ParentRecord<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentRecord")
            .field("element", &self.element)
            .field("data", &self.data)
            .finish()
    }
}

impl<H: Host> ParentRecord<H> {
    /// The enabled nodes, in order.
    #[must_use]
    pub fn nodes(&self) -> &[H::Element] {
        &self.data.nodes
    }

    /// The container's configuration.
    #[must_use]
    pub fn config(&self) -> &ParentConfig<H> {
        &self.data.config
    }
}

pub(crate) struct Registry<H: Host> {
    parents: HashMap<H::Element, ParentRecord<H>>,
    nodes: HashMap<H::Element, NodeRecord<H::Element, H::Value>>,
    next_id: u64,
}

impl<H: Host> Default for Registry<H> {
    fn default() -> Self {
        Self {
            parents: HashMap::new(),
            nodes: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<H: Host> fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("parents", &self.parents.len())
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl<H: Host> Registry<H> {
    pub(crate) fn parent(&self, el: H::Element) -> Option<&ParentRecord<H>> {
        self.parents.get(&el)
    }

    pub(crate) fn parent_mut(&mut self, el: H::Element) -> Option<&mut ParentRecord<H>> {
        self.parents.get_mut(&el)
    }

    pub(crate) fn node(&self, el: H::Element) -> Option<&NodeRecord<H::Element, H::Value>> {
        self.nodes.get(&el)
    }

    pub(crate) fn node_mut(
        &mut self,
        el: H::Element,
    ) -> Option<&mut NodeRecord<H::Element, H::Value>> {
        self.nodes.get_mut(&el)
    }

    pub(crate) fn insert_parent(&mut self, record: ParentRecord<H>) {
        self.parents.insert(record.element, record);
    }

    pub(crate) fn remove_parent(&mut self, el: H::Element) -> Option<ParentRecord<H>> {
        self.parents.remove(&el)
    }

    pub(crate) fn insert_node(&mut self, record: NodeRecord<H::Element, H::Value>) {
        self.nodes.insert(record.element, record);
    }

    pub(crate) fn remove_node(
        &mut self,
        el: H::Element,
    ) -> Option<NodeRecord<H::Element, H::Value>> {
        self.nodes.remove(&el)
    }

    pub(crate) fn next_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId(self.next_id)
    }

    pub(crate) fn parent_elements(&self) -> Vec<H::Element> {
        self.parents.keys().copied().collect()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn parent_count(&self) -> usize {
        self.parents.len()
    }

    /// Returns the values paired with `parent`'s enabled nodes, in order.
    pub(crate) fn node_values(&self, parent: H::Element) -> Vec<H::Value> {
        self.parent(parent)
            .map(|p| {
                p.data
                    .nodes
                    .iter()
                    .filter_map(|el| self.node(*el).map(|n| n.data.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The enabled node at `index` of `parent`, if it still holds `value`.
    pub(crate) fn node_at(
        &self,
        parent: H::Element,
        index: usize,
        value: &H::Value,
    ) -> Option<H::Element> {
        let element = *self.parent(parent)?.data.nodes.get(index)?;
        self.node(element)
            .is_some_and(|n| n.data.value == *value)
            .then_some(element)
    }

    /// Finds the first enabled node of `parent` holding `value`.
    pub(crate) fn node_with_value(
        &self,
        parent: H::Element,
        value: &H::Value,
    ) -> Option<H::Element> {
        let record = self.parent(parent)?;
        record
            .data
            .nodes
            .iter()
            .copied()
            .find(|el| self.node(*el).is_some_and(|n| n.data.value == *value))
    }
}
