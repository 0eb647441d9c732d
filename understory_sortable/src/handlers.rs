// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overridable behavior slots.
//!
//! Every container resolves one [`Handlers`] set at registration:
//!
//! 1. the defaults in this module,
//! 2. then each plugin's [`setup`](crate::plugin::Plugin::setup), in order
//!    (last writer wins),
//! 3. then the caller's [`HandlerOverrides`] from the configuration.
//!
//! All six slots are always populated, so the event pipeline never checks for
//! a missing handler. Each slot is a trait with a blanket implementation for
//! closures of the matching shape:
//!
//! ```
//! use std::rc::Rc;
//! use understory_sortable::handlers::{HandlerOverrides, SortRequest};
//! use understory_sortable::memory::MemoryHost;
//! use understory_sortable::{DragEngine, ParentConfig};
//!
//! type Host = MemoryHost<&'static str>;
//!
//! let mut config = ParentConfig::<Host>::default();
//! config.handlers = HandlerOverrides::default().with_perform_sort(
//!     |engine: &mut DragEngine<Host>, request: &SortRequest<_>| {
//!         // Only ever move to the front.
//!         let front = SortRequest { index: 0, ..*request };
//!         engine.sort_values(&front);
//!     },
//! );
//! assert!(config.handlers.perform_sort.is_some());
//! ```
//!
//! A replacement can wrap whatever it replaced by cloning the previous slot in
//! [`Plugin::setup`](crate::plugin::Plugin::setup) and delegating to it.

use alloc::rc::Rc;
use core::fmt;

use kurbo::Point;

use crate::engine::DragEngine;
use crate::host::Host;

/// The pointer is over a registered node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeOver<E> {
    /// The node's container.
    pub parent: E,
    /// The node under the pointer.
    pub node: E,
    /// Pointer position.
    pub position: Point,
}

/// The pointer is over a registered container but not over one of its nodes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParentOver<E> {
    /// The container under the pointer.
    pub parent: E,
    /// Pointer position.
    pub position: Point,
}

/// A drop landed on a registered, enabled container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropEvent<E> {
    /// The container under the pointer.
    pub parent: E,
    /// The node under the pointer, if any.
    pub node: Option<E>,
    /// Pointer position.
    pub position: Point,
}

/// The drag is ending.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EndEvent<E> {
    /// The container the dragged nodes live in.
    pub parent: E,
    /// `true` if the drag was cancelled.
    pub cancelled: bool,
    /// `true` if touched containers should get their pre-drag values back.
    pub restore: bool,
}

/// Move the dragged values within their container.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SortRequest<E> {
    /// The container being sorted.
    pub parent: E,
    /// The node that triggered the sort, if any.
    pub target_node: Option<E>,
    /// Insertion index among the values that are not being dragged.
    pub index: usize,
}

/// Move the dragged values into another container.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest<E> {
    /// The container the values leave.
    pub source: E,
    /// The container the values enter.
    pub target: E,
    /// The node that triggered the transfer, if any.
    pub target_node: Option<E>,
    /// Insertion index in the target.
    pub index: usize,
}

/// Performs a validated sort.
pub trait SortStrategy<H: Host> {
    /// Reorders `request.parent`.
    fn perform_sort(&self, engine: &mut DragEngine<H>, request: &SortRequest<H::Element>);
}

/// Performs a validated transfer.
pub trait TransferStrategy<H: Host> {
    /// Moves the dragged values from `request.source` into `request.target`.
    fn perform_transfer(&self, engine: &mut DragEngine<H>, request: &TransferRequest<H::Element>);
}

/// Reacts to the pointer moving over a node.
pub trait NodeOverHandler<H: Host> {
    /// Handles one processed move sample over a node.
    fn handle_node_over(&self, engine: &mut DragEngine<H>, over: &NodeOver<H::Element>);
}

/// Reacts to the pointer moving over a container.
pub trait ParentOverHandler<H: Host> {
    /// Handles one processed move sample over a container.
    fn handle_parent_over(&self, engine: &mut DragEngine<H>, over: &ParentOver<H::Element>);
}

/// Reacts to a drop.
pub trait DropHandler<H: Host> {
    /// Handles the drop.
    fn handle_drop(&self, engine: &mut DragEngine<H>, event: &DropEvent<H::Element>);
}

/// Finishes a drag.
pub trait EndHandler<H: Host> {
    /// Handles the end of the drag. Implementations must eventually call
    /// [`DragEngine::finish_drag`], usually by delegating to the previous handler.
    fn handle_end(&self, engine: &mut DragEngine<H>, event: &EndEvent<H::Element>);
}

impl<H: Host, F> SortStrategy<H> for F
where
    F: Fn(&mut DragEngine<H>, &SortRequest<H::Element>),
{
    fn perform_sort(&self, engine: &mut DragEngine<H>, request: &SortRequest<H::Element>) {
        self(engine, request);
    }
}

impl<H: Host, F> TransferStrategy<H> for F
where
    F: Fn(&mut DragEngine<H>, &TransferRequest<H::Element>),
{
    fn perform_transfer(&self, engine: &mut DragEngine<H>, request: &TransferRequest<H::Element>) {
        self(engine, request);
    }
}

impl<H: Host, F> NodeOverHandler<H> for F
where
    F: Fn(&mut DragEngine<H>, &NodeOver<H::Element>),
{
    fn handle_node_over(&self, engine: &mut DragEngine<H>, over: &NodeOver<H::Element>) {
        self(engine, over);
    }
}

impl<H: Host, F> ParentOverHandler<H> for F
where
    F: Fn(&mut DragEngine<H>, &ParentOver<H::Element>),
{
    fn handle_parent_over(&self, engine: &mut DragEngine<H>, over: &ParentOver<H::Element>) {
        self(engine, over);
    }
}

impl<H: Host, F> DropHandler<H> for F
where
    F: Fn(&mut DragEngine<H>, &DropEvent<H::Element>),
{
    fn handle_drop(&self, engine: &mut DragEngine<H>, event: &DropEvent<H::Element>) {
        self(engine, event);
    }
}

impl<H: Host, F> EndHandler<H> for F
where
    F: Fn(&mut DragEngine<H>, &EndEvent<H::Element>),
{
    fn handle_end(&self, engine: &mut DragEngine<H>, event: &EndEvent<H::Element>) {
        self(engine, event);
    }
}

/// Default sort: splice the dragged values out and back in at the requested index.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultSort;

impl<H: Host> SortStrategy<H> for DefaultSort {
    fn perform_sort(&self, engine: &mut DragEngine<H>, request: &SortRequest<H::Element>) {
        engine.sort_values(request);
    }
}

/// Default transfer: remove from the source and insert into the target.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultTransfer;

impl<H: Host> TransferStrategy<H> for DefaultTransfer {
    fn perform_transfer(&self, engine: &mut DragEngine<H>, request: &TransferRequest<H::Element>) {
        engine.commit_transfer(request);
    }
}

/// Default node-over: sort within the current container, transfer into another.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultNodeOver;

impl<H: Host> NodeOverHandler<H> for DefaultNodeOver {
    fn handle_node_over(&self, engine: &mut DragEngine<H>, over: &NodeOver<H::Element>) {
        let Some(current) = engine.drag_state().map(|s| s.current_parent) else {
            return;
        };
        if over.parent == current {
            if engine.validate_sort(over) {
                let index = engine
                    .lookup_node(over.node)
                    .map_or(0, |node| node.data.index);
                engine.perform_sort(&SortRequest {
                    parent: over.parent,
                    target_node: Some(over.node),
                    index,
                });
            }
        } else if engine.validate_transfer(over.parent, Some(over.node)) {
            let index = engine.transfer_index(over.parent, Some(over.node), over.position);
            engine.perform_transfer(&TransferRequest {
                source: current,
                target: over.parent,
                target_node: Some(over.node),
                index,
            });
        }
    }
}

/// Default container-over: transfer into a different container.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultParentOver;

impl<H: Host> ParentOverHandler<H> for DefaultParentOver {
    fn handle_parent_over(&self, engine: &mut DragEngine<H>, over: &ParentOver<H::Element>) {
        let Some(current) = engine.drag_state().map(|s| s.current_parent) else {
            return;
        };
        if over.parent == current || !engine.validate_transfer(over.parent, None) {
            return;
        }
        let index = engine.transfer_index(over.parent, None, over.position);
        engine.perform_transfer(&TransferRequest {
            source: current,
            target: over.parent,
            target_node: None,
            index,
        });
    }
}

/// Default drop: nothing to do, the order is already committed.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultDrop;

impl<H: Host> DropHandler<H> for DefaultDrop {
    fn handle_drop(&self, _engine: &mut DragEngine<H>, _event: &DropEvent<H::Element>) {}
}

/// Default end: strip drag classes, clear the state, fire drag-end callbacks.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultEnd;

impl<H: Host> EndHandler<H> for DefaultEnd {
    fn handle_end(&self, engine: &mut DragEngine<H>, event: &EndEvent<H::Element>) {
        engine.finish_drag(event);
    }
}

/// The resolved behavior slots of one container.
pub struct Handlers<H: Host> {
    /// Sort strategy.
    pub perform_sort: Rc<dyn SortStrategy<H>>,
    /// Transfer strategy.
    pub perform_transfer: Rc<dyn TransferStrategy<H>>,
    /// Node-over handler.
    pub handle_node_over: Rc<dyn NodeOverHandler<H>>,
    /// Container-over handler.
    pub handle_parent_over: Rc<dyn ParentOverHandler<H>>,
    /// Drop handler.
    pub handle_drop: Rc<dyn DropHandler<H>>,
    /// End handler.
    pub handle_end: Rc<dyn EndHandler<H>>,
}

impl<H: Host> Default for Handlers<H> {
    fn default() -> Self {
        Self {
            perform_sort: Rc::new(DefaultSort),
            perform_transfer: Rc::new(DefaultTransfer),
            handle_node_over: Rc::new(DefaultNodeOver),
            handle_parent_over: Rc::new(DefaultParentOver),
            handle_drop: Rc::new(DefaultDrop),
            handle_end: Rc::new(DefaultEnd),
        }
    }
}

impl<H: Host> Clone for Handlers<H> {
    fn clone(&self) -> Self {
        Self {
            perform_sort: self.perform_sort.clone(),
            perform_transfer: self.perform_transfer.clone(),
            handle_node_over: self.handle_node_over.clone(),
            handle_parent_over: self.handle_parent_over.clone(),
            handle_drop: self.handle_drop.clone(),
            handle_end: self.handle_end.clone(),
        }
    }
}

impl<H: Host> fmt::Debug for Handlers<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers").finish_non_exhaustive()
    }
}

/// Caller-supplied replacements, applied after plugins.
pub struct HandlerOverrides<H: Host> {
    /// Replaces [`Handlers::perform_sort`].
    pub perform_sort: Option<Rc<dyn SortStrategy<H>>>,
    /// Replaces [`Handlers::perform_transfer`].
    pub perform_transfer: Option<Rc<dyn TransferStrategy<H>>>,
    /// Replaces [`Handlers::handle_node_over`].
    pub handle_node_over: Option<Rc<dyn NodeOverHandler<H>>>,
    /// Replaces [`Handlers::handle_parent_over`].
    pub handle_parent_over: Option<Rc<dyn ParentOverHandler<H>>>,
    /// Replaces [`Handlers::handle_drop`].
    pub handle_drop: Option<Rc<dyn DropHandler<H>>>,
    /// Replaces [`Handlers::handle_end`].
    pub handle_end: Option<Rc<dyn EndHandler<H>>>,
}

impl<H: Host> Default for HandlerOverrides<H> {
    fn default() -> Self {
        Self {
            perform_sort: None,
            perform_transfer: None,
            handle_node_over: None,
            handle_parent_over: None,
            handle_drop: None,
            handle_end: None,
        }
    }
}

impl<H: Host> Clone for HandlerOverrides<H> {
    fn clone(&self) -> Self {
        Self {
            perform_sort: self.perform_sort.clone(),
            perform_transfer: self.perform_transfer.clone(),
            handle_node_over: self.handle_node_over.clone(),
            handle_parent_over: self.handle_parent_over.clone(),
            handle_drop: self.handle_drop.clone(),
            handle_end: self.handle_end.clone(),
        }
    }
}

impl<H: Host> fmt::Debug for HandlerOverrides<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOverrides")
            .field("perform_sort", &self.perform_sort.is_some())
            .field("perform_transfer", &self.perform_transfer.is_some())
            .field("handle_node_over", &self.handle_node_over.is_some())
            .field("handle_parent_over", &self.handle_parent_over.is_some())
            .field("handle_drop", &self.handle_drop.is_some())
            .field("handle_end", &self.handle_end.is_some())
            .finish()
    }
}

impl<H: Host> HandlerOverrides<H> {
    /// Overrides the sort strategy.
    #[must_use]
    pub fn with_perform_sort(mut self, strategy: impl SortStrategy<H> + 'static) -> Self {
        self.perform_sort = Some(Rc::new(strategy));
        self
    }

    /// Overrides the transfer strategy.
    #[must_use]
    pub fn with_perform_transfer(mut self, strategy: impl TransferStrategy<H> + 'static) -> Self {
        self.perform_transfer = Some(Rc::new(strategy));
        self
    }

    /// Overrides the node-over handler.
    #[must_use]
    pub fn with_node_over(mut self, handler: impl NodeOverHandler<H> + 'static) -> Self {
        self.handle_node_over = Some(Rc::new(handler));
        self
    }

    /// Overrides the container-over handler.
    #[must_use]
    pub fn with_parent_over(mut self, handler: impl ParentOverHandler<H> + 'static) -> Self {
        self.handle_parent_over = Some(Rc::new(handler));
        self
    }

    /// Overrides the drop handler.
    #[must_use]
    pub fn with_drop(mut self, handler: impl DropHandler<H> + 'static) -> Self {
        self.handle_drop = Some(Rc::new(handler));
        self
    }

    /// Overrides the end handler.
    #[must_use]
    pub fn with_end(mut self, handler: impl EndHandler<H> + 'static) -> Self {
        self.handle_end = Some(Rc::new(handler));
        self
    }

    /// Writes every present override into `handlers`.
    pub fn apply(&self, handlers: &mut Handlers<H>) {
        if let Some(h) = &self.perform_sort {
            handlers.perform_sort = h.clone();
        }
        if let Some(h) = &self.perform_transfer {
            handlers.perform_transfer = h.clone();
        }
        if let Some(h) = &self.handle_node_over {
            handlers.handle_node_over = h.clone();
        }
        if let Some(h) = &self.handle_parent_over {
            handlers.handle_parent_over = h.clone();
        }
        if let Some(h) = &self.handle_drop {
            handlers.handle_drop = h.clone();
        }
        if let Some(h) = &self.handle_end {
            handlers.handle_end = h.clone();
        }
    }
}
