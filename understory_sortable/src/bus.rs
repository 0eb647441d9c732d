// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle event emitters.
//!
//! The engine owns one global [`Emitter`] and one per registered container.
//! Observers subscribe to a [`LifecycleKind`] and receive every matching
//! [`LifecycleEvent`] in subscription order.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_sortable::bus::{Emitter, LifecycleEvent, LifecycleKind};
//!
//! let mut bus = Emitter::<u32>::new();
//! let seen = Rc::new(Cell::new(0));
//! let sub = bus.on(LifecycleKind::Sorted, {
//!     let seen = seen.clone();
//!     move |_| seen.set(seen.get() + 1)
//! });
//!
//! bus.emit(&LifecycleEvent::Sorted { parent: 1 });
//! bus.emit(&LifecycleEvent::RemapFinished { parent: 1 });
//! assert_eq!(seen.get(), 1);
//!
//! bus.off(sub);
//! bus.emit(&LifecycleEvent::Sorted { parent: 1 });
//! assert_eq!(seen.get(), 1);
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

/// Discriminant of a [`LifecycleEvent`], used to subscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleKind {
    /// See [`LifecycleEvent::DragStarted`].
    DragStarted,
    /// See [`LifecycleEvent::DragEnded`].
    DragEnded,
    /// See [`LifecycleEvent::Sorted`].
    Sorted,
    /// See [`LifecycleEvent::Transferred`].
    Transferred,
    /// See [`LifecycleEvent::RemapFinished`].
    RemapFinished,
}

/// Something happened to a container or to the drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent<E> {
    /// A drag started on `node` inside `parent`.
    DragStarted {
        /// Container of the grabbed node.
        parent: E,
        /// The grabbed node.
        node: E,
    },
    /// The drag ended while its nodes lived in `parent`.
    DragEnded {
        /// Container the dragged nodes ended up in.
        parent: E,
        /// `true` if the drag was cancelled.
        cancelled: bool,
    },
    /// `parent` was re-sorted.
    Sorted {
        /// The sorted container.
        parent: E,
    },
    /// Nodes moved from `source` to `target`.
    Transferred {
        /// Container the nodes left.
        source: E,
        /// Container the nodes entered.
        target: E,
    },
    /// `parent` finished a consistent remap.
    RemapFinished {
        /// The remapped container.
        parent: E,
    },
}

impl<E> LifecycleEvent<E> {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> LifecycleKind {
        match self {
            Self::DragStarted { .. } => LifecycleKind::DragStarted,
            Self::DragEnded { .. } => LifecycleKind::DragEnded,
            Self::Sorted { .. } => LifecycleKind::Sorted,
            Self::Transferred { .. } => LifecycleKind::Transferred,
            Self::RemapFinished { .. } => LifecycleKind::RemapFinished,
        }
    }
}

/// Token returned by [`Emitter::on`]; pass it to [`Emitter::off`] to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener<E> = Rc<dyn Fn(&LifecycleEvent<E>)>;

/// A small synchronous event emitter.
pub struct Emitter<E> {
    next: u64,
    listeners: Vec<(Subscription, LifecycleKind, Listener<E>)>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            next: 0,
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<E> Emitter<E> {
    /// Creates an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to events of `kind`.
    pub fn on(
        &mut self,
        kind: LifecycleKind,
        callback: impl Fn(&LifecycleEvent<E>) + 'static,
    ) -> Subscription {
        self.next += 1;
        let sub = Subscription(self.next);
        self.listeners.push((sub, kind, Rc::new(callback)));
        sub
    }

    /// Removes a subscription. Unknown subscriptions are ignored.
    pub fn off(&mut self, subscription: Subscription) {
        self.listeners.retain(|(sub, _, _)| *sub != subscription);
    }

    /// Delivers `event` to every listener subscribed to its kind.
    pub fn emit(&self, event: &LifecycleEvent<E>) {
        let kind = event.kind();
        for (_, k, listener) in &self.listeners {
            if *k == kind {
                listener(event);
            }
        }
    }

    /// Returns `true` if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
