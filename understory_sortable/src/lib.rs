// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_sortable --heading-base-level=0

//! Understory Sortable: a headless drag-to-sort and drag-to-transfer engine.
//!
//! This crate keeps a list of values and the elements that render them in
//! step while the user drags those elements around. It does not render
//! anything and does not own the element tree: a [`Host`] answers structural
//! and geometric questions (children, parents, rectangles, hit tests) and
//! performs the few side effects the engine needs (classes, drag images,
//! scrolling). Values live wherever the caller keeps them; each registered
//! container supplies a getter and a setter.
//!
//! The pieces:
//!
//! - **Registry**: [`DragEngine::register`] records a container together with
//!   its [`ParentConfig`]. Its enabled children are paired with its values by
//!   position and kept up to date by [`DragEngine::remap`].
//! - **Event state machine**: [`DragEngine::handle_event`] consumes native
//!   drag events, pointer events and keys, and moves through the
//!   [`Phase`](state::Phase)s. Pointer-emulated ("synthetic") drags cover touch
//!   input and hosts without native drag and drop. [`DragEngine::tick`] drives
//!   long presses, throttled moves and auto-scroll.
//! - **Decisions**: while dragging, hovering a node of the same container
//!   re-sorts it once the pointer crosses the configured [`Threshold`];
//!   hovering another container of the same group transfers the dragged values
//!   into it.
//! - **Handlers and plugins**: every decision goes through a
//!   [handler slot](handlers) that plugins and callers can replace. The
//!   [built-in plugins](plugins) swap instead of shift, insert on drop, or
//!   animate moved nodes.
//! - **Lifecycle bus**: [`DragEngine::on`] and [`DragEngine::on_parent`]
//!   subscribe to [`LifecycleEvent`]s.
//!
//! [`memory::MemoryHost`] is a small in-memory host for tests and headless use.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_sortable::event::{NativeDragEvent, NativeDragKind, PointerEvent, PointerKind};
//! use understory_sortable::memory::{Axis, MemoryHost};
//! use understory_sortable::DragEngine;
//!
//! let mut host = MemoryHost::new();
//! let list = host.add_container(Rect::new(0.0, 0.0, 100.0, 100.0), Axis::Vertical, 10.0);
//! host.render(list, &["a", "b", "c"]);
//! let a = host.element_for(&"a").unwrap();
//! let c = host.element_for(&"c").unwrap();
//!
//! let mut engine = DragEngine::new(host);
//! engine.register(MemoryHost::registration(list)).unwrap();
//!
//! // Grab `a` and drag it over `c`.
//! let grab = Point::new(5.0, 5.0);
//! let over = Point::new(5.0, 25.0);
//! engine.handle_event(PointerEvent::new(PointerKind::Down, a, grab, 0));
//! engine.handle_event(NativeDragEvent::new(NativeDragKind::DragStart, a, grab, 1));
//! engine.handle_event(NativeDragEvent::new(NativeDragKind::DragOver, c, over, 20));
//! engine.handle_event(NativeDragEvent::new(NativeDragKind::Drop, c, over, 30));
//! engine.handle_event(NativeDragEvent::new(NativeDragKind::DragEnd, a, over, 31));
//!
//! assert_eq!(engine.values(list), ["b", "c", "a"]);
//! assert!(!engine.is_dragging());
//! ```
//!
//! ## Transfers
//!
//! Containers exchange values only when both the container the drag started
//! in and the hovered container carry the same non-empty group, and the
//! hovered container's `accepts` gate (if any) agrees:
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_sortable::event::{PointerEvent, PointerKind};
//! use understory_sortable::memory::{Axis, MemoryHost};
//! use understory_sortable::{DragEngine, ParentConfig};
//!
//! let mut host = MemoryHost::new();
//! let left = host.add_container(Rect::new(0.0, 0.0, 100.0, 100.0), Axis::Vertical, 10.0);
//! let right = host.add_container(Rect::new(200.0, 0.0, 300.0, 100.0), Axis::Vertical, 10.0);
//! host.render(left, &["x", "y"]);
//! host.render(right, &["z"]);
//! let x = host.element_for(&"x").unwrap();
//!
//! let mut engine = DragEngine::new(host);
//! for list in [left, right] {
//!     let config = ParentConfig::default().with_group("letters").with_native_drag(false);
//!     engine.register(MemoryHost::registration(list).config(config)).unwrap();
//! }
//!
//! // Pointer-driven drag of `x` onto `z`.
//! engine.handle_event(PointerEvent::new(PointerKind::Down, x, Point::new(5.0, 5.0), 0));
//! engine.handle_event(PointerEvent::new(PointerKind::Move, x, Point::new(205.0, 5.0), 20));
//! engine.handle_event(PointerEvent::new(PointerKind::Up, x, Point::new(205.0, 5.0), 40));
//!
//! assert_eq!(engine.values(left), ["y"]);
//! assert_eq!(engine.values(right), ["x", "z"]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to `kurbo/std` and `tracing/std`.
//! - `libm`: use `libm` for Kurbo's float math in `no_std` builds.
//!
//! This crate is `no_std` compatible (with `alloc`).

#![no_std]

extern crate alloc;

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod gesture;
pub mod handlers;
pub mod host;
pub mod memory;
pub mod payload;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod selection;
pub mod state;

mod decision;
mod engine;
mod remap;
mod scroll;

pub use bus::{LifecycleEvent, LifecycleKind, Subscription};
pub use config::{DragClasses, EngineConfig, ParentConfig, ScrollBehavior, Threshold, TransferCheck};
pub use engine::DragEngine;
pub use error::RegisterError;
pub use event::{EventResult, InputEvent};
pub use host::{Host, ListenerHandle, ListenerRole, ScrollMetrics};
pub use registry::{NodeRecord, ParentRecord, RecordId, Registration};
pub use selection::Selection;
pub use state::{DragState, Phase};
