// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input events and target normalization.
//!
//! Hosts forward two independent channels to [`DragEngine::handle_event`](crate::DragEngine::handle_event):
//!
//! - native drag events ([`NativeDragEvent`]), mirroring `dragstart`,
//!   `dragenter`, `dragover`, `drop` and `dragend`;
//! - pointer events ([`PointerEvent`]), mirroring `pointerdown`, `pointermove`,
//!   `pointerup` and `pointercancel`, used for synthetic drags.
//!
//! Keyboard input is limited to [`Key::Escape`], which cancels the active drag.
//!
//! Every event carries the raw target element as reported by the host. The
//! engine resolves it to a [`Target`] by walking up the tree to the first
//! registered node or container; events over uninstrumented elements resolve to
//! nothing and are ignored.

use bitflags::bitflags;
use kurbo::Point;

use crate::host::Host;
use crate::registry::Registry;

bitflags! {
    /// Keyboard modifiers held during a pointer event.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Control key.
        const CTRL = 1 << 0;
        /// Shift key.
        const SHIFT = 1 << 1;
        /// Meta (command / windows) key.
        const META = 1 << 2;
        /// Alt / option key.
        const ALT = 1 << 3;
    }
}

/// Native drag event kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeDragKind {
    /// A native drag started on the target.
    DragStart,
    /// The drag entered the target.
    DragEnter,
    /// The drag moved over the target.
    DragOver,
    /// The drag was released over the target.
    Drop,
    /// The drag finished, successfully or not.
    DragEnd,
}

/// A native drag event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NativeDragEvent<E> {
    /// What happened.
    pub kind: NativeDragKind,
    /// The raw event target.
    pub target: E,
    /// Pointer position.
    pub position: Point,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl<E> NativeDragEvent<E> {
    /// Creates a native drag event.
    pub fn new(kind: NativeDragKind, target: E, position: Point, time: u64) -> Self {
        Self {
            kind,
            target,
            position,
            time,
        }
    }
}

/// Pointer event kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A button or contact went down.
    Down,
    /// The pointer moved.
    Move,
    /// The button or contact was released.
    Up,
    /// The platform cancelled the pointer stream.
    Cancel,
}

/// The device behind a pointer event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PointerType {
    /// A mouse. Uses native drag when the container allows it.
    #[default]
    Mouse,
    /// A touch contact. Always uses synthetic drag.
    Touch,
    /// A pen. Always uses synthetic drag.
    Pen,
}

/// A pointer event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent<E> {
    /// What happened.
    pub kind: PointerKind,
    /// The raw event target.
    pub target: E,
    /// Pointer position.
    pub position: Point,
    /// Input device.
    pub pointer_type: PointerType,
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// Timestamp in milliseconds.
    pub time: u64,
}

impl<E> PointerEvent<E> {
    /// Creates a mouse event without modifiers.
    pub fn new(kind: PointerKind, target: E, position: Point, time: u64) -> Self {
        Self {
            kind,
            target,
            position,
            pointer_type: PointerType::Mouse,
            modifiers: Modifiers::empty(),
            time,
        }
    }

    /// Sets the pointer type.
    #[must_use]
    pub fn with_pointer_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }

    /// Sets the modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the engine reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Cancels the active drag or pending press.
    Escape,
    /// Any other key.
    Other,
}

/// A key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Timestamp in milliseconds.
    pub time: u64,
}

/// Any input the engine understands.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputEvent<E> {
    /// A native drag event.
    Native(NativeDragEvent<E>),
    /// A pointer event.
    Pointer(PointerEvent<E>),
    /// A key press.
    Key(KeyEvent),
}

impl<E> InputEvent<E> {
    /// The event's timestamp.
    #[must_use]
    pub fn time(&self) -> u64 {
        match self {
            Self::Native(ev) => ev.time,
            Self::Pointer(ev) => ev.time,
            Self::Key(ev) => ev.time,
        }
    }
}

impl<E> From<NativeDragEvent<E>> for InputEvent<E> {
    fn from(ev: NativeDragEvent<E>) -> Self {
        Self::Native(ev)
    }
}

impl<E> From<PointerEvent<E>> for InputEvent<E> {
    fn from(ev: PointerEvent<E>) -> Self {
        Self::Pointer(ev)
    }
}

impl<E> From<KeyEvent> for InputEvent<E> {
    fn from(ev: KeyEvent) -> Self {
        Self::Key(ev)
    }
}

/// Whether the engine acted on an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventResult {
    /// The event did not concern the engine.
    Ignored,
    /// The engine handled the event; hosts may suppress default behavior.
    Consumed,
}

impl EventResult {
    /// Returns `true` for [`EventResult::Consumed`].
    #[must_use]
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// A raw target resolved against the registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target<E> {
    /// The registered node under the pointer, if any.
    pub node: Option<E>,
    /// The registered container under the pointer (the node's container when `node` is set).
    pub parent: E,
}

/// Walks up from `raw` to the first registered node or container.
pub(crate) fn resolve_target<H: Host>(
    host: &H,
    registry: &Registry<H>,
    raw: H::Element,
) -> Option<Target<H::Element>> {
    let mut cursor = Some(raw);
    while let Some(el) = cursor {
        if let Some(node) = registry.node(el) {
            return Some(Target {
                node: Some(el),
                parent: node.data.parent,
            });
        }
        if registry.parent(el).is_some() {
            return Some(Target {
                node: None,
                parent: el,
            });
        }
        cursor = host.parent_of(el);
    }
    None
}
