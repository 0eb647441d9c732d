// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container configuration and engine-wide options.
//!
//! A [`ParentConfig`] is what callers hand to [`Registration::config`](crate::Registration::config).
//! Everything has a default; builder-style `with_*` methods cover the common
//! knobs, and the fields are public for the rest.
//!
//! ```
//! use understory_sortable::memory::MemoryHost;
//! use understory_sortable::{ParentConfig, Threshold};
//!
//! let config = ParentConfig::<MemoryHost<u32>>::default()
//!     .with_group("board")
//!     .with_threshold(Threshold::new(0.0, 0.5))
//!     .with_native_drag(false);
//! assert_eq!(config.group.as_deref(), Some("board"));
//! assert!(config.sortable);
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::handlers::HandlerOverrides;
use crate::host::Host;
use crate::payload::{DragEndEvent, DragStartEvent, SortEvent, TransferEvent};
use crate::plugin::PluginFactory;
use crate::state::DragState;

/// Predicate over a single element, given read access to the host.
pub type ElementPredicate<H> = Rc<dyn Fn(&H, <H as Host>::Element) -> bool>;

/// A container-level callback.
pub type Callback<T> = Rc<dyn Fn(&T)>;

/// Arguments for an [`ParentConfig::accepts`] predicate.
#[derive(Debug)]
pub struct TransferCheck<'a, H: Host> {
    /// The host, for geometry or class lookups.
    pub host: &'a H,
    /// The container the dragged nodes would move into.
    pub target_parent: H::Element,
    /// The container the drag started in.
    pub initial_parent: H::Element,
    /// The container the dragged nodes currently live in.
    pub current_parent: H::Element,
    /// The live drag state.
    pub state: &'a DragState<H::Element, H::Value>,
}

/// Gate deciding whether a container accepts incoming nodes.
pub type Accepts<H> = Rc<dyn Fn(&TransferCheck<'_, H>) -> bool>;

/// How far the pointer must travel into a target before a sort happens.
///
/// Both values are fractions of the target's size along the respective axis.
/// `0.0` sorts as soon as the pointer enters the target; `0.5` waits for the
/// pointer to cross its midpoint.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Threshold {
    /// Fraction of the target's width.
    pub horizontal: f64,
    /// Fraction of the target's height.
    pub vertical: f64,
}

impl Threshold {
    /// Creates a threshold from horizontal and vertical fractions.
    #[must_use]
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Auto-scroll behavior while dragging.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollBehavior {
    /// Size of the horizontal edge zones, as a fraction of the viewport width.
    pub x: f64,
    /// Size of the vertical edge zones, as a fraction of the viewport height.
    pub y: f64,
    /// Keep scrolling when the pointer leaves the container.
    pub scroll_outside: bool,
    /// Distance scrolled per frame.
    pub speed: f64,
}

impl Default for ScrollBehavior {
    fn default() -> Self {
        Self {
            x: 0.1,
            y: 0.1,
            scroll_outside: false,
            speed: 10.0,
        }
    }
}

/// Class names applied by the engine during each interaction phase.
///
/// `None` leaves that phase unstyled. The engine only ever removes classes it
/// applied itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragClasses {
    /// Applied to native-dragged nodes when the drag starts.
    pub dragging: Option<String>,
    /// Applied to native-dragged nodes once the drag is under way.
    pub drop_zone: Option<String>,
    /// Applied to synthetic-dragged nodes left behind as placeholders.
    pub synth_drop_zone: Option<String>,
    /// Applied to a node while a long press is pending.
    pub long_press: Option<String>,
    /// Applied to selected nodes in multi-drag containers.
    pub selected: Option<String>,
}

/// Resolved options for one container.
pub struct ParentConfig<H: Host> {
    /// Allow reordering within the container.
    pub sortable: bool,
    /// Disable every drag interaction on this container.
    pub disabled: bool,
    /// Use the host's native drag events for mouse pointers.
    pub native_drag: bool,
    /// Drag every selected node together.
    pub multi_drag: bool,
    /// Require a long press before a synthetic drag starts.
    pub long_press: bool,
    /// Long-press duration in milliseconds.
    pub long_press_duration: u64,
    /// Which children are draggable. Defaults to all of them.
    pub draggable: Option<ElementPredicate<H>>,
    /// Which elements act as drag handles. When set, drags must start inside one.
    pub drag_handle: Option<ElementPredicate<H>>,
    /// Extra gate for incoming transfers, checked after group matching.
    pub accepts: Option<Accepts<H>>,
    /// Sort thresholds.
    pub threshold: Threshold,
    /// Auto-scroll behavior.
    pub scroll_behavior: ScrollBehavior,
    /// Class names per phase.
    pub classes: DragClasses,
    /// Transfer group. Containers only exchange nodes within the same group.
    pub group: Option<String>,
    /// Plugins, instantiated per container in this order.
    pub plugins: Vec<PluginFactory<H>>,
    /// Handler slots that override both defaults and plugins.
    pub handlers: HandlerOverrides<H>,
    /// Fired when a drag starts in this container.
    pub on_dragstart: Option<Callback<DragStartEvent<H::Element, H::Value>>>,
    /// Fired when a drag that currently lives in this container ends.
    pub on_dragend: Option<Callback<DragEndEvent<H::Element, H::Value>>>,
    /// Fired after this container is re-sorted.
    pub on_sort: Option<Callback<SortEvent<H::Element, H::Value>>>,
    /// Fired when nodes move into or out of this container.
    pub on_transfer: Option<Callback<TransferEvent<H::Element, H::Value>>>,
}

impl<H: Host> Default for ParentConfig<H> {
    fn default() -> Self {
        Self {
            sortable: true,
            disabled: false,
            native_drag: true,
            multi_drag: false,
            long_press: false,
            long_press_duration: 1000,
            draggable: None,
            drag_handle: None,
            accepts: None,
            threshold: Threshold::default(),
            scroll_behavior: ScrollBehavior::default(),
            classes: DragClasses::default(),
            group: None,
            plugins: Vec::new(),
            handlers: HandlerOverrides::default(),
            on_dragstart: None,
            on_dragend: None,
            on_sort: None,
            on_transfer: None,
        }
    }
}

impl<H: Host> Clone for ParentConfig<H> {
    fn clone(&self) -> Self {
        Self {
            sortable: self.sortable,
            disabled: self.disabled,
            native_drag: self.native_drag,
            multi_drag: self.multi_drag,
            long_press: self.long_press,
            long_press_duration: self.long_press_duration,
            draggable: self.draggable.clone(),
            drag_handle: self.drag_handle.clone(),
            accepts: self.accepts.clone(),
            threshold: self.threshold,
            scroll_behavior: self.scroll_behavior,
            classes: self.classes.clone(),
            group: self.group.clone(),
            plugins: self.plugins.clone(),
            handlers: self.handlers.clone(),
            on_dragstart: self.on_dragstart.clone(),
            on_dragend: self.on_dragend.clone(),
            on_sort: self.on_sort.clone(),
            on_transfer: self.on_transfer.clone(),
        }
    }
}

impl<H: Host> fmt::Debug for ParentConfig<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentConfig")
            .field("sortable", &self.sortable)
            .field("disabled", &self.disabled)
            .field("native_drag", &self.native_drag)
            .field("multi_drag", &self.multi_drag)
            .field("long_press", &self.long_press)
            .field("long_press_duration", &self.long_press_duration)
            .field("threshold", &self.threshold)
            .field("scroll_behavior", &self.scroll_behavior)
            .field("classes", &self.classes)
            .field("group", &self.group)
            .field("plugins", &self.plugins.len())
            .finish_non_exhaustive()
    }
}

impl<H: Host> ParentConfig<H> {
    /// Sets the transfer group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Enables or disables sorting.
    #[must_use]
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Enables or disables the container.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Chooses native drag events (`true`) or synthetic pointer drag (`false`) for mice.
    #[must_use]
    pub fn with_native_drag(mut self, native_drag: bool) -> Self {
        self.native_drag = native_drag;
        self
    }

    /// Enables multi-drag of selected nodes.
    #[must_use]
    pub fn with_multi_drag(mut self, multi_drag: bool) -> Self {
        self.multi_drag = multi_drag;
        self
    }

    /// Requires a long press of `duration` milliseconds before synthetic drags start.
    #[must_use]
    pub fn with_long_press(mut self, duration: u64) -> Self {
        self.long_press = true;
        self.long_press_duration = duration;
        self
    }

    /// Sets the sort threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the auto-scroll behavior.
    #[must_use]
    pub fn with_scroll_behavior(mut self, scroll_behavior: ScrollBehavior) -> Self {
        self.scroll_behavior = scroll_behavior;
        self
    }

    /// Sets the class names.
    #[must_use]
    pub fn with_classes(mut self, classes: DragClasses) -> Self {
        self.classes = classes;
        self
    }

    /// Restricts which children are draggable.
    #[must_use]
    pub fn with_draggable(mut self, draggable: impl Fn(&H, H::Element) -> bool + 'static) -> Self {
        self.draggable = Some(Rc::new(draggable));
        self
    }

    /// Requires drags to start inside an element matching `is_handle`.
    #[must_use]
    pub fn with_drag_handle(
        mut self,
        is_handle: impl Fn(&H, H::Element) -> bool + 'static,
    ) -> Self {
        self.drag_handle = Some(Rc::new(is_handle));
        self
    }

    /// Adds an extra gate for incoming transfers.
    #[must_use]
    pub fn with_accepts(
        mut self,
        accepts: impl Fn(&TransferCheck<'_, H>) -> bool + 'static,
    ) -> Self {
        self.accepts = Some(Rc::new(accepts));
        self
    }

    /// Appends a plugin.
    #[must_use]
    pub fn with_plugin(mut self, plugin: PluginFactory<H>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Sets the drag-start callback.
    #[must_use]
    pub fn on_dragstart(
        mut self,
        callback: impl Fn(&DragStartEvent<H::Element, H::Value>) + 'static,
    ) -> Self {
        self.on_dragstart = Some(Rc::new(callback));
        self
    }

    /// Sets the drag-end callback.
    #[must_use]
    pub fn on_dragend(
        mut self,
        callback: impl Fn(&DragEndEvent<H::Element, H::Value>) + 'static,
    ) -> Self {
        self.on_dragend = Some(Rc::new(callback));
        self
    }

    /// Sets the sort callback.
    #[must_use]
    pub fn on_sort(mut self, callback: impl Fn(&SortEvent<H::Element, H::Value>) + 'static) -> Self {
        self.on_sort = Some(Rc::new(callback));
        self
    }

    /// Sets the transfer callback.
    #[must_use]
    pub fn on_transfer(
        mut self,
        callback: impl Fn(&TransferEvent<H::Element, H::Value>) + 'static,
    ) -> Self {
        self.on_transfer = Some(Rc::new(callback));
        self
    }
}

/// Options shared by every container of one engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Minimum time between two processed move samples, in milliseconds.
    pub frame_interval: u64,
    /// How far the pointer may wander before a pending long press is abandoned.
    pub press_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_interval: 16,
            press_tolerance: 5.0,
        }
    }
}
