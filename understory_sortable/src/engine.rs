// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag engine: registration, the event state machine and drag lifecycle.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use kurbo::{Point, Rect};
use smallvec::{SmallVec, smallvec};
use tracing::{debug, trace};

use crate::bus::{Emitter, LifecycleEvent, LifecycleKind, Subscription};
use crate::config::{EngineConfig, ParentConfig};
use crate::error::RegisterError;
use crate::event::{
    EventResult, InputEvent, Key, KeyEvent, Modifiers, NativeDragEvent, NativeDragKind,
    PointerEvent, PointerKind, PointerType, Target, resolve_target,
};
use crate::gesture::{LongPress, MoveThrottle};
use crate::handlers::{
    DropEvent, EndEvent, Handlers, NodeOver, ParentOver, SortRequest, TransferRequest,
};
use crate::host::{Host, ListenerRole, is_within};
use crate::payload::{DragEndEvent, DragStartEvent};
use crate::plugin::{HookContext, Plugin, SetupContext};
use crate::registry::{NodeRecord, ParentData, ParentRecord, Registration, Registry};
use crate::scroll::ScrollAssist;
use crate::selection::Selection;
use crate::state::{DragMode, DragState, DraggedNode, InsertTarget, Phase};

/// A pointer press that may turn into a drag or a click.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Press<E> {
    pub(crate) node: E,
    pub(crate) parent: E,
    /// The raw element the pointer went down on.
    pub(crate) origin: E,
    pub(crate) position: Point,
    pub(crate) synthetic: bool,
}

#[derive(Clone, Debug)]
pub(crate) enum Interaction<E, V> {
    Idle,
    Pressed(Press<E>),
    LongPressPending(Press<E>, LongPress),
    Dragging(DragState<E, V>),
}

/// A move sample waiting for the throttle. `target: None` means hit-test the position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct OverSample<E> {
    pub(crate) target: Option<E>,
    pub(crate) position: Point,
}

/// Headless drag-to-sort and drag-to-transfer engine.
///
/// The engine owns the [`Host`], the registry of containers and nodes, and the
/// single drag state. Hosts forward input through [`DragEngine::handle_event`]
/// and call [`DragEngine::tick`] once per frame for long presses, throttled
/// moves and auto-scroll.
pub struct DragEngine<H: Host> {
    pub(crate) host: H,
    pub(crate) config: EngineConfig,
    pub(crate) registry: Registry<H>,
    pub(crate) interaction: Interaction<H::Element, H::Value>,
    pub(crate) bus: Emitter<H::Element>,
    pub(crate) throttle: MoveThrottle<OverSample<H::Element>>,
    pub(crate) scroll: ScrollAssist<H::Element>,
    pub(crate) now: u64,
}

impl<H: Host> fmt::Debug for DragEngine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEngine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("phase", &self.phase())
            .field("bus", &self.bus)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl<H: Host> DragEngine<H> {
    /// Creates an engine with the default [`EngineConfig`].
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    /// Creates an engine with `config`.
    pub fn with_config(host: H, config: EngineConfig) -> Self {
        Self {
            host,
            config,
            registry: Registry::default(),
            interaction: Interaction::Idle,
            bus: Emitter::new(),
            throttle: MoveThrottle::new(config.frame_interval),
            scroll: ScrollAssist::default(),
            now: 0,
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    ///
    /// Structural changes made through this reference are not observed until
    /// [`DragEngine::notify_mutation`] is called.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the engine and returns the host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Engine-wide options.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest time seen, from events or [`DragEngine::tick`].
    pub fn now(&self) -> u64 {
        self.now
    }

    /// The current interaction phase.
    pub fn phase(&self) -> Phase {
        match &self.interaction {
            Interaction::Idle => Phase::Idle,
            Interaction::Pressed(_) => Phase::Pressed,
            Interaction::LongPressPending(..) => Phase::LongPressPending,
            Interaction::Dragging(state) if state.mode.is_synthetic() => Phase::SyntheticDragging,
            Interaction::Dragging(_) => Phase::NativeDragging,
        }
    }

    /// The live drag state, if a drag is in progress.
    pub fn drag_state(&self) -> Option<&DragState<H::Element, H::Value>> {
        match &self.interaction {
            Interaction::Dragging(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn drag_state_mut(&mut self) -> Option<&mut DragState<H::Element, H::Value>> {
        match &mut self.interaction {
            Interaction::Dragging(state) => Some(state),
            _ => None,
        }
    }

    /// Returns `true` while a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging(_))
    }

    // --- registry ---

    /// Registers a container, replacing any previous registration of the same element.
    ///
    /// Registration resolves the handler slots (defaults, then plugins, then the
    /// caller's overrides), attaches container listeners, links the nearest
    /// registered ancestor and runs the first remap.
    pub fn register(&mut self, registration: Registration<H>) -> Result<(), RegisterError<H::Element>> {
        let Registration {
            element,
            values,
            set_values,
            config,
        } = registration;
        let values = values.ok_or(RegisterError::MissingValues(element))?;
        let set_values = set_values.ok_or(RegisterError::MissingSetValues(element))?;
        if !self.host.is_connected(element) {
            return Err(RegisterError::Disconnected(element));
        }

        let (emitter, selection) = match self.tear_down_parent(element) {
            Some(previous) => (previous.emitter, previous.selection),
            None => (Emitter::new(), Selection::new()),
        };

        let mut handlers = Handlers::default();
        let mut plugins: Vec<Box<dyn Plugin<H>>> =
            config.plugins.iter().map(|factory| factory(element)).collect();
        for plugin in &mut plugins {
            plugin.setup(&mut SetupContext {
                parent: element,
                host: &mut self.host,
                config: &config,
                handlers: &mut handlers,
            });
        }
        config.handlers.apply(&mut handlers);

        let handles = smallvec![
            self.host.attach(element, ListenerRole::Parent),
            self.host.attach(element, ListenerRole::Mutations),
        ];
        self.registry.insert_parent(ParentRecord {
            element,
            data: ParentData {
                values,
                set_values,
                config,
                handlers,
                nodes: Vec::new(),
                handles,
                private_classes: Vec::new(),
                emitter,
                plugins,
                ancestor: None,
                selection,
            },
        });
        self.relink_ancestors();
        debug!(?element, "registered container");
        self.remap(element);
        Ok(())
    }

    /// Edits the configuration of a registered container and re-registers it.
    ///
    /// Value accessors, per-container subscriptions and the selection are kept.
    pub fn update_config(
        &mut self,
        element: H::Element,
        update: impl FnOnce(&mut ParentConfig<H>),
    ) -> Result<(), RegisterError<H::Element>> {
        let Some(record) = self.registry.parent(element) else {
            return Err(RegisterError::NotRegistered(element));
        };
        let mut config = record.data.config.clone();
        let registration = Registration {
            element,
            values: Some(record.data.values_fn()),
            set_values: Some(record.data.set_values_fn()),
            config: ParentConfig::default(),
        };
        update(&mut config);
        self.register(registration.config(config))
    }

    /// Unregisters a container, tearing down its plugins, nodes and listeners.
    ///
    /// A drag living in the container ends as cancelled, without restoring values.
    pub fn unregister(&mut self, element: H::Element) {
        if self.registry.parent(element).is_none() {
            return;
        }
        if self
            .drag_state()
            .is_some_and(|state| state.current_parent == element)
        {
            debug!(?element, "container of the active drag is going away");
            self.end_drag(true, false);
        }
        self.tear_down_parent(element);
        self.relink_ancestors();
        debug!(?element, "unregistered container");
    }

    /// Looks up a registered container.
    pub fn lookup_parent(&self, element: H::Element) -> Option<&ParentRecord<H>> {
        self.registry.parent(element)
    }

    /// Looks up an enabled node.
    pub fn lookup_node(&self, element: H::Element) -> Option<&NodeRecord<H::Element, H::Value>> {
        self.registry.node(element)
    }

    /// The number of registered containers.
    pub fn parent_count(&self) -> usize {
        self.registry.parent_count()
    }

    /// The number of enabled nodes across all containers.
    pub fn node_count(&self) -> usize {
        self.registry.node_count()
    }

    /// Tells the engine that the children of `element` (a container, or a node's container) changed.
    pub fn notify_mutation(&mut self, element: H::Element) {
        if self.registry.parent(element).is_some() {
            self.remap(element);
        } else if let Some(parent) = self.registry.node(element).map(|n| n.data.parent) {
            self.remap(parent);
        }
    }

    fn tear_down_parent(&mut self, element: H::Element) -> Option<ParentData<H>> {
        let record = self.registry.parent_mut(element)?;
        let nodes = record.data.nodes.clone();
        let mut plugins = mem::take(&mut record.data.plugins);
        {
            let mut ctx = HookContext::new(element, &mut self.host, &mut self.registry);
            for node in &nodes {
                for plugin in &mut plugins {
                    plugin.tear_down_node(&mut ctx, *node);
                }
            }
            for plugin in &mut plugins {
                plugin.tear_down(&mut ctx);
            }
        }
        for node in nodes {
            self.drop_node(element, node);
        }
        let record = self.registry.remove_parent(element)?;
        for handle in &record.data.handles {
            self.host.detach(*handle);
        }
        for class in &record.data.private_classes {
            self.host.remove_class(element, class);
        }
        Some(record.data)
    }

    fn find_ancestor(&self, element: H::Element) -> Option<H::Element> {
        let mut cursor = self.host.parent_of(element);
        while let Some(el) = cursor {
            if self.registry.parent(el).is_some() {
                return Some(el);
            }
            cursor = self.host.parent_of(el);
        }
        None
    }

    fn relink_ancestors(&mut self) {
        for parent in self.registry.parent_elements() {
            let ancestor = self.find_ancestor(parent);
            if let Some(record) = self.registry.parent_mut(parent) {
                record.data.ancestor = ancestor;
            }
        }
    }

    // --- bus ---

    /// Subscribes to lifecycle events of every container.
    pub fn on(
        &mut self,
        kind: LifecycleKind,
        callback: impl Fn(&LifecycleEvent<H::Element>) + 'static,
    ) -> Subscription {
        self.bus.on(kind, callback)
    }

    /// Removes a global subscription.
    pub fn off(&mut self, subscription: Subscription) {
        self.bus.off(subscription);
    }

    /// Subscribes to lifecycle events of one container.
    ///
    /// Returns `None` if the container is not registered.
    pub fn on_parent(
        &mut self,
        element: H::Element,
        kind: LifecycleKind,
        callback: impl Fn(&LifecycleEvent<H::Element>) + 'static,
    ) -> Option<Subscription> {
        let record = self.registry.parent_mut(element)?;
        Some(record.data.emitter.on(kind, callback))
    }

    /// Removes a per-container subscription.
    pub fn off_parent(&mut self, element: H::Element, subscription: Subscription) {
        if let Some(record) = self.registry.parent_mut(element) {
            record.data.emitter.off(subscription);
        }
    }

    pub(crate) fn emit(&self, parent: H::Element, event: &LifecycleEvent<H::Element>) {
        self.bus.emit(event);
        if let Some(record) = self.registry.parent(parent) {
            record.data.emitter.emit(event);
        }
    }

    // --- values ---

    /// Reads the current values of a container. Unknown containers have none.
    pub fn values(&self, parent: H::Element) -> Vec<H::Value> {
        match self.registry.parent(parent) {
            Some(record) => (record.data.values)(&self.host, parent),
            None => Vec::new(),
        }
    }

    /// Hands new values to a container's setter and remaps it.
    ///
    /// During a drag the container's pre-drag values are recorded for
    /// cancellation, and sorting is blocked until the remap completes.
    pub fn commit_values(&mut self, parent: H::Element, values: Vec<H::Value>) {
        let Some(set_values) = self.registry.parent(parent).map(|r| r.data.set_values_fn()) else {
            return;
        };
        let needs_snapshot = self
            .drag_state()
            .is_some_and(|state| !state.has_snapshot(parent));
        let snapshot = needs_snapshot.then(|| self.values(parent));
        if let Some(state) = self.drag_state_mut() {
            if let Some(previous) = snapshot {
                state.snapshot(parent, previous);
            }
            state.await_remap(parent);
            state.committing = true;
        }
        set_values(&mut self.host, parent, values);
        self.remap(parent);
        if let Some(state) = self.drag_state_mut() {
            state.committing = false;
        }
    }

    // --- selection ---

    /// The multi-drag selection of a container.
    pub fn selection(&self, parent: H::Element) -> Option<&Selection<H::Value>> {
        self.registry.parent(parent).map(|r| &r.data.selection)
    }

    /// Adds `value` to a container's selection.
    pub fn select(&mut self, parent: H::Element, value: H::Value) {
        let Some(record) = self.registry.parent_mut(parent) else {
            return;
        };
        if !record.data.selection.contains(&value) {
            record.data.selection.toggle(value);
            self.sync_selection_classes(parent);
        }
    }

    /// Clears a container's selection.
    pub fn clear_selection(&mut self, parent: H::Element) {
        if let Some(record) = self.registry.parent_mut(parent) {
            record.data.selection.clear();
            self.sync_selection_classes(parent);
        }
    }

    pub(crate) fn sync_selection_classes(&mut self, parent: H::Element) {
        let Some(record) = self.registry.parent(parent) else {
            return;
        };
        let Some(class) = record.data.config.classes.selected.clone() else {
            return;
        };
        let marks: Vec<(H::Element, bool)> = record
            .data
            .nodes
            .iter()
            .filter_map(|el| {
                let node = self.registry.node(*el)?;
                Some((*el, record.data.selection.contains(&node.data.value)))
            })
            .collect();
        for (el, selected) in marks {
            if selected {
                self.add_private_class(el, &class);
            } else {
                self.remove_private_class(el, &class);
            }
        }
    }

    // --- classes ---

    pub(crate) fn add_private_class(&mut self, element: H::Element, class: &str) {
        self.host.add_class(element, class);
        if let Some(node) = self.registry.node_mut(element) {
            if !node.data.private_classes.iter().any(|c| c == class) {
                node.data.private_classes.push(String::from(class));
            }
        } else if let Some(parent) = self.registry.parent_mut(element)
            && !parent.data.private_classes.iter().any(|c| c == class)
        {
            parent.data.private_classes.push(String::from(class));
        }
    }

    pub(crate) fn remove_private_class(&mut self, element: H::Element, class: &str) {
        self.host.remove_class(element, class);
        if let Some(node) = self.registry.node_mut(element) {
            node.data.private_classes.retain(|c| c != class);
        } else if let Some(parent) = self.registry.parent_mut(element) {
            parent.data.private_classes.retain(|c| c != class);
        }
    }

    // --- events ---

    /// Feeds one input event through the state machine.
    pub fn handle_event(&mut self, event: impl Into<InputEvent<H::Element>>) -> EventResult {
        let event = event.into();
        self.now = self.now.max(event.time());
        match event {
            InputEvent::Native(ev) => self.handle_native(ev),
            InputEvent::Pointer(ev) => self.handle_pointer(ev),
            InputEvent::Key(ev) => self.handle_key(ev),
        }
    }

    /// Advances time: fires due long presses, releases throttled moves and auto-scrolls.
    pub fn tick(&mut self, now: u64) {
        self.now = self.now.max(now);

        if let Interaction::LongPressPending(press, long_press) = &self.interaction
            && long_press.is_due(self.now)
        {
            let press = *press;
            self.reset_press();
            trace!(node = ?press.node, "long press elapsed");
            self.start_drag(press.parent, press.node, press.position, true);
        }

        if self.is_dragging()
            && let Some(sample) = self.throttle.flush(self.now)
        {
            self.process_over(sample);
        }

        if self.is_dragging() && self.step_scroll() {
            let Some(state) = self.drag_state() else {
                return;
            };
            let position = state.pointer.last();
            if state.mode.is_synthetic() {
                self.process_over(OverSample {
                    target: None,
                    position,
                });
            } else {
                self.update_scroll(position);
            }
        }
    }

    /// Cancels the active drag or pending press, restoring pre-drag values.
    pub fn cancel(&mut self) -> EventResult {
        match self.interaction {
            Interaction::Idle => EventResult::Ignored,
            Interaction::Pressed(_) | Interaction::LongPressPending(..) => {
                self.reset_press();
                EventResult::Consumed
            }
            Interaction::Dragging(_) => {
                self.throttle.reset();
                self.end_drag(true, true);
                EventResult::Consumed
            }
        }
    }

    fn handle_native(&mut self, ev: NativeDragEvent<H::Element>) -> EventResult {
        if ev.kind == NativeDragKind::DragStart {
            return self.native_drag_start(ev);
        }
        if self.phase() != Phase::NativeDragging {
            return EventResult::Ignored;
        }
        match ev.kind {
            NativeDragKind::DragStart => return EventResult::Ignored,
            NativeDragKind::DragEnter | NativeDragKind::DragOver => {
                self.offer_sample(
                    OverSample {
                        target: Some(ev.target),
                        position: ev.position,
                    },
                    ev.time,
                );
            }
            NativeDragKind::Drop => {
                self.flush_pending();
                self.drop_at(Some(ev.target), ev.position);
            }
            NativeDragKind::DragEnd => {
                self.flush_pending();
                self.end_drag(false, false);
            }
        }
        EventResult::Consumed
    }

    fn native_drag_start(&mut self, ev: NativeDragEvent<H::Element>) -> EventResult {
        if self.is_dragging() {
            return EventResult::Ignored;
        }
        let press = match &self.interaction {
            Interaction::Pressed(press) | Interaction::LongPressPending(press, _) => Some(*press),
            _ => None,
        };
        self.reset_press();

        let Some(Target {
            node: Some(node),
            parent,
        }) = resolve_target(&self.host, &self.registry, ev.target)
        else {
            trace!(target = ?ev.target, "dragstart outside any node");
            return EventResult::Ignored;
        };
        let Some(record) = self.registry.parent(parent) else {
            return EventResult::Ignored;
        };
        if record.data.config.disabled || !record.data.config.native_drag {
            trace!(?parent, "native drag not allowed");
            return EventResult::Ignored;
        }
        let origin = press.filter(|p| p.node == node).map(|p| p.origin);
        if !self.passes_handle(parent, node, origin) {
            trace!(?node, "dragstart outside the drag handle");
            return EventResult::Ignored;
        }
        self.start_drag(parent, node, ev.position, false);
        EventResult::Consumed
    }

    fn handle_pointer(&mut self, ev: PointerEvent<H::Element>) -> EventResult {
        match ev.kind {
            PointerKind::Down => self.pointer_down(ev),
            PointerKind::Move => self.pointer_move(ev),
            PointerKind::Up => self.pointer_up(ev),
            PointerKind::Cancel => match &self.interaction {
                Interaction::Dragging(state) if !state.mode.is_synthetic() => EventResult::Ignored,
                _ => self.cancel(),
            },
        }
    }

    fn handle_key(&mut self, ev: KeyEvent) -> EventResult {
        match ev.key {
            Key::Escape => self.cancel(),
            Key::Other => EventResult::Ignored,
        }
    }

    fn pointer_down(&mut self, ev: PointerEvent<H::Element>) -> EventResult {
        if self.is_dragging() {
            return EventResult::Ignored;
        }
        self.reset_press();

        let Some(Target {
            node: Some(node),
            parent,
        }) = resolve_target(&self.host, &self.registry, ev.target)
        else {
            return EventResult::Ignored;
        };
        let Some(record) = self.registry.parent(parent) else {
            return EventResult::Ignored;
        };
        let config = &record.data.config;
        if config.disabled {
            return EventResult::Ignored;
        }
        let synthetic = !config.native_drag || ev.pointer_type != PointerType::Mouse;
        let long_press = (synthetic && config.long_press).then(|| {
            (
                LongPress::new(ev.position, ev.time, config.long_press_duration),
                config.classes.long_press.clone(),
            )
        });
        if synthetic && !self.passes_handle(parent, node, Some(ev.target)) {
            trace!(?node, "press outside the drag handle");
            return EventResult::Ignored;
        }

        let press = Press {
            node,
            parent,
            origin: ev.target,
            position: ev.position,
            synthetic,
        };
        match long_press {
            Some((deadline, class)) => {
                if let Some(class) = class {
                    self.add_private_class(node, &class);
                }
                self.interaction = Interaction::LongPressPending(press, deadline);
            }
            None => self.interaction = Interaction::Pressed(press),
        }
        if synthetic {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    fn pointer_move(&mut self, ev: PointerEvent<H::Element>) -> EventResult {
        match &self.interaction {
            Interaction::Pressed(press) if press.synthetic => {
                let press = *press;
                self.interaction = Interaction::Idle;
                self.start_drag(press.parent, press.node, press.position, true);
                if self.is_dragging() {
                    self.synthetic_move(ev.position, ev.time);
                }
                EventResult::Consumed
            }
            Interaction::LongPressPending(press, long_press) => {
                if long_press.exceeds(ev.position, self.config.press_tolerance) {
                    trace!(node = ?press.node, "long press abandoned");
                    self.reset_press();
                }
                EventResult::Consumed
            }
            Interaction::Dragging(state) if state.mode.is_synthetic() => {
                self.synthetic_move(ev.position, ev.time);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn pointer_up(&mut self, ev: PointerEvent<H::Element>) -> EventResult {
        match &self.interaction {
            Interaction::Idle => EventResult::Ignored,
            Interaction::Pressed(press) | Interaction::LongPressPending(press, _) => {
                let press = *press;
                self.reset_press();
                if self.click(press, ev.modifiers) || press.synthetic {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
            Interaction::Dragging(state) => {
                if !state.mode.is_synthetic() {
                    return EventResult::Ignored;
                }
                self.flush_pending();
                if self.is_dragging() {
                    self.drop_at(None, ev.position);
                    self.end_drag(false, false);
                }
                EventResult::Consumed
            }
        }
    }

    /// Clears a pending press, removing the long-press class. Drags are left alone.
    fn reset_press(&mut self) {
        match &self.interaction {
            Interaction::LongPressPending(press, _) => {
                let node = press.node;
                let class = self
                    .registry
                    .parent(press.parent)
                    .and_then(|r| r.data.config.classes.long_press.clone());
                self.interaction = Interaction::Idle;
                if let Some(class) = class {
                    self.remove_private_class(node, &class);
                }
            }
            Interaction::Pressed(_) => self.interaction = Interaction::Idle,
            Interaction::Idle | Interaction::Dragging(_) => {}
        }
    }

    /// Applies a click to the multi-drag selection. Returns `true` if it changed anything.
    fn click(&mut self, press: Press<H::Element>, modifiers: Modifiers) -> bool {
        let order = self.registry.node_values(press.parent);
        let Some(value) = self.registry.node(press.node).map(|n| n.data.value.clone()) else {
            return false;
        };
        let Some(record) = self.registry.parent_mut(press.parent) else {
            return false;
        };
        if !record.data.config.multi_drag {
            return false;
        }
        let selection = &mut record.data.selection;
        if modifiers.contains(Modifiers::SHIFT) {
            selection.select_range(&order, value);
        } else if modifiers.intersects(Modifiers::CTRL | Modifiers::META) {
            selection.toggle(value);
        } else {
            selection.select_only(value);
        }
        self.sync_selection_classes(press.parent);
        true
    }

    /// Returns `true` if no handle is configured or `origin` lies inside one within `node`.
    fn passes_handle(
        &self,
        parent: H::Element,
        node: H::Element,
        origin: Option<H::Element>,
    ) -> bool {
        let Some(is_handle) = self
            .registry
            .parent(parent)
            .and_then(|r| r.data.config.drag_handle.clone())
        else {
            return true;
        };
        let Some(origin) = origin.filter(|el| is_within(&self.host, *el, node)) else {
            return false;
        };
        let mut cursor = Some(origin);
        while let Some(el) = cursor {
            if is_handle(&self.host, el) {
                return true;
            }
            if el == node {
                break;
            }
            cursor = self.host.parent_of(el);
        }
        false
    }

    fn synthetic_move(&mut self, position: Point, time: u64) {
        if let Interaction::Dragging(state) = &self.interaction
            && let DragMode::Synthetic {
                image: Some(image),
                offset,
            } = state.mode
        {
            self.host.move_drag_image(image, position - offset);
        }
        self.offer_sample(
            OverSample {
                target: None,
                position,
            },
            time,
        );
    }

    fn offer_sample(&mut self, sample: OverSample<H::Element>, time: u64) {
        if let Some(sample) = self.throttle.push(sample, time) {
            self.process_over(sample);
        }
    }

    fn flush_pending(&mut self) {
        if let Some(sample) = self.throttle.take() {
            self.process_over(sample);
        }
    }

    /// Runs one processed move sample: class swap, auto-scroll and the over handlers.
    pub(crate) fn process_over(&mut self, sample: OverSample<H::Element>) {
        let Interaction::Dragging(state) = &mut self.interaction else {
            return;
        };
        state.pointer.update(sample.position);
        let swap = if !state.mode.is_synthetic() && !state.over_seen {
            state.over_seen = true;
            Some((
                state.dragged_elements(),
                state.classes.dragging.clone(),
                state.classes.drop_zone.clone(),
            ))
        } else {
            None
        };
        if let Some((elements, from, to)) = swap {
            for el in elements {
                if let Some(class) = &from {
                    self.remove_private_class(el, class);
                }
                if let Some(class) = &to {
                    self.add_private_class(el, class);
                }
            }
        }

        self.update_scroll(sample.position);

        let raw = sample
            .target
            .or_else(|| self.host.element_at(sample.position));
        let Some(target) = raw.and_then(|el| resolve_target(&self.host, &self.registry, el)) else {
            return;
        };
        let Some(record) = self.registry.parent(target.parent) else {
            return;
        };
        if record.data.config.disabled {
            return;
        }
        match target.node {
            Some(node) => {
                let handler = record.data.handlers.handle_node_over.clone();
                handler.handle_node_over(
                    self,
                    &NodeOver {
                        parent: target.parent,
                        node,
                        position: sample.position,
                    },
                );
            }
            None => {
                let handler = record.data.handlers.handle_parent_over.clone();
                handler.handle_parent_over(
                    self,
                    &ParentOver {
                        parent: target.parent,
                        position: sample.position,
                    },
                );
            }
        }
    }

    // --- drag lifecycle ---

    fn start_drag(&mut self, parent: H::Element, node: H::Element, position: Point, synthetic: bool) {
        let Some(record) = self.registry.parent(parent) else {
            return;
        };
        let Some((value, index)) = self
            .registry
            .node(node)
            .map(|n| (n.data.value.clone(), n.data.index))
        else {
            return;
        };
        let config = &record.data.config;
        let multi = config.multi_drag && record.data.selection.contains(&value);
        let clear_selection = config.multi_drag && !multi && !record.data.selection.is_empty();
        let classes = config.classes.clone();
        let on_dragstart = config.on_dragstart.clone();
        let values = self.values(parent);

        let mut dragged: SmallVec<[DraggedNode<H::Element, H::Value>; 1]> = SmallVec::new();
        let mut primary = 0;
        if multi && let Some(record) = self.registry.parent(parent) {
            for (at, element) in record.data.nodes.iter().copied().enumerate() {
                let Some(selected) = self.registry.node(element).map(|n| &n.data.value) else {
                    continue;
                };
                if !record.data.selection.contains(selected) {
                    continue;
                }
                if element == node {
                    primary = dragged.len();
                }
                dragged.push(DraggedNode {
                    element,
                    value: selected.clone(),
                    index: at,
                    initial_index: at,
                });
            }
        }
        if !dragged.iter().any(|d| d.element == node) {
            dragged.clear();
            primary = 0;
            dragged.push(DraggedNode {
                element: node,
                value: value.clone(),
                index,
                initial_index: index,
            });
        }
        if clear_selection {
            self.clear_selection(parent);
        }

        let elements: Vec<H::Element> = dragged.iter().map(|d| d.element).collect();
        let mode = if synthetic {
            let bounds = elements
                .iter()
                .map(|el| self.host.rect(*el))
                .reduce(|a, b| a.union(b))
                .unwrap_or(Rect::ZERO);
            let image = self.host.create_drag_image(&elements, bounds);
            DragMode::Synthetic {
                image,
                offset: position - bounds.origin(),
            }
        } else {
            DragMode::Native
        };

        let state = DragState::new(mode, dragged, primary, parent, index, position, classes);
        let class = state.phase_class().map(String::from);
        self.throttle.reset();
        self.scroll.stop();
        self.interaction = Interaction::Dragging(state);
        if let Some(class) = class {
            for el in &elements {
                self.add_private_class(*el, &class);
            }
        }

        debug!(?parent, ?node, synthetic, count = elements.len(), "drag started");
        if let Some(callback) = on_dragstart {
            callback(&DragStartEvent {
                parent,
                values,
                dragged_node: node,
                dragged_nodes: elements,
                position,
                synthetic,
            });
        }
        self.emit(parent, &LifecycleEvent::DragStarted { parent, node });
    }

    fn drop_at(&mut self, target: Option<H::Element>, position: Point) {
        if let Some(state) = self.drag_state_mut() {
            state.dropped = true;
            state.pointer.update(position);
        }
        let raw = target.or_else(|| self.host.element_at(position));
        let Some(target) = raw.and_then(|el| resolve_target(&self.host, &self.registry, el)) else {
            trace!("drop outside any container");
            return;
        };
        let Some(record) = self.registry.parent(target.parent) else {
            return;
        };
        if record.data.config.disabled {
            trace!(parent = ?target.parent, "drop on a disabled container");
            return;
        }
        let handler = record.data.handlers.handle_drop.clone();
        handler.handle_drop(
            self,
            &DropEvent {
                parent: target.parent,
                node: target.node,
                position,
            },
        );
    }

    /// Routes the end of the drag through the current container's end handler.
    pub(crate) fn end_drag(&mut self, cancelled: bool, restore: bool) {
        let Some(parent) = self.drag_state().map(|s| s.current_parent) else {
            return;
        };
        let event = EndEvent {
            parent,
            cancelled,
            restore,
        };
        let handler = self
            .registry
            .parent(parent)
            .map(|r| r.data.handlers.handle_end.clone());
        match handler {
            Some(handler) => handler.handle_end(self, &event),
            None => self.finish_drag(&event),
        }
        if self.is_dragging() {
            self.finish_drag(&event);
        }
    }

    /// Clears the drag: removes the drag image and classes, optionally restores
    /// values, and fires `on_dragend` plus [`LifecycleEvent::DragEnded`].
    pub fn finish_drag(&mut self, event: &EndEvent<H::Element>) {
        let Interaction::Dragging(state) = mem::replace(&mut self.interaction, Interaction::Idle)
        else {
            return;
        };
        self.throttle.reset();
        self.scroll.stop();
        if let DragMode::Synthetic {
            image: Some(image), ..
        } = state.mode
        {
            self.host.remove_drag_image(image);
        }
        let classes = [
            &state.classes.dragging,
            &state.classes.drop_zone,
            &state.classes.synth_drop_zone,
        ];
        for dragged in &state.dragged {
            for class in classes.iter().copied().flatten() {
                self.remove_private_class(dragged.element, class);
            }
        }

        let mut parent = state.current_parent;
        let restored = event.restore && !state.snapshots.is_empty();
        if restored {
            for (touched, values) in &state.snapshots {
                if self.registry.parent(*touched).is_some() && self.host.is_connected(*touched) {
                    self.commit_values(*touched, values.clone());
                }
            }
            parent = state.initial_parent;
            debug!(?parent, "restored pre-drag values");
        }

        let values = self.values(parent);
        let locate = |dragged: &DraggedNode<H::Element, H::Value>| {
            if restored {
                self.registry
                    .node_at(parent, dragged.initial_index, &dragged.value)
                    .or_else(|| self.registry.node_with_value(parent, &dragged.value))
            } else {
                self.registry
                    .node(dragged.element)
                    .is_some_and(|n| n.data.parent == parent)
                    .then_some(dragged.element)
            }
        };
        let dragged_nodes: Vec<H::Element> = state.dragged.iter().filter_map(&locate).collect();
        let dragged_node = locate(state.primary());
        debug!(?parent, cancelled = event.cancelled, "drag ended");
        if let Some(callback) = self
            .registry
            .parent(parent)
            .and_then(|r| r.data.config.on_dragend.clone())
        {
            callback(&DragEndEvent {
                parent,
                initial_parent: state.initial_parent,
                values,
                dragged_node,
                dragged_nodes,
                offset: state.pointer.total_offset(),
                cancelled: event.cancelled,
            });
        }
        self.emit(
            parent,
            &LifecycleEvent::DragEnded {
                parent,
                cancelled: event.cancelled,
            },
        );
    }

    // --- strategy entry points ---

    /// Runs the sort strategy of `request.parent`.
    pub fn perform_sort(&mut self, request: &SortRequest<H::Element>) {
        let Some(strategy) = self
            .registry
            .parent(request.parent)
            .map(|r| r.data.handlers.perform_sort.clone())
        else {
            return;
        };
        strategy.perform_sort(self, request);
    }

    /// Runs the transfer strategy of `request.target`.
    pub fn perform_transfer(&mut self, request: &TransferRequest<H::Element>) {
        let Some(strategy) = self
            .registry
            .parent(request.target)
            .map(|r| r.data.handlers.perform_transfer.clone())
        else {
            return;
        };
        strategy.perform_transfer(self, request);
    }

    /// Records where a deferred insertion should land on drop.
    pub fn set_insert_target(&mut self, target: Option<InsertTarget<H::Element>>) {
        if let Some(state) = self.drag_state_mut() {
            state.insert_target = target;
        }
    }
}
