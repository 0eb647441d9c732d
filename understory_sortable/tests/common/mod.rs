// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use understory_sortable::event::{
    NativeDragEvent, NativeDragKind, PointerEvent, PointerKind, PointerType,
};
use understory_sortable::memory::{Axis, ElementId, MemoryHost};
use understory_sortable::{DragEngine, ParentConfig};

pub type Host = MemoryHost<&'static str>;
pub type Engine = DragEngine<Host>;

/// Adds a 100x100 vertical list at `x` with 10 px rows.
pub fn list(host: &mut Host, x: f64, values: &[&'static str]) -> ElementId {
    let el = host.add_container(Rect::new(x, 0.0, x + 100.0, 100.0), Axis::Vertical, 10.0);
    host.render(el, values);
    el
}

pub fn register(engine: &mut Engine, list: ElementId, config: ParentConfig<Host>) {
    engine
        .register(MemoryHost::registration(list).config(config))
        .unwrap();
}

/// One list at the origin, registered with `config`.
pub fn single(values: &[&'static str], config: ParentConfig<Host>) -> (Engine, ElementId) {
    let mut host = Host::new();
    let el = list(&mut host, 0.0, values);
    let mut engine = DragEngine::new(host);
    register(&mut engine, el, config);
    (engine, el)
}

/// Two lists side by side (at x = 0 and x = 200), both registered with `config()`.
pub fn pair(
    left: &[&'static str],
    right: &[&'static str],
    config: impl Fn() -> ParentConfig<Host>,
) -> (Engine, ElementId, ElementId) {
    let mut host = Host::new();
    let l = list(&mut host, 0.0, left);
    let r = list(&mut host, 200.0, right);
    let mut engine = DragEngine::new(host);
    register(&mut engine, l, config());
    register(&mut engine, r, config());
    (engine, l, r)
}

pub fn el(engine: &Engine, value: &'static str) -> ElementId {
    engine.host().element_for(&value).unwrap()
}

/// The `index`th enabled node of `list`.
pub fn row(engine: &Engine, list: ElementId, index: usize) -> ElementId {
    engine.lookup_parent(list).unwrap().nodes()[index]
}

pub fn native(
    kind: NativeDragKind,
    target: ElementId,
    at: (f64, f64),
    time: u64,
) -> NativeDragEvent<ElementId> {
    NativeDragEvent::new(kind, target, Point::new(at.0, at.1), time)
}

pub fn pointer(
    kind: PointerKind,
    target: ElementId,
    at: (f64, f64),
    time: u64,
) -> PointerEvent<ElementId> {
    PointerEvent::new(kind, target, Point::new(at.0, at.1), time)
}

pub fn touch(
    kind: PointerKind,
    target: ElementId,
    at: (f64, f64),
    time: u64,
) -> PointerEvent<ElementId> {
    pointer(kind, target, at, time).with_pointer_type(PointerType::Touch)
}

/// Presses on `node` at `at` and starts a native drag there.
pub fn start_native(engine: &mut Engine, node: ElementId, at: (f64, f64)) {
    engine.handle_event(pointer(PointerKind::Down, node, at, 0));
    engine.handle_event(native(NativeDragKind::DragStart, node, at, 1));
    assert!(engine.is_dragging());
}

/// Drops on `target` at `at` and ends the native drag.
pub fn finish_native(engine: &mut Engine, target: ElementId, at: (f64, f64), time: u64) {
    engine.handle_event(native(NativeDragKind::Drop, target, at, time));
    engine.handle_event(native(NativeDragKind::DragEnd, target, at, time + 1));
    assert!(!engine.is_dragging());
}

/// Collects every value a callback was handed.
pub fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(T) + Clone + 'static) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = {
        let log = log.clone();
        move |item| log.borrow_mut().push(item)
    };
    (log, sink)
}
