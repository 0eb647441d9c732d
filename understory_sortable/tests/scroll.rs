// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge auto-scroll during synthetic drags.

mod common;

use common::*;
use kurbo::{Rect, Vec2};
use understory_sortable::event::PointerKind;
use understory_sortable::memory::{Axis, ElementId};
use understory_sortable::{DragEngine, ParentConfig, ScrollBehavior};

/// A 100x50 scroller holding a 150 px tall list of ten rows.
fn scroller(config: ParentConfig<Host>) -> (Engine, ElementId, ElementId) {
    let mut host = Host::new();
    let scroller = host.add_container(Rect::new(0.0, 0.0, 100.0, 50.0), Axis::Vertical, 10.0);
    host.set_scrollable(scroller, Vec2::new(0.0, 100.0));
    let list = host.add_container_in(
        scroller,
        Rect::new(0.0, 0.0, 100.0, 150.0),
        Axis::Vertical,
        10.0,
    );
    host.render(list, &["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
    let mut engine = DragEngine::new(host);
    register(&mut engine, list, config.with_native_drag(false));
    (engine, scroller, list)
}

#[test]
fn pointer_near_the_bottom_edge_scrolls_each_tick() {
    let (mut engine, scroller, _list) = scroller(ParentConfig::default());
    let a = el(&engine, "a");

    engine.handle_event(pointer(PointerKind::Down, a, (5.0, 5.0), 0));
    engine.handle_event(pointer(PointerKind::Move, a, (5.0, 48.0), 20));
    assert!(engine.is_dragging());
    assert_eq!(engine.host().scroll_offset(scroller), Vec2::ZERO);

    engine.tick(40);
    assert_eq!(engine.host().scroll_offset(scroller), Vec2::new(0.0, 10.0));
    engine.tick(60);
    assert_eq!(engine.host().scroll_offset(scroller), Vec2::new(0.0, 20.0));

    // Back in the middle, scrolling stops.
    engine.handle_event(pointer(PointerKind::Move, a, (5.0, 25.0), 80));
    engine.tick(100);
    assert_eq!(engine.host().scroll_offset(scroller), Vec2::new(0.0, 20.0));

    engine.handle_event(pointer(PointerKind::Up, a, (5.0, 25.0), 120));
}

#[test]
fn scrolling_stops_with_the_drag() {
    let (mut engine, scroller, _list) = scroller(ParentConfig::default());
    let a = el(&engine, "a");

    engine.handle_event(pointer(PointerKind::Down, a, (5.0, 5.0), 0));
    engine.handle_event(pointer(PointerKind::Move, a, (5.0, 48.0), 20));
    engine.tick(40);
    engine.handle_event(pointer(PointerKind::Up, a, (5.0, 48.0), 50));
    assert!(!engine.is_dragging());

    let offset = engine.host().scroll_offset(scroller);
    engine.tick(100);
    engine.tick(200);
    assert_eq!(engine.host().scroll_offset(scroller), offset);
}

/// A 100x100 scroller whose list only covers its top 40 px.
fn short_list(scroll_outside: bool) -> (Engine, ElementId) {
    let mut host = Host::new();
    let scroller = host.add_container(Rect::new(0.0, 0.0, 100.0, 100.0), Axis::Vertical, 10.0);
    host.set_scrollable(scroller, Vec2::new(0.0, 100.0));
    let list = host.add_container_in(
        scroller,
        Rect::new(0.0, 0.0, 100.0, 40.0),
        Axis::Vertical,
        10.0,
    );
    host.render(list, &["a", "b", "c"]);
    let mut engine = DragEngine::new(host);
    let behavior = ScrollBehavior {
        scroll_outside,
        ..ScrollBehavior::default()
    };
    let config = ParentConfig::default()
        .with_native_drag(false)
        .with_scroll_behavior(behavior);
    register(&mut engine, list, config);
    (engine, scroller)
}

#[test]
fn leaving_the_container_only_scrolls_when_allowed() {
    for (scroll_outside, expected) in [(false, 0.0), (true, 10.0)] {
        let (mut engine, scroller) = short_list(scroll_outside);
        let a = el(&engine, "a");

        engine.handle_event(pointer(PointerKind::Down, a, (5.0, 5.0), 0));
        engine.handle_event(pointer(PointerKind::Move, a, (5.0, 95.0), 20));
        engine.tick(40);
        assert_eq!(
            engine.host().scroll_offset(scroller),
            Vec2::new(0.0, expected),
            "scroll_outside = {scroll_outside}"
        );
        engine.cancel();
    }
}
