// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sorting within one container, driven by native and pointer events.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::*;
use understory_sortable::event::{Key, KeyEvent, NativeDragKind, PointerKind};
use understory_sortable::memory::ElementId;
use understory_sortable::state::{Phase, SortDirection};
use understory_sortable::{
    DragClasses, EventResult, LifecycleEvent, LifecycleKind, ParentConfig, Threshold,
};

#[test]
fn native_drag_moves_first_after_last() {
    let (sorts, on_sort) = recorder();
    let (ends, on_dragend) = recorder();
    let config = ParentConfig::default()
        .on_sort(move |ev| on_sort(ev.clone()))
        .on_dragend(move |ev| on_dragend(ev.clone()));
    let (mut engine, list) = single(&["a", "b", "c"], config);
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    start_native(&mut engine, a, (5.0, 5.0));
    assert_eq!(engine.phase(), Phase::NativeDragging);
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 25.0), 20));
    assert_eq!(engine.values(list), ["b", "c", "a"]);
    assert_eq!(
        engine.drag_state().unwrap().direction,
        Some(SortDirection::Ascending)
    );
    finish_native(&mut engine, c, (5.0, 25.0), 30);

    let sorts = sorts.borrow();
    assert_eq!(sorts.len(), 1);
    assert_eq!(sorts[0].previous_values, ["a", "b", "c"]);
    assert_eq!(sorts[0].values, ["b", "c", "a"]);
    assert_eq!(sorts[0].previous_position, 0);
    assert_eq!(sorts[0].position, 2);
    assert_eq!(sorts[0].dragged_node, a);
    assert_eq!(sorts[0].target_node, Some(c));

    let ends = ends.borrow();
    assert_eq!(ends.len(), 1);
    assert!(!ends[0].cancelled);
    assert_eq!(ends[0].values, ["b", "c", "a"]);
    assert_eq!(ends[0].dragged_node, Some(a));
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn synthetic_drag_hit_tests_and_uses_a_drag_image() {
    let config = ParentConfig::default().with_native_drag(false);
    let (mut engine, list) = single(&["a", "b", "c"], config);
    let a = el(&engine, "a");

    assert_eq!(
        engine.handle_event(pointer(PointerKind::Down, a, (5.0, 5.0), 0)),
        EventResult::Consumed
    );
    assert_eq!(engine.phase(), Phase::Pressed);
    engine.handle_event(pointer(PointerKind::Move, a, (5.0, 25.0), 20));
    assert_eq!(engine.phase(), Phase::SyntheticDragging);
    assert_eq!(engine.values(list), ["b", "c", "a"]);

    let images: Vec<_> = engine.host().drag_images().collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].1.origin(), kurbo::Point::new(0.0, 20.0));

    engine.handle_event(pointer(PointerKind::Up, a, (5.0, 25.0), 40));
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.host().drag_images().count(), 0);
    assert_eq!(engine.values(list), ["b", "c", "a"]);
}

#[test]
fn moving_last_to_front() {
    let (mut engine, list) = single(&["a", "b", "c"], ParentConfig::default());
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    start_native(&mut engine, c, (5.0, 25.0));
    engine.handle_event(native(NativeDragKind::DragOver, a, (5.0, 5.0), 20));
    assert_eq!(engine.values(list), ["c", "a", "b"]);
    assert_eq!(
        engine.drag_state().unwrap().direction,
        Some(SortDirection::Descending)
    );
    finish_native(&mut engine, a, (5.0, 5.0), 30);
}

#[test]
fn threshold_delays_the_sort() {
    let config = ParentConfig::default().with_threshold(Threshold::new(0.0, 0.5));
    let (mut engine, list) = single(&["a", "b", "c"], config);
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    start_native(&mut engine, a, (5.0, 5.0));
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 22.0), 20));
    assert_eq!(engine.values(list), ["a", "b", "c"]);
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 27.0), 40));
    assert_eq!(engine.values(list), ["b", "c", "a"]);
    finish_native(&mut engine, c, (5.0, 27.0), 50);
}

#[test]
fn repeated_hover_over_last_target_is_ignored() {
    let (mut engine, list) = single(&["a", "b", "c"], ParentConfig::default());
    let a = el(&engine, "a");
    let b = el(&engine, "b");

    start_native(&mut engine, a, (5.0, 5.0));
    engine.handle_event(native(NativeDragKind::DragOver, b, (5.0, 15.0), 20));
    assert_eq!(engine.values(list), ["b", "a", "c"]);

    // `b` now sits above the dragged node; hovering it again must not flip back.
    engine.handle_event(native(NativeDragKind::DragOver, b, (5.0, 5.0), 40));
    assert_eq!(engine.values(list), ["b", "a", "c"]);

    // Passing over the dragged node forgets the last target.
    engine.handle_event(native(NativeDragKind::DragOver, a, (5.0, 15.0), 60));
    engine.handle_event(native(NativeDragKind::DragOver, b, (5.0, 5.0), 80));
    assert_eq!(engine.values(list), ["a", "b", "c"]);
    finish_native(&mut engine, b, (5.0, 5.0), 90);
}

#[test]
fn escape_restores_the_original_order() {
    let (ends, on_dragend) = recorder();
    let config = ParentConfig::default().on_dragend(move |ev| on_dragend(ev.clone()));
    let (mut engine, list) = single(&["a", "b", "c"], config);
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    start_native(&mut engine, a, (5.0, 5.0));
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 25.0), 20));
    assert_eq!(engine.values(list), ["b", "c", "a"]);

    let result = engine.handle_event(KeyEvent {
        key: Key::Escape,
        time: 30,
    });
    assert!(result.is_consumed());
    assert!(!engine.is_dragging());
    assert_eq!(engine.values(list), ["a", "b", "c"]);

    let ends = ends.borrow();
    assert_eq!(ends.len(), 1);
    assert!(ends[0].cancelled);
    assert_eq!(ends[0].values, ["a", "b", "c"]);

    // The native end that follows is ignored.
    drop(ends);
    assert_eq!(
        engine.handle_event(native(NativeDragKind::DragEnd, a, (5.0, 5.0), 31)),
        EventResult::Ignored
    );
}

#[test]
fn disabled_container_never_drags() {
    let config = ParentConfig::default().with_disabled(true);
    let (mut engine, _list) = single(&["a", "b"], config);
    let a = el(&engine, "a");

    engine.handle_event(pointer(PointerKind::Down, a, (5.0, 5.0), 0));
    let result = engine.handle_event(native(NativeDragKind::DragStart, a, (5.0, 5.0), 1));
    assert_eq!(result, EventResult::Ignored);
    assert!(!engine.is_dragging());
}

#[test]
fn unsortable_container_keeps_its_order() {
    let config = ParentConfig::default().with_sortable(false);
    let (mut engine, list) = single(&["a", "b", "c"], config);
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    start_native(&mut engine, a, (5.0, 5.0));
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 25.0), 20));
    finish_native(&mut engine, c, (5.0, 25.0), 30);
    assert_eq!(engine.values(list), ["a", "b", "c"]);
}

#[test]
fn drop_outside_any_container_still_ends() {
    let ended = Rc::new(Cell::new(0));
    let config = ParentConfig::default()
        .with_native_drag(false)
        .on_dragend({
            let ended = ended.clone();
            move |_| ended.set(ended.get() + 1)
        });
    let (mut engine, list) = single(&["a", "b"], config);
    let a = el(&engine, "a");

    engine.handle_event(pointer(PointerKind::Down, a, (5.0, 5.0), 0));
    engine.handle_event(pointer(PointerKind::Move, a, (500.0, 500.0), 20));
    engine.handle_event(pointer(PointerKind::Up, a, (500.0, 500.0), 40));
    assert_eq!(ended.get(), 1);
    assert_eq!(engine.values(list), ["a", "b"]);
}

#[test]
fn phase_classes_follow_the_drag() {
    let classes = DragClasses {
        dragging: Some("dragging".into()),
        drop_zone: Some("over".into()),
        ..DragClasses::default()
    };
    let config = ParentConfig::default().with_classes(classes);
    let (mut engine, _list) = single(&["a", "b", "c"], config);
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    start_native(&mut engine, a, (5.0, 5.0));
    assert!(engine.host().has_class(a, "dragging"));

    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 25.0), 20));
    assert!(!engine.host().has_class(a, "dragging"));
    assert!(engine.host().has_class(a, "over"));
    assert!(!engine.host().has_class(c, "over"));

    finish_native(&mut engine, c, (5.0, 25.0), 30);
    assert!(engine.host().classes(a).is_empty());
}

#[test]
fn lifecycle_bus_reports_sort_and_end() {
    let (mut engine, list) = single(&["a", "b", "c"], ParentConfig::default());
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    let (global, on_global) = recorder();
    engine.on(LifecycleKind::Sorted, move |ev| on_global(ev.clone()));
    let (local, on_local) = recorder();
    engine
        .on_parent(list, LifecycleKind::DragEnded, move |ev| on_local(ev.clone()))
        .unwrap();

    start_native(&mut engine, a, (5.0, 5.0));
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 25.0), 20));
    finish_native(&mut engine, c, (5.0, 25.0), 30);

    assert_eq!(global.borrow().len(), 1);
    assert_eq!(global.borrow()[0].kind(), LifecycleKind::Sorted);
    assert_eq!(local.borrow().len(), 1);
    assert_eq!(local.borrow()[0].kind(), LifecycleKind::DragEnded);
}

fn counter(seen: &Rc<Cell<u32>>) -> impl Fn(&LifecycleEvent<ElementId>) + 'static {
    let seen = seen.clone();
    move |_| seen.set(seen.get() + 1)
}

#[test]
fn unsubscribed_observers_stay_quiet() {
    let (mut engine, list) = single(&["a", "b", "c"], ParentConfig::default());
    let a = el(&engine, "a");
    let c = el(&engine, "c");

    let seen = Rc::new(Cell::new(0));
    let global = engine.on(LifecycleKind::Sorted, counter(&seen));
    let local = engine
        .on_parent(list, LifecycleKind::Sorted, counter(&seen))
        .unwrap();
    engine.off(global);
    engine.off_parent(list, local);

    start_native(&mut engine, a, (5.0, 5.0));
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 25.0), 20));
    finish_native(&mut engine, c, (5.0, 25.0), 30);

    assert_eq!(engine.values(list), ["b", "c", "a"]);
    assert_eq!(seen.get(), 0);
}

#[test]
fn equal_values_are_moved_by_position() {
    let (sorts, on_sort) = recorder();
    let config = ParentConfig::default().on_sort(move |ev| on_sort(ev.clone()));
    let (mut engine, list) = single(&["a", "a", "b"], config);
    let second = row(&engine, list, 1);
    let b = el(&engine, "b");

    start_native(&mut engine, second, (5.0, 15.0));
    engine.handle_event(native(NativeDragKind::DragOver, b, (5.0, 25.0), 20));
    assert_eq!(engine.values(list), ["a", "b", "a"]);
    let state = engine.drag_state().unwrap();
    assert_eq!(state.primary().index, 2);
    assert_eq!(state.primary().element, row(&engine, list, 2));
    finish_native(&mut engine, b, (5.0, 25.0), 30);

    assert_eq!(engine.values(list), ["a", "b", "a"]);
    assert_eq!(engine.node_count(), 3);
    let sorts = sorts.borrow();
    assert_eq!(sorts.len(), 1);
    assert_eq!((sorts[0].previous_position, sorts[0].position), (1, 2));
}
