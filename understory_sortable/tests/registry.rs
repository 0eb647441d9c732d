// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration, remap and teardown.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::*;
use kurbo::Rect;
use understory_sortable::event::NativeDragKind;
use understory_sortable::memory::{Axis, MemoryHost};
use understory_sortable::{
    DragClasses, DragEngine, Host as _, LifecycleKind, ParentConfig, RegisterError, Registration,
    Threshold,
};

#[test]
fn registration_needs_both_accessors() {
    let mut host = Host::new();
    let el = list(&mut host, 0.0, &["a"]);
    let mut engine = DragEngine::new(host);

    assert_eq!(
        engine.register(Registration::new(el)),
        Err(RegisterError::MissingValues(el))
    );
    let getter_only =
        Registration::new(el).values(|host: &Host, parent| host.values(parent).to_vec());
    assert_eq!(
        engine.register(getter_only),
        Err(RegisterError::MissingSetValues(el))
    );
    assert_eq!(engine.parent_count(), 0);
    assert_eq!(engine.host().total_listeners(), 0);
}

#[test]
fn detached_containers_cannot_register() {
    let mut host = Host::new();
    let el = list(&mut host, 0.0, &["a"]);
    host.remove(el);
    let mut engine = DragEngine::new(host);
    let err = engine.register(MemoryHost::registration(el)).unwrap_err();
    assert_eq!(err, RegisterError::Disconnected(el));
    assert_eq!(err.element(), el);
}

#[test]
fn update_config_of_unknown_container_fails() {
    let mut host = Host::new();
    let el = list(&mut host, 0.0, &["a"]);
    let mut engine = DragEngine::new(host);
    assert_eq!(
        engine.update_config(el, |config| config.sortable = false),
        Err(RegisterError::NotRegistered(el))
    );
}

#[test]
fn remap_without_changes_keeps_records() {
    let (mut engine, list) = single(&["a", "b", "c"], ParentConfig::default());
    let ids = |engine: &Engine| -> Vec<_> {
        engine
            .lookup_parent(list)
            .unwrap()
            .nodes()
            .iter()
            .map(|el| engine.lookup_node(*el).unwrap().data.id)
            .collect()
    };
    let before = ids(&engine);
    let listeners = engine.host().total_listeners();

    engine.remap(list);
    engine.remap(list);

    assert_eq!(ids(&engine), before);
    assert_eq!(engine.host().total_listeners(), listeners);
    assert_eq!(engine.node_count(), 3);
}

#[test]
fn re_registering_a_shorter_list_leaves_no_stale_listeners() {
    let (mut engine, list) = single(&["a", "b"], ParentConfig::default());
    let a = el(&engine, "a");
    let b = el(&engine, "b");
    assert_eq!(engine.host().total_listeners(), 4);

    engine.host_mut().render(list, &["a"]);
    engine.register(MemoryHost::registration(list)).unwrap();

    assert_eq!(engine.lookup_parent(list).unwrap().nodes(), [a]);
    assert_eq!(engine.node_count(), 1);
    assert!(engine.lookup_node(b).is_none());
    assert_eq!(engine.host().listener_count(list), 2);
    assert_eq!(engine.host().listener_count(a), 1);
    assert_eq!(engine.host().listener_count(b), 0);
    assert_eq!(engine.host().total_listeners(), 3);
}

#[test]
fn unregister_detaches_everything() {
    let classes = DragClasses {
        selected: Some("selected".into()),
        ..DragClasses::default()
    };
    let config = ParentConfig::default()
        .with_multi_drag(true)
        .with_classes(classes);
    let (mut engine, list) = single(&["a", "b"], config);
    let a = el(&engine, "a");
    engine.select(list, "a");
    assert!(engine.host().has_class(a, "selected"));

    engine.unregister(list);
    assert_eq!(engine.parent_count(), 0);
    assert_eq!(engine.node_count(), 0);
    assert_eq!(engine.host().total_listeners(), 0);
    assert!(engine.host().classes(a).is_empty());
    assert!(engine.values(list).is_empty());

    // A second unregister is harmless.
    engine.unregister(list);
}

#[test]
fn mutations_are_picked_up_on_notify() {
    let (mut engine, list) = single(&["a", "b"], ParentConfig::default());
    engine.host_mut().render(list, &["a", "b", "c", "d"]);
    assert_eq!(engine.node_count(), 2);

    engine.notify_mutation(list);
    assert_eq!(engine.node_count(), 4);

    // Notifying through a node remaps its container.
    let a = el(&engine, "a");
    engine.host_mut().render(list, &["d", "a"]);
    engine.notify_mutation(a);
    assert_eq!(engine.node_count(), 2);
    assert_eq!(engine.lookup_node(a).unwrap().data.index, 1);
    assert_eq!(engine.lookup_node(a).unwrap().data.value, "a");
}

#[test]
fn draggable_predicate_skips_plain_children() {
    let mut host = Host::new();
    let el_list = host.add_container(Rect::new(0.0, 0.0, 100.0, 100.0), Axis::Vertical, 10.0);
    let header = host.add_plain_child(el_list);
    host.render(el_list, &["a", "b"]);
    let mut engine = DragEngine::new(host);
    let config = ParentConfig::default().with_draggable(move |_, el| el != header);
    register(&mut engine, el_list, config);

    let a = el(&engine, "a");
    assert_eq!(engine.node_count(), 2);
    assert!(engine.lookup_node(header).is_none());
    assert_eq!(engine.lookup_node(a).unwrap().data.index, 0);

    // The header sits above the first item and is not a sort target.
    assert_eq!(engine.host().rect(a), Rect::new(0.0, 10.0, 100.0, 20.0));
    start_native(&mut engine, a, (5.0, 15.0));
    engine.handle_event(native(NativeDragKind::DragOver, header, (5.0, 5.0), 20));
    finish_native(&mut engine, header, (5.0, 5.0), 30);
    assert_eq!(engine.values(el_list), ["a", "b"]);
}

#[test]
fn detached_container_unregisters_on_remap() {
    let (mut engine, list) = single(&["a", "b"], ParentConfig::default());
    engine.host_mut().remove(list);
    engine.notify_mutation(list);
    assert_eq!(engine.parent_count(), 0);
    assert_eq!(engine.node_count(), 0);
    assert_eq!(engine.host().total_listeners(), 0);
}

#[test]
fn mismatched_counts_withhold_remap_finished() {
    let (mut engine, list) = single(&["a", "b"], ParentConfig::default());
    let finished = Rc::new(Cell::new(0));
    engine.on(LifecycleKind::RemapFinished, {
        let finished = finished.clone();
        move |_| finished.set(finished.get() + 1)
    });

    let header = engine.host_mut().add_plain_child(list);
    engine.notify_mutation(list);
    assert_eq!(finished.get(), 0);
    assert_eq!(engine.node_count(), 2);

    engine.host_mut().remove(header);
    engine.notify_mutation(list);
    assert_eq!(finished.get(), 1);
}

#[test]
fn update_config_keeps_subscriptions_and_values() {
    let (mut engine, list) = single(&["a", "b", "c"], ParentConfig::default());
    let sorted = Rc::new(Cell::new(0));
    engine
        .on_parent(list, LifecycleKind::Sorted, {
            let sorted = sorted.clone();
            move |_| sorted.set(sorted.get() + 1)
        })
        .unwrap();

    engine
        .update_config(list, |config| {
            config.threshold = Threshold::new(0.0, 0.2);
        })
        .unwrap();
    assert_eq!(
        engine.lookup_parent(list).unwrap().config().threshold,
        Threshold::new(0.0, 0.2)
    );
    assert_eq!(engine.node_count(), 3);

    let a = el(&engine, "a");
    let c = el(&engine, "c");
    start_native(&mut engine, a, (5.0, 5.0));
    engine.handle_event(native(NativeDragKind::DragOver, c, (5.0, 25.0), 20));
    finish_native(&mut engine, c, (5.0, 25.0), 30);
    assert_eq!(engine.values(list), ["b", "c", "a"]);
    assert_eq!(sorted.get(), 1);
}

#[test]
fn nested_containers_link_to_their_ancestor() {
    let mut host = Host::new();
    let outer = host.add_container(Rect::new(0.0, 0.0, 300.0, 300.0), Axis::Vertical, 10.0);
    let inner = host.add_container_in(
        outer,
        Rect::new(0.0, 100.0, 300.0, 200.0),
        Axis::Vertical,
        10.0,
    );
    host.render(outer, &["o"]);
    host.render(inner, &["i"]);
    let mut engine = DragEngine::new(host);

    register(&mut engine, inner, ParentConfig::default());
    assert_eq!(engine.lookup_parent(inner).unwrap().data.ancestor(), None);

    let outer_config = ParentConfig::default().with_draggable(move |_, el| el != inner);
    register(&mut engine, outer, outer_config);
    assert_eq!(engine.lookup_parent(inner).unwrap().data.ancestor(), Some(outer));
    assert_eq!(engine.lookup_parent(outer).unwrap().data.ancestor(), None);
    assert_eq!(engine.lookup_parent(outer).unwrap().nodes().len(), 1);

    engine.unregister(outer);
    assert_eq!(engine.lookup_parent(inner).unwrap().data.ancestor(), None);
}
