// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::{Point, Rect};
use understory_sortable::event::{NativeDragEvent, NativeDragKind, PointerEvent, PointerKind};
use understory_sortable::memory::{Axis, ElementId, MemoryHost};
use understory_sortable::{DragEngine, ParentConfig};

type Host = MemoryHost<u32>;

const ROW: f64 = 10.0;

fn build_host(len: u32) -> (Host, ElementId) {
    let mut host = Host::new();
    let height = f64::from(len) * ROW;
    let list = host.add_container(Rect::new(0.0, 0.0, 100.0, height), Axis::Vertical, ROW);
    let values: Vec<u32> = (0..len).collect();
    host.render(list, &values);
    (host, list)
}

fn build_engine(len: u32, config: ParentConfig<Host>) -> (DragEngine<Host>, ElementId) {
    let (host, list) = build_host(len);
    let mut engine = DragEngine::new(host);
    engine
        .register(MemoryHost::registration(list).config(config))
        .expect("fresh container registers");
    (engine, list)
}

fn bench_register(c: &mut Criterion) {
    let mut group = c.benchmark_group("sortable/register");

    for len in [16u32, 256, 1_024] {
        group.throughput(Throughput::Elements(u64::from(len)));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_batched(
                || build_host(len),
                |(host, list)| {
                    let mut engine = DragEngine::new(host);
                    engine
                        .register(MemoryHost::registration(list))
                        .expect("fresh container registers");
                    black_box(engine.node_count());
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_remap(c: &mut Criterion) {
    let mut group = c.benchmark_group("sortable/remap");

    // `unchanged` measures the keep-existing-records path; `reversed` forces
    // every record to move to a new index.
    for len in [16u32, 256, 1_024] {
        group.throughput(Throughput::Elements(u64::from(len)));

        group.bench_with_input(BenchmarkId::new("unchanged", len), &len, |b, &len| {
            let (mut engine, list) = build_engine(len, ParentConfig::default());
            b.iter(|| {
                engine.remap(list);
                black_box(engine.node_count());
            });
        });

        group.bench_with_input(BenchmarkId::new("reversed", len), &len, |b, &len| {
            let (mut engine, list) = build_engine(len, ParentConfig::default());
            b.iter(|| {
                let mut values = engine.values(list);
                values.reverse();
                engine.host_mut().render(list, &values);
                engine.notify_mutation(list);
                black_box(engine.node_count());
            });
        });
    }

    group.finish();
}

fn bench_native_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sortable/native_sort");

    // One full gesture: press the first row, drag over the last, drop.
    for len in [16u32, 256, 1_024] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter_batched(
                || build_engine(len, ParentConfig::default()),
                |(mut engine, list)| {
                    let first = engine.host().element_for(&0).expect("first row");
                    let last = engine.host().element_for(&(len - 1)).expect("last row");
                    let start = Point::new(5.0, 5.0);
                    let end = Point::new(5.0, f64::from(len) * ROW - 2.0);

                    engine.handle_event(PointerEvent::new(PointerKind::Down, first, start, 0));
                    engine.handle_event(NativeDragEvent::new(
                        NativeDragKind::DragStart,
                        first,
                        start,
                        1,
                    ));
                    engine.handle_event(NativeDragEvent::new(
                        NativeDragKind::DragOver,
                        last,
                        end,
                        20,
                    ));
                    engine.handle_event(NativeDragEvent::new(NativeDragKind::Drop, last, end, 30));
                    engine.handle_event(NativeDragEvent::new(
                        NativeDragKind::DragEnd,
                        last,
                        end,
                        31,
                    ));
                    black_box(engine.values(list));
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_register, bench_remap, bench_native_sort);
criterion_main!(benches);
